pub mod registry;

pub use registry::{HandlerFactory, HandlerRegistry, RegistryError};
