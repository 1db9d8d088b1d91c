//! Collaborator seams owned by the host: the monitoring interface and the
//! configuration database. The client only holds shared handles to them.

pub mod config_db;
pub mod monitor;

pub use config_db::{ConfigDb, ConfigDbError, Description, UploadBatch};
pub use monitor::{MonitorBackend, MonitorUi};
