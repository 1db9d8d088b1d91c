pub mod client;
pub mod config;
pub mod connectors;
pub mod error;
pub mod histograms;
pub mod integration;
pub mod logging;
pub mod run_type;
pub mod telemetry;

pub use client::{
    ClientError, CommissioningDbClient, CreateOutcome, Dependency, SessionState, SkipReason,
    UploadConfig, UploadOutcome,
};
pub use run_type::RunType;
