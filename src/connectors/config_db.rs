use crate::run_type::RunType;
use std::fmt;
use thiserror::Error;

/// Category of configuration-database record a handler writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Description {
    FedConnections,
    DeviceDescriptions,
    FedDescriptions,
}

impl Description {
    pub fn as_str(self) -> &'static str {
        match self {
            Description::FedConnections => "fed_connections",
            Description::DeviceDescriptions => "device_descriptions",
            Description::FedDescriptions => "fed_descriptions",
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One write against the configuration database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadBatch {
    pub run_type: RunType,
    pub description: Description,
    pub partition: String,
    pub histograms: Vec<String>,
}

/// Handle to the configuration database.
///
/// Implementations are shared between sessions through `Arc` and are not assumed to be
/// thread-safe; callers that share one handle across threads must serialise access
/// themselves.
pub trait ConfigDb: fmt::Debug + Send + Sync {
    fn partition(&self) -> &str;

    fn upload(&self, batch: &UploadBatch) -> Result<(), ConfigDbError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigDbError {
    #[error("partition `{partition}` rejected {description} upload: {reason}")]
    Rejected {
        partition: String,
        description: Description,
        reason: String,
    },
    #[error("configuration database unavailable: {0}")]
    Unavailable(String),
}

impl ConfigDbError {
    pub fn rejected(batch: &UploadBatch, reason: impl Into<String>) -> Self {
        Self::Rejected {
            partition: batch.partition.clone(),
            description: batch.description,
            reason: reason.into(),
        }
    }
}
