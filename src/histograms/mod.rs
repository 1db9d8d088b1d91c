//! Run-type specific "commissioning histograms" handlers.

mod using_db;
mod variants;

pub use using_db::HistogramsUsingDb;
pub use variants::{
    ApvTimingHistograms, FedCablingHistograms, OptoScanHistograms, PedestalsHistograms,
    VpspScanHistograms,
};

use crate::connectors::{ConfigDb, ConfigDbError, MonitorBackend};
use crate::run_type::RunType;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handles a handler is constructed with.
#[derive(Clone, Debug)]
pub struct HandlerDeps {
    pub backend: Arc<dyn MonitorBackend>,
    pub db: Arc<dyn ConfigDb>,
}

/// Result of one handler upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReport {
    pub run_type: RunType,
    pub partition: String,
    pub batches: usize,
    pub histograms: usize,
    /// `false` when the handler ran in test-only mode and skipped the writes.
    pub committed: bool,
}

pub trait CommissioningHistograms: fmt::Debug + Send {
    fn run_type(&self) -> RunType;

    /// Analyse and write this run's results to the configuration database.
    ///
    /// Batches are written one at a time and are not rolled back: on failure, the
    /// batches before the failing one stay written and are counted in the error.
    fn upload_to_config_db(&mut self) -> Result<UploadReport, UploadFailure>;

    /// Test-only switch, for handlers that can suppress their database writes.
    fn test_only_mut(&mut self) -> Option<&mut dyn TestOnly> {
        None
    }
}

pub trait TestOnly {
    fn set_test_only(&mut self, enabled: bool);

    fn is_test_only(&self) -> bool;
}

/// A handler upload that stopped at a rejected batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{source} ({batches_written} batch(es) already written)")]
pub struct UploadFailure {
    pub batches_written: usize,
    #[source]
    pub source: ConfigDbError,
}

impl From<ConfigDbError> for UploadFailure {
    fn from(source: ConfigDbError) -> Self {
        Self {
            batches_written: 0,
            source,
        }
    }
}
