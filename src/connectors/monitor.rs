use crate::run_type::RunType;
use std::fmt;
use std::sync::Arc;

/// Monitoring user interface handed to the client by the host.
pub trait MonitorUi: fmt::Debug + Send + Sync {
    /// Backend holding the booked histograms, if the UI has one attached.
    fn backend(&self) -> Option<Arc<dyn MonitorBackend>>;
}

/// Store of analysed histograms.
pub trait MonitorBackend: fmt::Debug + Send + Sync {
    fn histogram_names(&self, run_type: RunType) -> Vec<String>;
}
