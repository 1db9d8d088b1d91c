#![allow(dead_code)]

use commissioning::connectors::{
    ConfigDb, ConfigDbError, MonitorBackend, MonitorUi, UploadBatch,
};
use commissioning::histograms::{
    CommissioningHistograms, HandlerDeps, UploadFailure, UploadReport,
};
use commissioning::RunType;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Backend returning a fixed set of histogram names prefixed with the requested run type.
#[derive(Debug, Default)]
pub struct MockMonitorBackend {
    names: Vec<String>,
}

impl MockMonitorBackend {
    pub fn with_histograms(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl MonitorBackend for MockMonitorBackend {
    fn histogram_names(&self, run_type: RunType) -> Vec<String> {
        self.names
            .iter()
            .map(|name| format!("{run_type}/{name}"))
            .collect()
    }
}

/// Monitor UI that records how often its backend was requested.
#[derive(Debug, Default)]
pub struct MockMonitorUi {
    backend: Option<Arc<MockMonitorBackend>>,
    backend_requests: AtomicUsize,
}

impl MockMonitorUi {
    pub fn with_backend() -> Self {
        Self {
            backend: Some(Arc::new(MockMonitorBackend::with_histograms(&[
                "module_1", "module_2",
            ]))),
            backend_requests: AtomicUsize::new(0),
        }
    }

    pub fn without_backend() -> Self {
        Self::default()
    }

    pub fn backend_requests(&self) -> usize {
        self.backend_requests.load(Ordering::SeqCst)
    }
}

impl MonitorUi for MockMonitorUi {
    fn backend(&self) -> Option<Arc<dyn MonitorBackend>> {
        self.backend_requests.fetch_add(1, Ordering::SeqCst);
        self.backend
            .clone()
            .map(|backend| backend as Arc<dyn MonitorBackend>)
    }
}

/// In-memory configuration database recording every uploaded batch.
#[derive(Debug)]
pub struct MockConfigDb {
    partition: String,
    fail_with: Option<String>,
    accepted_before_failure: usize,
    batches: Mutex<Vec<UploadBatch>>,
}

impl MockConfigDb {
    pub fn new(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            fail_with: None,
            accepted_before_failure: 0,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(partition: &str, reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new(partition)
        }
    }

    /// Accepts the first `writes` batches, then rejects every later one.
    pub fn failing_after(partition: &str, writes: usize, reason: &str) -> Self {
        Self {
            accepted_before_failure: writes,
            ..Self::failing(partition, reason)
        }
    }

    pub fn batches(&self) -> Vec<UploadBatch> {
        self.batches.lock().expect("config db state").clone()
    }

    pub fn upload_count(&self) -> usize {
        self.batches.lock().expect("config db state").len()
    }
}

impl ConfigDb for MockConfigDb {
    fn partition(&self) -> &str {
        &self.partition
    }

    fn upload(&self, batch: &UploadBatch) -> Result<(), ConfigDbError> {
        let mut batches = self.batches.lock().expect("config db state");
        if let Some(reason) = &self.fail_with {
            if batches.len() >= self.accepted_before_failure {
                return Err(ConfigDbError::rejected(batch, reason.clone()));
            }
        }
        batches.push(batch.clone());
        Ok(())
    }
}

/// Pedestals handler without a test-only switch.
#[derive(Debug)]
pub struct ReadOnlyPedestals {
    deps: HandlerDeps,
}

impl CommissioningHistograms for ReadOnlyPedestals {
    fn run_type(&self) -> RunType {
        RunType::Pedestals
    }

    fn upload_to_config_db(&mut self) -> Result<UploadReport, UploadFailure> {
        let batch = UploadBatch {
            run_type: RunType::Pedestals,
            description: commissioning::connectors::Description::FedDescriptions,
            partition: self.deps.db.partition().to_string(),
            histograms: self.deps.backend.histogram_names(RunType::Pedestals),
        };
        self.deps.db.upload(&batch)?;
        Ok(UploadReport {
            run_type: RunType::Pedestals,
            partition: batch.partition,
            batches: 1,
            histograms: batch.histograms.len(),
            committed: true,
        })
    }
}

pub fn read_only_pedestals(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(ReadOnlyPedestals { deps })
}

/// Session dependencies plus typed handles for assertions.
pub struct Fixture {
    pub ui: Arc<MockMonitorUi>,
    pub db: Arc<MockConfigDb>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_db(MockConfigDb::new("TI_TIB_TOB"))
    }

    pub fn with_db(db: MockConfigDb) -> Self {
        Self {
            ui: Arc::new(MockMonitorUi::with_backend()),
            db: Arc::new(db),
        }
    }

    pub fn without_backend() -> Self {
        Self {
            ui: Arc::new(MockMonitorUi::without_backend()),
            db: Arc::new(MockConfigDb::new("TI_TIB_TOB")),
        }
    }

    pub fn monitor(&self) -> Option<Arc<dyn MonitorUi>> {
        Some(self.ui.clone() as Arc<dyn MonitorUi>)
    }

    pub fn db(&self) -> Option<Arc<dyn ConfigDb>> {
        Some(self.db.clone() as Arc<dyn ConfigDb>)
    }
}
