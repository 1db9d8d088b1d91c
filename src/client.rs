//! Offline commissioning DB client.
//!
//! A [`CommissioningDbClient`] is one session for one calibration run. It owns at most one
//! run-type specific handler, created once by [`CommissioningDbClient::create_histograms`],
//! and gates the handler's configuration-database upload on the session's
//! [`UploadConfig`]. Every rejected call is logged once and leaves the session unchanged;
//! the returned [`ClientError`] tells the caller which guard tripped.

use crate::client_event;
use crate::config::ClientConfig;
use crate::connectors::{ConfigDb, MonitorUi};
use crate::histograms::{CommissioningHistograms, HandlerDeps, UploadFailure, UploadReport};
use crate::integration::HandlerRegistry;
use crate::logging::{CABLING, DB_CLIENT};
use crate::run_type::RunType;
use crate::telemetry::session_counters;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UploadConfig {
    pub upload_enabled: bool,
    pub test_mode: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    HandlerAssigned,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Empty => "EMPTY",
            SessionState::HandlerAssigned => "HANDLER_ASSIGNED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dependency {
    MonitorUi,
    MonitorBackend,
    ConfigDb,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dependency::MonitorUi => "monitor UI",
            Dependency::MonitorBackend => "monitor backend",
            Dependency::ConfigDb => "configuration database",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(RunType),
    /// Run type is undefined; the session stays empty without complaint.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(UploadReport),
    Skipped(SkipReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoHandler,
    UploadDisabled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("commissioning histograms already exist for run type `{run_type}`")]
    AlreadyInitialized { run_type: RunType },
    #[error("missing {0}")]
    MissingDependency(Dependency),
    #[error("no handler for run type `{run_type}`")]
    UnknownRunType { run_type: RunType },
    #[error("handler for run type `{run_type}` has no test-only switch")]
    CapabilityMismatch { run_type: RunType },
    #[error("configuration database is bound to partition `{actual}`, expected `{expected}`")]
    PartitionMismatch { expected: String, actual: String },
    #[error("no commissioning histograms to configure")]
    NoHandler,
    #[error("upload for run type `{run_type}` failed: {source}")]
    Upload {
        run_type: RunType,
        #[source]
        source: UploadFailure,
    },
}

pub struct CommissioningDbClient {
    run_type: RunType,
    upload: UploadConfig,
    required_partition: Option<String>,
    registry: HandlerRegistry,
    histograms: Option<Box<dyn CommissioningHistograms>>,
}

impl CommissioningDbClient {
    pub fn new(run_type: RunType, upload: UploadConfig) -> Self {
        Self::with_registry(run_type, upload, HandlerRegistry::standard())
    }

    pub fn with_registry(run_type: RunType, upload: UploadConfig, registry: HandlerRegistry) -> Self {
        client_event!(
            trace,
            DB_CLIENT,
            "client_constructed",
            run_type = run_type,
            upload_enabled = upload.upload_enabled,
            test_mode = upload.test_mode
        );
        Self {
            run_type,
            upload,
            required_partition: None,
            registry,
            histograms: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new(config.run_type, config.upload_config());
        match &config.partition {
            Some(partition) => client.require_partition(partition.clone()),
            None => client,
        }
    }

    /// Only accept a configuration database bound to `partition`.
    pub fn require_partition(mut self, partition: impl Into<String>) -> Self {
        self.required_partition = Some(partition.into());
        self
    }

    pub fn required_partition(&self) -> Option<&str> {
        self.required_partition.as_deref()
    }

    pub fn run_type(&self) -> RunType {
        self.run_type
    }

    pub fn upload_config(&self) -> UploadConfig {
        self.upload
    }

    pub fn state(&self) -> SessionState {
        if self.histograms.is_some() {
            SessionState::HandlerAssigned
        } else {
            SessionState::Empty
        }
    }

    pub fn histograms(&self) -> Option<&dyn CommissioningHistograms> {
        self.histograms.as_deref()
    }

    /// Builds the handler for this session's run type.
    ///
    /// Guards run in order and stop at the first failure: existing handler, monitor UI,
    /// monitor backend, configuration database, required partition.
    pub fn create_histograms(
        &mut self,
        monitor: Option<Arc<dyn MonitorUi>>,
        db: Option<Arc<dyn ConfigDb>>,
    ) -> Result<CreateOutcome, ClientError> {
        let run_type = self.run_type;

        if self.histograms.is_some() {
            return Err(reject(run_type, ClientError::AlreadyInitialized { run_type }));
        }

        let Some(monitor) = monitor else {
            return Err(reject(
                run_type,
                ClientError::MissingDependency(Dependency::MonitorUi),
            ));
        };

        let Some(backend) = monitor.backend() else {
            return Err(reject(
                run_type,
                ClientError::MissingDependency(Dependency::MonitorBackend),
            ));
        };

        client_event!(
            trace,
            CABLING,
            "config_db_shared",
            run_type = run_type,
            note = "shared configuration database handle is not guaranteed thread-safe"
        );

        let Some(db) = db else {
            return Err(reject_cabling(
                run_type,
                ClientError::MissingDependency(Dependency::ConfigDb),
            ));
        };

        if let Some(expected) = &self.required_partition {
            if db.partition() != expected.as_str() {
                return Err(reject_cabling(
                    run_type,
                    ClientError::PartitionMismatch {
                        expected: expected.clone(),
                        actual: db.partition().to_string(),
                    },
                ));
            }
        }

        // Undefined is a valid idle session; unknown is a misconfiguration.
        match run_type {
            RunType::Undefined => return Ok(CreateOutcome::Idle),
            RunType::Unknown => {
                return Err(reject(run_type, ClientError::UnknownRunType { run_type }))
            }
            _ => {}
        }

        let Some(factory) = self.registry.factory(run_type) else {
            return Err(reject(run_type, ClientError::UnknownRunType { run_type }));
        };

        let histograms = factory(HandlerDeps { backend, db });
        client_event!(
            debug,
            DB_CLIENT,
            "histograms_created",
            run_type = run_type,
            handler = format!("{histograms:?}")
        );
        self.histograms = Some(histograms);
        session_counters().inc_handlers_created();

        Ok(CreateOutcome::Created(run_type))
    }

    /// Switches the handler's test-only mode, which suppresses the database writes.
    pub fn set_test_mode(&mut self, enabled: bool) -> Result<(), ClientError> {
        let run_type = self.run_type;
        let Some(histograms) = self.histograms.as_mut() else {
            return Err(reject(run_type, ClientError::NoHandler));
        };

        if let Some(switch) = histograms.test_only_mut() {
            switch.set_test_only(enabled);
            client_event!(
                debug,
                DB_CLIENT,
                "test_mode_set",
                run_type = run_type,
                enabled = enabled
            );
            return Ok(());
        }

        Err(reject(run_type, ClientError::CapabilityMismatch { run_type }))
    }

    /// Applies the configured `Test` flag; a no-op when it is unset.
    pub fn test_upload_to_db(&mut self) -> Result<(), ClientError> {
        if self.upload.test_mode {
            self.set_test_mode(true)
        } else {
            Ok(())
        }
    }

    /// Delegates to the handler's upload when a handler exists and upload is enabled.
    pub fn upload_to_db(&mut self) -> Result<UploadOutcome, ClientError> {
        let run_type = self.run_type;
        let upload_enabled = self.upload.upload_enabled;

        let histograms = match self.histograms.as_mut() {
            None => return Ok(skip(run_type, SkipReason::NoHandler)),
            Some(_) if !upload_enabled => {
                return Ok(skip(run_type, SkipReason::UploadDisabled))
            }
            Some(histograms) => histograms,
        };

        match histograms.upload_to_config_db() {
            Ok(report) => {
                client_event!(
                    info,
                    DB_CLIENT,
                    "upload_completed",
                    run_type = run_type,
                    partition = report.partition,
                    batches = report.batches,
                    committed = report.committed
                );
                if report.committed {
                    session_counters().inc_uploads_committed();
                } else {
                    session_counters().inc_dry_runs();
                }
                Ok(UploadOutcome::Uploaded(report))
            }
            Err(source) => {
                client_event!(
                    error,
                    DB_CLIENT,
                    "upload_failed",
                    run_type = run_type,
                    batches_written = source.batches_written,
                    error = source
                );
                Err(ClientError::Upload { run_type, source })
            }
        }
    }
}

fn skip(run_type: RunType, reason: SkipReason) -> UploadOutcome {
    client_event!(
        debug,
        DB_CLIENT,
        "upload_skipped",
        run_type = run_type,
        reason = format!("{reason:?}")
    );
    session_counters().inc_uploads_skipped();
    UploadOutcome::Skipped(reason)
}

fn reject(run_type: RunType, error: ClientError) -> ClientError {
    client_event!(
        warn,
        DB_CLIENT,
        "request_rejected",
        run_type = run_type,
        error = error
    );
    session_counters().inc_rejections();
    error
}

fn reject_cabling(run_type: RunType, error: ClientError) -> ClientError {
    client_event!(
        warn,
        CABLING,
        "request_rejected",
        run_type = run_type,
        error = error
    );
    session_counters().inc_rejections();
    error
}

impl fmt::Debug for CommissioningDbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommissioningDbClient")
            .field("run_type", &self.run_type)
            .field("upload", &self.upload)
            .field("required_partition", &self.required_partition)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for CommissioningDbClient {
    fn drop(&mut self) {
        client_event!(
            trace,
            DB_CLIENT,
            "client_dropped",
            run_type = self.run_type,
            state = self.state().as_str()
        );
    }
}
