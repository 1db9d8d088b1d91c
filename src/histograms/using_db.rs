use super::{HandlerDeps, TestOnly, UploadFailure, UploadReport};
use crate::client_event;
use crate::connectors::{Description, UploadBatch};
use crate::logging::DB_CLIENT;
use crate::run_type::RunType;

/// Database-facing core shared by every standard handler.
#[derive(Debug)]
pub struct HistogramsUsingDb {
    deps: HandlerDeps,
    test_only: bool,
}

impl HistogramsUsingDb {
    pub fn new(deps: HandlerDeps) -> Self {
        Self {
            deps,
            test_only: false,
        }
    }

    /// Writes one batch per description, or only prepares them in test-only mode.
    pub fn upload(
        &self,
        run_type: RunType,
        descriptions: &[Description],
    ) -> Result<UploadReport, UploadFailure> {
        let partition = self.deps.db.partition().to_string();
        let histograms = self.deps.backend.histogram_names(run_type);

        let batches: Vec<UploadBatch> = descriptions
            .iter()
            .map(|description| UploadBatch {
                run_type,
                description: *description,
                partition: partition.clone(),
                histograms: histograms.clone(),
            })
            .collect();

        if self.test_only {
            client_event!(
                info,
                DB_CLIENT,
                "upload_test_only",
                run_type = run_type,
                partition = partition,
                batches = batches.len()
            );
        } else {
            for (written, batch) in batches.iter().enumerate() {
                self.deps
                    .db
                    .upload(batch)
                    .map_err(|source| UploadFailure {
                        batches_written: written,
                        source,
                    })?;
                client_event!(
                    debug,
                    DB_CLIENT,
                    "batch_uploaded",
                    run_type = run_type,
                    partition = partition,
                    description = batch.description
                );
            }
        }

        Ok(UploadReport {
            run_type,
            partition,
            batches: batches.len(),
            histograms: histograms.len(),
            committed: !self.test_only,
        })
    }
}

impl TestOnly for HistogramsUsingDb {
    fn set_test_only(&mut self, enabled: bool) {
        self.test_only = enabled;
    }

    fn is_test_only(&self) -> bool {
        self.test_only
    }
}
