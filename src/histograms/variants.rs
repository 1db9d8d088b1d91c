use super::{
    CommissioningHistograms, HandlerDeps, HistogramsUsingDb, TestOnly, UploadFailure, UploadReport,
};
use crate::connectors::Description;
use crate::run_type::RunType;

macro_rules! histograms_using_db {
    ($(#[$meta:meta])* $name:ident, $run_type:expr, [$($description:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            inner: HistogramsUsingDb,
        }

        impl $name {
            pub const DESCRIPTIONS: &'static [Description] = &[$($description),+];

            pub fn new(deps: HandlerDeps) -> Self {
                Self {
                    inner: HistogramsUsingDb::new(deps),
                }
            }
        }

        impl CommissioningHistograms for $name {
            fn run_type(&self) -> RunType {
                $run_type
            }

            fn upload_to_config_db(&mut self) -> Result<UploadReport, UploadFailure> {
                self.inner.upload($run_type, Self::DESCRIPTIONS)
            }

            fn test_only_mut(&mut self) -> Option<&mut dyn TestOnly> {
                Some(&mut self.inner)
            }
        }
    };
}

histograms_using_db!(
    /// Writes FED-channel connections plus the device and FED records they enable.
    FedCablingHistograms,
    RunType::FedCabling,
    [
        Description::FedConnections,
        Description::DeviceDescriptions,
        Description::FedDescriptions,
    ]
);

histograms_using_db!(
    /// PLL delays and APV latencies, plus FED frame-finding thresholds.
    ApvTimingHistograms,
    RunType::ApvTiming,
    [Description::DeviceDescriptions, Description::FedDescriptions]
);

histograms_using_db!(
    /// Laser driver gain and bias settings.
    OptoScanHistograms,
    RunType::OptoScan,
    [Description::DeviceDescriptions]
);

histograms_using_db!(
    VpspScanHistograms,
    RunType::VpspScan,
    [Description::DeviceDescriptions]
);

histograms_using_db!(
    /// Per-strip pedestals and noise for the FEDs.
    PedestalsHistograms,
    RunType::Pedestals,
    [Description::FedDescriptions]
);
