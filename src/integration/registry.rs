use crate::histograms::{
    ApvTimingHistograms, CommissioningHistograms, FedCablingHistograms, HandlerDeps,
    OptoScanHistograms, PedestalsHistograms, VpspScanHistograms,
};
use crate::run_type::RunType;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Constructor for the handler bound to one run type.
pub type HandlerFactory = fn(HandlerDeps) -> Box<dyn CommissioningHistograms>;

/// Dispatch table mapping each run type to the factory of its handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<RunType, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One factory per dispatchable run type.
    pub fn standard() -> Self {
        let factories = RunType::ALL
            .into_iter()
            .filter_map(|run_type| standard_factory(run_type).map(|factory| (run_type, factory)))
            .collect();
        Self { factories }
    }

    pub fn register(
        &mut self,
        run_type: RunType,
        factory: HandlerFactory,
    ) -> Result<(), RegistryError> {
        if run_type.is_reserved() {
            return Err(RegistryError::Reserved { run_type });
        }
        if self.factories.contains_key(&run_type) {
            return Err(RegistryError::Duplicate { run_type });
        }
        self.factories.insert(run_type, factory);
        Ok(())
    }

    pub fn factory(&self, run_type: RunType) -> Option<HandlerFactory> {
        self.factories.get(&run_type).copied()
    }

    pub fn contains(&self, run_type: RunType) -> bool {
        self.factories.contains_key(&run_type)
    }

    pub fn run_types(&self) -> impl Iterator<Item = RunType> + '_ {
        self.factories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

fn standard_factory(run_type: RunType) -> Option<HandlerFactory> {
    match run_type {
        RunType::FedCabling => Some(fed_cabling as HandlerFactory),
        RunType::ApvTiming => Some(apv_timing as HandlerFactory),
        RunType::OptoScan => Some(opto_scan as HandlerFactory),
        RunType::VpspScan => Some(vpsp_scan as HandlerFactory),
        RunType::Pedestals => Some(pedestals as HandlerFactory),
        RunType::Undefined | RunType::Unknown => None,
    }
}

fn fed_cabling(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(FedCablingHistograms::new(deps))
}

fn apv_timing(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(ApvTimingHistograms::new(deps))
}

fn opto_scan(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(OptoScanHistograms::new(deps))
}

fn vpsp_scan(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(VpspScanHistograms::new(deps))
}

fn pedestals(deps: HandlerDeps) -> Box<dyn CommissioningHistograms> {
    Box::new(PedestalsHistograms::new(deps))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("run type `{run_type}` is reserved and cannot have a handler")]
    Reserved { run_type: RunType },
    #[error("a handler is already registered for run type `{run_type}`")]
    Duplicate { run_type: RunType },
}
