use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calibration procedure that produced the data handled by a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunType {
    FedCabling,
    ApvTiming,
    OptoScan,
    VpspScan,
    Pedestals,
    #[default]
    Undefined,
    Unknown,
}

impl RunType {
    pub const ALL: [RunType; 7] = [
        RunType::FedCabling,
        RunType::ApvTiming,
        RunType::OptoScan,
        RunType::VpspScan,
        RunType::Pedestals,
        RunType::Undefined,
        RunType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunType::FedCabling => "FED_CABLING",
            RunType::ApvTiming => "APV_TIMING",
            RunType::OptoScan => "OPTO_SCAN",
            RunType::VpspScan => "VPSP_SCAN",
            RunType::Pedestals => "PEDESTALS",
            RunType::Undefined => "UNDEFINED_RUN_TYPE",
            RunType::Unknown => "UNKNOWN_RUN_TYPE",
        }
    }

    /// Tags that never map to a handler.
    pub fn is_reserved(self) -> bool {
        matches!(self, RunType::Undefined | RunType::Unknown)
    }

    /// Lenient parse used for configuration values; unrecognised input is `Unknown`.
    pub fn parse_lenient(value: &str) -> Self {
        let normalised: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalised.as_str() {
            "fedcabling" => RunType::FedCabling,
            "apvtiming" => RunType::ApvTiming,
            "optoscan" => RunType::OptoScan,
            "vpspscan" => RunType::VpspScan,
            "pedestals" => RunType::Pedestals,
            "" | "undefined" | "undefinedruntype" => RunType::Undefined,
            _ => RunType::Unknown,
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(RunType::parse_lenient(value))
    }
}

impl From<String> for RunType {
    fn from(value: String) -> Self {
        RunType::parse_lenient(&value)
    }
}

impl From<RunType> for String {
    fn from(value: RunType) -> Self {
        value.as_str().to_string()
    }
}
