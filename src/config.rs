use crate::client::UploadConfig;
use crate::error::{Context, Result};
use crate::run_type::RunType;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Session configuration for one offline commissioning run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default, alias = "RunType")]
    pub run_type: RunType,
    /// Enables the configuration-database write.
    #[serde(default, alias = "UploadToConfigDb")]
    pub upload_to_config_db: bool,
    /// Puts the handler in test-only mode.
    #[serde(default, alias = "Test")]
    pub test: bool,
    /// Partition the configuration database must be bound to; any partition when unset.
    #[serde(default, alias = "Partition")]
    pub partition: Option<String>,
}

impl ClientConfig {
    /// Layered load: optional `config/commissioning` file, then `COMMISSIONING__*` variables.
    pub fn load() -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::with_name("config/commissioning").required(false))
            .add_source(Environment::with_prefix("COMMISSIONING").separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(partition) = &self.partition {
            crate::ensure_err!(!partition.trim().is_empty(), "partition must not be empty");
        }
        Ok(())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            upload_enabled: self.upload_to_config_db,
            test_mode: self.test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_parameter_names_are_accepted() {
        let yaml = "RunType: PEDESTALS\nUploadToConfigDb: true\nTest: true\n";
        let config = ClientConfig::from_reader(yaml.as_bytes()).expect("config");

        assert_eq!(config.run_type, RunType::Pedestals);
        assert_eq!(
            config.upload_config(),
            UploadConfig {
                upload_enabled: true,
                test_mode: true
            }
        );
        assert_eq!(config.partition, None);
    }

    #[test]
    fn flags_default_to_off() {
        let config = ClientConfig::from_reader("run_type: OptoScan\n".as_bytes()).expect("config");

        assert_eq!(config.run_type, RunType::OptoScan);
        assert_eq!(config.upload_config(), UploadConfig::default());
    }

    #[test]
    fn blank_partition_is_rejected() {
        let err = ClientConfig::from_reader("partition: \"  \"\n".as_bytes())
            .expect_err("blank partition");
        assert!(err.to_string().contains("partition"), "{err}");
    }

    #[test]
    fn empty_document_is_an_undefined_session() {
        let config = ClientConfig::from_reader("".as_bytes()).expect("config");
        assert_eq!(config, ClientConfig::default());
    }
}
