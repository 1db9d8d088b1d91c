use commissioning::config::ClientConfig;
use commissioning::{CommissioningDbClient, RunType, SessionState, UploadConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn session_is_built_from_a_config_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("pedestals.yaml");
    fs::write(
        &path,
        "RunType: Pedestals\nUploadToConfigDb: true\nTest: false\npartition: TI_TIB_TOB\n",
    )
    .expect("write config");

    let config = ClientConfig::from_path(&path).expect("config loads");
    let client = CommissioningDbClient::from_config(&config);

    assert_eq!(client.run_type(), RunType::Pedestals);
    assert_eq!(
        client.upload_config(),
        UploadConfig {
            upload_enabled: true,
            test_mode: false
        }
    );
    assert_eq!(client.state(), SessionState::Empty);
    assert_eq!(client.required_partition(), Some("TI_TIB_TOB"));
}

#[test]
fn unrecognised_run_type_loads_as_unknown() {
    let config =
        ClientConfig::from_reader("run_type: CALCHAN\n".as_bytes()).expect("config loads");
    assert_eq!(config.run_type, RunType::Unknown);
}

#[test]
fn missing_file_error_names_the_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.yaml");

    let error = ClientConfig::from_path(&path).expect_err("missing file");

    let message = error.to_string();
    assert!(message.contains("absent.yaml"), "{message}");
}

#[test]
fn malformed_yaml_reports_a_parse_failure() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "UploadToConfigDb: [not, a, bool]\n").expect("write config");

    let error = ClientConfig::from_path(&path).expect_err("malformed");

    assert!(error.to_string().contains("failed to parse"), "{error}");
    assert!(
        std::error::Error::source(&error).is_some(),
        "context should keep the YAML error"
    );
}
