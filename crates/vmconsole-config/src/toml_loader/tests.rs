use super::*;

fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match read_config(&path) {
        Err(ConfigError::FileNotFound(p)) => assert_eq!(p, path),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        r##"
[proxy]
ws_url = "wss://hv01.lan:8443"
token = "abc123"

[timing]
error_close_delay_ms = 500
"##,
    );

    let config = read_config(&path).unwrap();
    assert_eq!(config.proxy.ws_url, "wss://hv01.lan:8443");
    assert_eq!(config.proxy.token, "abc123");
    assert_eq!(config.timing.error_close_delay_ms, 500);
    assert_eq!(config.timing.control_grace_delay_ms, 2000);
    assert_eq!(config.proxy.api_url, "http://127.0.0.1:5000");
}

#[test]
fn malformed_toml_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "this is not valid toml {{{");
    match read_config(&path) {
        Err(ConfigError::ParseError(msg)) => assert!(msg.contains("config.toml")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn out_of_range_values_still_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "[timing]\nconnect_timeout_secs = 9999\n");
    assert_eq!(read_config(&path).unwrap().timing.connect_timeout_secs, 9999);
}

#[test]
fn default_file_is_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vmconsole").join("config.toml");

    assert!(write_default_if_missing(&path).unwrap());
    let config = read_config(&path).unwrap();
    assert_eq!(config.proxy.ws_url, "ws://127.0.0.1:5000");
    assert_eq!(config.timing.error_close_delay_ms, 2000);

    std::fs::write(&path, "[proxy]\ntoken = \"mine\"\n").unwrap();
    assert!(!write_default_if_missing(&path).unwrap());
    assert_eq!(read_config(&path).unwrap().proxy.token, "mine");
}

#[test]
fn default_template_passes_validation() {
    let config: ConsoleConfig = toml::from_str(&default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_path_ends_in_vmconsole_dir() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("vmconsole/config.toml"));
    }
}
