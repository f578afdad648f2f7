use std::io::Write;
use std::time::Duration;

use mq_exporter::error::{ConfigError, Error};
use mq_exporter::infrastructure::config::settings::Config;
use mq_exporter::port::ClientAuth;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}

fn load(contents: &str) -> mq_exporter::error::Result<Config> {
    let file = write_temp_config(contents);
    Config::load(file.path())
}

#[test]
fn config_loads_full_file() {
    let config = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "mq.example.com(1414)"
channel = "DEV.APP.SVRCONN"
user = "app"
password = "passw0rd"
ssl_cipher_spec = "TLS_RSA_WITH_AES_256_CBC_SHA256"
key_repository = "/var/mqm/ssl/key"
timeout_ms = 1500
queues = ["DEV.QUEUE.1", "DEV.QUEUE.2"]

[web]
listen_address = "127.0.0.1:9999"
telemetry_path = "/mq/metrics"

[logging]
level = "debug"
format = "json"
"#,
    )
    .expect("valid config");

    assert_eq!(config.mq.queue_manager, "QM1");
    assert_eq!(config.mq.queues, ["DEV.QUEUE.1", "DEV.QUEUE.2"]);
    assert_eq!(config.mq.timeout(), Duration::from_millis(1500));
    assert_eq!(config.web.listen_address, "127.0.0.1:9999");
    assert_eq!(config.web.telemetry_path, "/mq/metrics");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");

    let options = config.mq.connect_options();
    assert_eq!(options.conn_name, "mq.example.com(1414)");
    assert!(options.credentials.is_some());
    assert_eq!(
        options.tls.map(|tls| tls.client_auth),
        Some(ClientAuth::Optional)
    );
}

#[test]
fn config_applies_defaults() {
    let config = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
"#,
    )
    .expect("valid config");

    assert_eq!(config.mq.timeout(), Duration::from_secs(3));
    assert!(config.mq.queues.is_empty());
    assert_eq!(config.web.listen_address, "0.0.0.0:9873");
    assert_eq!(config.web.telemetry_path, "/metrics");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "pretty");

    let options = config.mq.connect_options();
    assert!(options.credentials.is_none());
    assert!(options.tls.is_none());
}

#[test]
fn config_reports_every_missing_field() {
    let result = load(
        r#"
[mq]
queues = ["DEV.QUEUE.1"]
"#,
    );

    match result {
        Err(err @ Error::Config(ConfigError::MissingFields { .. })) => assert_eq!(
            err.to_string(),
            "missing mandatory fields: 'queue_manager', 'conn_name', 'channel'"
        ),
        Err(err) => panic!("Expected missing fields error, got {err}"),
        Ok(_) => panic!("Expected missing fields to be rejected"),
    }
}

#[test]
fn config_requires_user_with_password() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
password = "passw0rd"
"#,
    );

    let err = result.err().expect("unpaired credentials rejected");
    assert_eq!(err.to_string(), "requires both 'user' and 'password'");
}

#[test]
fn config_requires_key_repository_with_cipher_spec() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
ssl_cipher_spec = "TLS_RSA_WITH_AES_256_CBC_SHA256"
"#,
    );

    let err = result.err().expect("unpaired TLS settings rejected");
    assert_eq!(
        err.to_string(),
        "requires both 'ssl_cipher_spec' and 'key_repository'"
    );
}

#[test]
fn config_rejects_zero_timeout() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
timeout_ms = 0
"#,
    );

    let err = result.err().expect("zero timeout rejected");
    assert_eq!(err.to_string(), "requires strict positive 'timeout'");
}

#[test]
fn config_rejects_negative_timeout() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"
timeout_ms = -5
"#,
    );

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn config_rejects_bad_listen_address() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"

[web]
listen_address = "not an address"
"#,
    );

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "listen_address",
            ..
        }))
    ));
}

#[test]
fn config_accepts_host_name_listen_address() {
    let config = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"

[web]
listen_address = "localhost:9873"
"#,
    )
    .expect("host name accepted");

    assert_eq!(config.web.listen_address, "localhost:9873");
}

#[test]
fn config_rejects_root_telemetry_path() {
    let result = load(
        r#"
[mq]
queue_manager = "QM1"
conn_name = "localhost(1414)"
channel = "DEV.APP.SVRCONN"

[web]
telemetry_path = "/"
"#,
    );

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "telemetry_path",
            ..
        }))
    ));
}

#[test]
fn config_reports_unreadable_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing.toml");

    let err = Config::load(&path).err().expect("missing file rejected");
    assert_eq!(
        err.to_string(),
        format!(
            "configuration file '{}' does not exist or is not readable",
            path.display()
        )
    );
}

#[test]
fn config_rejects_malformed_toml() {
    let result = load("[mq\nqueue_manager = ");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}
