//! Configuration layering: defaults, TOML file, environment, CLI.

use autohook::cli::Cli;
use autohook::config::Config;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let file = write_config(
        r#"
        log_level = "debug"
        [server]
        listen_addr = "127.0.0.1:8080"
        webhook_path = "/hooks/vehicle"
        [event_log]
        enabled = true
        path = "/var/log/autohook/events.json"
        [voice]
        enabled = true
        command = "espeak"
        [sms]
        enabled = true
        account_sid = "AC123"
        auth_token = "secret"
        from_number = "+15550100"
        recipients = ["+15550101", "+15550102"]
        [lights]
        enabled = true
        bridge_url = "http://192.168.1.20"
        username = "hue-user"
        groups = ["Basement", "Garage"]
        [dispatch]
        timeout_seconds = 30
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(config.server.webhook_path, "/hooks/vehicle");
    assert_eq!(
        config.event_log.path,
        PathBuf::from("/var/log/autohook/events.json")
    );
    assert_eq!(config.voice.command, "espeak");
    assert!(config.sms.enabled);
    assert_eq!(config.sms.recipients, vec!["+15550101", "+15550102"]);
    // Not in the file, so it keeps its default.
    assert_eq!(config.sms.api_base_url, "https://api.twilio.com");
    assert_eq!(config.lights.groups, vec!["Basement", "Garage"]);
    assert_eq!(config.dispatch.timeout(), Some(Duration::from_secs(30)));
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    let cli = Cli {
        config: Some(PathBuf::from("/nonexistent/autohook.toml")),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let file = write_config(
        r#"
        [sms]
        enabled = true
        account_sid = "AC123"
        auth_token = "from-file"
        from_number = "+15550100"
    "#,
    );
    std::env::set_var("AUTOHOOK_SMS__AUTH_TOKEN", "from-env");
    std::env::set_var("AUTOHOOK_LOG_LEVEL", "warn");

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let result = Config::load(&cli);

    std::env::remove_var("AUTOHOOK_SMS__AUTH_TOKEN");
    std::env::remove_var("AUTOHOOK_LOG_LEVEL");

    let config = result.unwrap();
    assert_eq!(config.sms.auth_token, "from-env");
    assert_eq!(config.sms.account_sid, "AC123");
    assert_eq!(config.log_level, "warn");
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let file = write_config(
        r#"
        log_level = "debug"
        [server]
        listen_addr = "127.0.0.1:8080"
        [voice]
        enabled = true
        command = "espeak"
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        listen: Some("0.0.0.0:9000".to_string()),
        event_log: Some(PathBuf::from("/tmp/events.json")),
        no_voice: true,
        log_level: Some("trace".to_string()),
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
    // Sibling keys of an overridden section survive.
    assert_eq!(config.server.webhook_path, "/hooks/automatic");
    assert_eq!(config.event_log.path, PathBuf::from("/tmp/events.json"));
    assert!(!config.voice.enabled);
    assert_eq!(config.voice.command, "espeak");
    assert_eq!(config.log_level, "trace");
}

#[test]
#[serial]
fn test_invalid_sms_recipient_is_rejected() {
    let file = write_config(
        r#"
        [sms]
        enabled = true
        account_sid = "AC123"
        auth_token = "secret"
        from_number = "+15550100"
        recipients = ["555-0101"]
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("555-0101"));
}
