use relay_dns_domain::{CliOverrides, Config};

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();

    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert_eq!(config.server.dns_port, 1053);
    assert_eq!(config.server.listen_addr(), "127.0.0.1:1053");
    assert_eq!(config.upstream.server, "8.8.8.8:53");
    assert_eq!(config.upstream.query_timeout, 2000);
    assert_eq!(config.upstream.retries, 3);
    assert!(config.doh.enabled);
    assert_eq!(config.doh.endpoint, "https://dns.google/resolve");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn default_config_validates() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn cli_overrides_take_effect() {
    let overrides = CliOverrides {
        dns_port: Some(5353),
        bind_address: Some("0.0.0.0".to_string()),
        upstream: Some("1.1.1.1:53".to_string()),
        doh_endpoint: None,
        no_doh: true,
        log_level: Some("debug".to_string()),
    };

    let config = Config::load(None, overrides).expect("defaults plus overrides");

    assert_eq!(config.server.dns_port, 5353);
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.upstream.server, "1.1.1.1:53");
    assert!(!config.doh.enabled);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn toml_sections_deserialize_with_partial_fields() {
    let toml_src = r#"
        [server]
        dns_port = 2053

        [upstream]
        server = "9.9.9.9:53"

        [doh]
        enabled = false
    "#;

    let config: Config = toml::from_str(toml_src).unwrap();
    assert_eq!(config.server.dns_port, 2053);
    assert_eq!(config.server.bind_address, "127.0.0.1"); // default kept
    assert_eq!(config.upstream.server, "9.9.9.9:53");
    assert_eq!(config.upstream.retries, 3); // default kept
    assert!(!config.doh.enabled);
}

#[test]
fn validation_rejects_bad_values() {
    let mut config = Config::default();
    config.server.dns_port = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.upstream.server = "not-an-address".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.upstream.retries = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.doh.endpoint = "http://dns.google/resolve".to_string();
    assert!(config.validate().is_err());

    // plain-http endpoint is fine when DoH is off
    config.doh.enabled = false;
    assert!(config.validate().is_ok());
}
