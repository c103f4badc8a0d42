// Configuration module unit tests

use std::io::Write;
use tempfile::NamedTempFile;
use tsubame::config::*;
use tsubame::handler::HandlerOptions;
use tsubame::image_optimizer::OutputFormat;

const FULL_CONFIG: &str = r#"
server:
  address: "127.0.0.1"
  port: 8081
  threads: 2

routing:
  prefix: "/images/"

storage:
  backend: s3
  s3:
    bucket: "product-images"
    region: "ap-northeast-1"
    endpoint: "http://localhost:9000"
    access_key: "minio"
    secret_key: "minio123"
    key_prefix: "uploads"
    force_path_style: true

image:
  target_format: jpeg
  quality: 85
  max_width: 4096
  max_height: 4096

response:
  cache_control: "public,max-age=600"
"#;

#[test]
fn test_can_deserialize_full_config() {
    let config = Config::from_yaml_with_env(FULL_CONFIG).unwrap();

    assert_eq!(config.server.listen_addr(), "127.0.0.1:8081");
    assert_eq!(config.server.threads, 2);
    assert_eq!(config.routing.prefix, "/images/");

    let s3 = config.storage.s3.as_ref().unwrap();
    assert_eq!(config.storage.backend, StorageBackend::S3);
    assert_eq!(s3.bucket, "product-images");
    assert_eq!(s3.endpoint.as_deref(), Some("http://localhost:9000"));
    assert_eq!(s3.key_prefix.as_deref(), Some("uploads"));
    assert!(s3.force_path_style);

    assert_eq!(config.image.target_format, OutputFormat::Jpeg);
    assert_eq!(config.image.quality, 85);
    assert_eq!(config.image.max_width, 4096);
    assert_eq!(config.response.cache_control, "public,max-age=600");

    assert!(config.validate().is_ok());
}

#[test]
fn test_jpg_alias_for_target_format() {
    let yaml = FULL_CONFIG.replace("target_format: jpeg", "target_format: jpg");
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert_eq!(config.image.target_format, OutputFormat::Jpeg);
}

#[test]
fn test_config_flows_into_handler_options() {
    let config = Config::from_yaml_with_env(FULL_CONFIG).unwrap();
    let options = HandlerOptions::from(&config);

    assert_eq!(options.prefix, "/images/");
    assert_eq!(options.preferred_format, OutputFormat::Jpeg);
    assert_eq!(options.limits.max_width, 4096);
    assert_eq!(options.cache_control, "public,max-age=600");
}

#[test]
fn test_env_vars_substituted_from_file() {
    std::env::set_var("TSUBAME_CONFIG_TEST_ROOT", "/var/lib/images");
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
storage:
  backend: filesystem
  filesystem:
    root: "${TSUBAME_CONFIG_TEST_ROOT}"
"#,
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(
        config.storage.filesystem.unwrap().root,
        std::path::PathBuf::from("/var/lib/images")
    );
}

#[test]
fn test_unknown_target_format_rejected() {
    let yaml = FULL_CONFIG.replace("target_format: jpeg", "target_format: avif");
    assert!(matches!(
        Config::from_yaml_with_env(&yaml),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_validation_errors_name_the_field() {
    let mut config = Config::from_yaml_with_env(FULL_CONFIG).unwrap();
    config.response.cache_control = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("response.cache_control"));

    let mut config = Config::from_yaml_with_env(FULL_CONFIG).unwrap();
    config.storage.s3.as_mut().unwrap().secret_key = None;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("set together"));
}

#[test]
fn test_cache_control_with_line_break_rejected_at_load() {
    let yaml = FULL_CONFIG.replace(
        "cache_control: \"public,max-age=600\"",
        "cache_control: \"public,max-age=600\\r\\nSet-Cookie: a=b\"",
    );
    let config = Config::from_yaml_with_env(&yaml).unwrap();
    assert_eq!(
        config.response.cache_control,
        "public,max-age=600\r\nSet-Cookie: a=b"
    );

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("response.cache_control"));
}
