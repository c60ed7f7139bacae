//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `UPLOADCTL_CONFIG`
//! environment variable. A missing file is not an error; every field has a default.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `UPLOADCTL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `UPLOADCTL_UPLOAD__DESTINATION_DIR=/srv/uploads` sets the `upload.destination_dir` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use uploadctl::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! UPLOADCTL_PORT=8080
//! UPLOADCTL_UPLOAD__DESTINATION_DIR=/var/lib/uploadctl
//! UPLOADCTL_UPLOAD__MAX_BODY_SIZE=52428800
//! UPLOADCTL_ENABLE_METRICS=false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "UPLOADCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Where and how uploaded files are written
    pub upload: UploadConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Upload handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory uploaded files are written into. Defaults to the working directory.
    pub destination_dir: PathBuf,
    /// Maximum request body size accepted on the upload routes, in bytes
    pub max_body_size: usize,
    /// Keep the raw submitted name (separators included) on `POST /file/upload/part`
    /// instead of reducing it to its final segment.
    pub legacy_part_names: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            destination_dir: PathBuf::from("."),
            max_body_size: 10 * 1024 * 1024,
            legacy_part_names: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            upload: UploadConfig::default(),
            enable_metrics: true,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.upload.destination_dir.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: upload.destination_dir cannot be empty. Use \".\" for the working directory."
                    .to_string(),
            });
        }

        if self.upload.max_body_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: upload.max_body_size cannot be 0. Set a positive size in bytes (default: 10485760)."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values
            .merge(Env::prefixed("UPLOADCTL_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml"))?;

            assert_eq!(config.port, 3001);
            assert_eq!(config.upload.destination_dir, PathBuf::from("."));
            assert_eq!(config.upload.max_body_size, 10 * 1024 * 1024);
            assert!(!config.upload.legacy_part_names);

            Ok(())
        });
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 127.0.0.1
port: 8080
upload:
  destination_dir: /srv/uploads
  legacy_part_names: true
enable_metrics: false
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.bind_address(), "127.0.0.1:8080");
            assert_eq!(config.upload.destination_dir, PathBuf::from("/srv/uploads"));
            assert!(config.upload.legacy_part_names);
            assert!(!config.enable_metrics);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
upload:
  destination_dir: /srv/uploads
"#,
            )?;

            jail.set_env("UPLOADCTL_PORT", "9000");
            jail.set_env("UPLOADCTL_UPLOAD__DESTINATION_DIR", "/tmp/incoming");
            jail.set_env("UPLOADCTL_UPLOAD__MAX_BODY_SIZE", "1024");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 9000);
            assert_eq!(config.upload.destination_dir, PathBuf::from("/tmp/incoming"));
            assert_eq!(config.upload.max_body_size, 1024);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
upload:
  destination: /srv/uploads
"#,
            )?;

            assert!(Config::load(&args("test.yaml")).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_config_validation_zero_body_size() {
        let mut config = Config::default();
        config.upload.max_body_size = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_body_size cannot be 0"));
    }

    #[test]
    fn test_config_validation_empty_destination() {
        let mut config = Config::default();
        config.upload.destination_dir = PathBuf::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("destination_dir cannot be empty"));
    }

    #[test]
    fn test_config_validation_valid_config() {
        assert!(Config::default().validate().is_ok());
    }
}
