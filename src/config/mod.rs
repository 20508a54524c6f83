// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ContentConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `SITEDESK_SERVER__PORT=4000`
const ENV_PREFIX: &str = "SITEDESK";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, None)
    }

    /// Same as [`Config::load_from`], reading overrides from `env` instead
    /// of the process environment when given
    fn load_with_env(
        config_path: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .source(env);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(environment)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.debug", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "SiteDesk/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("content.data_file", "data/content.json")?
            .set_default("content.public_dir", "public")?
            .set_default("content.upload_dir", "public/uploads")?
            .set_default("content.upload_url_prefix", "/uploads")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").expect("defaults load");
        assert_eq!(cfg.server.port, 3000);
        assert!(!cfg.server.debug);
        assert_eq!(cfg.content.data_file, std::path::PathBuf::from("data/content.json"));
        assert_eq!(cfg.content.upload_url_prefix, "/uploads");
        assert_eq!(
            cfg.content.allowed_extensions,
            vec!["png", "jpg", "jpeg", "gif", "webp"]
        );
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_env_overrides_port_and_debug() {
        let env = config::Map::from([
            ("SITEDESK_SERVER__PORT".to_string(), "4000".to_string()),
            ("SITEDESK_SERVER__DEBUG".to_string(), "true".to_string()),
            ("SITEDESK_CONTENT__DATA_FILE".to_string(), "/srv/site.json".to_string()),
            ("OTHER_SERVER__PORT".to_string(), "5000".to_string()),
        ]);
        let cfg = Config::load_with_env("does-not-exist/config", Some(env)).expect("env load");
        assert_eq!(cfg.server.port, 4000);
        assert!(cfg.server.debug);
        assert_eq!(cfg.content.data_file, std::path::PathBuf::from("/srv/site.json"));
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist/config").expect("defaults load");
        assert_eq!(
            cfg.get_socket_addr().expect("valid"),
            "127.0.0.1:3000".parse().expect("literal")
        );
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
