use std::path::PathBuf;

use anyhow::{Context, Result};

/// Server settings read from `BOARD_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Single allowed browser origin. `None` means permissive CORS.
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("BOARD_DB_PATH").unwrap_or_else(|| "board.db".into());
        let host = lookup("BOARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("BOARD_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BOARD_PORT must be a port number, got {:?}", raw))?,
            None => 3221,
        };
        let cors_origin = lookup("BOARD_CORS_ORIGIN").filter(|o| !o.trim().is_empty());

        Ok(Self {
            db_path: db_path.into(),
            host,
            port,
            cors_origin,
        })
    }

    /// Listen address for `TcpListener::bind`. The host may be an IP
    /// literal or a name such as `localhost`; names are resolved at bind time.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("board.db"));
        assert_eq!(cfg.port, 3221);
        assert_eq!(cfg.cors_origin, None);
        assert_eq!(cfg.bind_addr(), ("0.0.0.0", 3221));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("BOARD_DB_PATH", "/var/lib/board/feed.db"),
            ("BOARD_HOST", "127.0.0.1"),
            ("BOARD_PORT", "8080"),
            ("BOARD_CORS_ORIGIN", "http://localhost:3222"),
        ])
        .unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/var/lib/board/feed.db"));
        assert_eq!(cfg.bind_addr(), ("127.0.0.1", 8080));
        assert_eq!(cfg.cors_origin.as_deref(), Some("http://localhost:3222"));
    }

    #[tokio::test]
    async fn test_hostname_host_binds() {
        let cfg = config(&[("BOARD_HOST", "localhost"), ("BOARD_PORT", "0")]).unwrap();
        assert_eq!(cfg.bind_addr(), ("localhost", 0));

        let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(config(&[("BOARD_PORT", "eighty")]).is_err());
        assert!(config(&[("BOARD_PORT", "70000")]).is_err());
    }
}
