use std::net::SocketAddr;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Shared secret for the login-page password gate.
    pub password: String,
    /// Shared secret for the upload page and upload-submission routes.
    pub upload_token: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("password", &"[redacted]")
            .field("upload_token", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            database_url: "sqlite://productos.db?mode=rwc".to_string(),
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            log_level: "info".to_string(),
            password: "super-secret".to_string(),
            upload_token: "token-secret".to_string(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("token-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
