use std::time::Duration;

/// Runtime configuration, read once at startup from the environment
/// (`.env` is loaded first via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub admin_email: String,
    pub session_ttl: Duration,
    pub notify_timeout: Duration,
    /// Whether changing a password revokes the principal's other sessions.
    pub invalidate_sessions_on_password_change: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl Config {
    pub fn from_env() -> Self {
        let invalidate = match std::env::var("INVALIDATE_SESSIONS_ON_PASSWORD_CHANGE") {
            Ok(v) => !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"),
            Err(_) => true,
        };
        Config {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8080"),
            database_path: env_or("DATABASE_PATH", "data/mentorlink.db"),
            admin_email: env_or("ADMIN_EMAIL", "admin@nitap.ac.in"),
            session_ttl: env_secs("SESSION_TTL_SECS", 8 * 3600),
            notify_timeout: env_secs("NOTIFY_TIMEOUT_SECS", 10),
            invalidate_sessions_on_password_change: invalidate,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: "data/mentorlink.db".to_string(),
            admin_email: "admin@nitap.ac.in".to_string(),
            session_ttl: Duration::from_secs(8 * 3600),
            notify_timeout: Duration::from_secs(10),
            invalidate_sessions_on_password_change: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert!(cfg.invalidate_sessions_on_password_change);
        assert!(cfg.session_ttl.as_secs() > 0);
        assert!(cfg.notify_timeout.as_secs() > 0);
    }
}
