use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use staffgate_core::GateConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: GateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
            users: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            rate_limit: GateConfig::default(),
        }
    }
}

fn default_jwt_ttl_hours() -> u64 { 24 }

const MAX_JWT_TTL_HOURS: u64 = 24 * 365;

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.auth.users.iter().find(|u| u.username == username)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("STAFFGATE_CONFIG").map(PathBuf::from).ok();

        let mut config = match config_path {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)?;
                Self::from_toml(&contents)?
            }
            None => ServerConfig::default(),
        };

        if let Ok(addr) = std::env::var("STAFFGATE_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }
        if let Ok(secret) = std::env::var("STAFFGATE_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Some(n) = env_u64("STAFFGATE_AUTH_RPW")? {
            config.rate_limit.auth_requests_per_window = n;
        }
        if let Some(n) = env_u64("STAFFGATE_GENERAL_RPW")? {
            config.rate_limit.general_requests_per_window = n;
        }
        if let Some(n) = env_u64("STAFFGATE_WINDOW_SECS")? {
            config.rate_limit.window_secs = n;
        }

        if config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        }
        if config.auth.users.is_empty() {
            tracing::warn!("No users configured. Every login attempt will be refused.");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks the secret and the rate limit policy.
    pub fn validate(&self) -> anyhow::Result<()> {
        if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random secret via STAFFGATE_JWT_SECRET."
            );
        }
        if self.auth.jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT secret is shorter than 32 characters. \
                 Consider using a stronger secret via STAFFGATE_JWT_SECRET."
            );
        }
        if self.auth.jwt_ttl_hours == 0 || self.auth.jwt_ttl_hours > MAX_JWT_TTL_HOURS {
            anyhow::bail!("jwt_ttl_hours must be between 1 and {MAX_JWT_TTL_HOURS}");
        }
        self.rate_limit.validate()?;
        Ok(())
    }
}

fn env_u64(key: &str) -> anyhow::Result<Option<u64>> {
    match std::env::var(key) {
        Ok(val) => val
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key} must be a non-negative integer: {e}")),
        Err(_) => Ok(None),
    }
}
