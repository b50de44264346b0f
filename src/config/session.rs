use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub ttl: Duration,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300); // 5 minutes

        Self {
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}
