//! Server and game rule configuration

use shared::{
    CLEANUP_INTERVAL_SECS, CORRECT_BONUS_SECS, INACTIVITY_TIMEOUT_SECS, ROUND_TIME_SECS,
    WRONG_PENALTY_SECS,
};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid listen address {0}")]
    InvalidAddress(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Rules of a round and the timing of the background tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Seconds on the clock at round start, and the upper bound for `time_left`
    pub round_time: u32,
    pub correct_bonus: u32,
    pub wrong_penalty: u32,
    /// How often a running round loses one second
    pub tick_period: Duration,
    /// Idle time after which a session is reaped
    pub inactivity_timeout: Duration,
    /// How often the reaper sweeps the session store
    pub cleanup_interval: Duration,
    /// Fixed seed for reproducible problem sequences
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_time: ROUND_TIME_SECS,
            correct_bonus: CORRECT_BONUS_SECS,
            wrong_penalty: WRONG_PENALTY_SECS,
            tick_period: Duration::from_secs(1),
            inactivity_timeout: Duration::from_secs(INACTIVITY_TIMEOUT_SECS),
            cleanup_interval: Duration::from_secs(CLEANUP_INTERVAL_SECS),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Rejects values that would make a round or a background interval degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_time == 0 {
            return Err(ConfigError::Zero("round time"));
        }
        if self.tick_period.is_zero() {
            return Err(ConfigError::Zero("tick period"));
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::Zero("cleanup interval"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        };
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(address))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.game.validate()
    }
}
