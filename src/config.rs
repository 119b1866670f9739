use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_POINTS_GOAL: u32 = 31;
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    /// `sqlite:` URL for the result store. In-memory store when unset.
    pub database_url: Option<String>,
    /// Target score for games whose creator did not pick one.
    pub points_goal: u32,
    /// Bound of each client's outbound queue.
    pub outbound_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            points_goal: DEFAULT_POINTS_GOAL,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: non_empty("TRESSETTE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: non_empty("DATABASE_URL"),
            points_goal: match non_empty("TRESSETTE_POINTS_GOAL") {
                Some(value) => positive("TRESSETTE_POINTS_GOAL", value)?,
                None => defaults.points_goal,
            },
            outbound_capacity: match non_empty("TRESSETTE_OUTBOUND_CAPACITY") {
                Some(value) => positive("TRESSETTE_OUTBOUND_CAPACITY", value)?,
                None => defaults.outbound_capacity,
            },
        })
    }
}

fn positive<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
