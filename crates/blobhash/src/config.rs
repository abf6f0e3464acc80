//! Configuration for hashing jobs.

use serde::{Deserialize, Serialize};

use blobhash_core::AlgorithmSet;

use crate::error::ConfigError;

/// Environment variable naming the hosting environment.
pub const ENV_ENVIRONMENT: &str = "BLOBHASH_ENVIRONMENT";

/// Environment variable listing the algorithms to compute, comma-separated.
pub const ENV_ALGORITHMS: &str = "BLOBHASH_ALGORITHMS";

/// How the run obtains the version token it conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPolicy {
    /// Use the token delivered with the triggering event.
    #[default]
    Strict,
    /// Fetch the object's live token immediately before use.
    ///
    /// For stores whose tokens are not stable between the event and the run
    /// (local emulators). Weakens the freshness guarantee.
    RefreshLive,
}

/// Configuration for [`BlobHasher`](crate::BlobHasher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Algorithms computed on every run. All of them are mandatory.
    pub algorithms: AlgorithmSet,
    /// Version token resolution.
    pub token_policy: TokenPolicy,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            algorithms: AlgorithmSet::all(),
            token_policy: TokenPolicy::Strict,
        }
    }
}

impl HashingConfig {
    /// Load from the process environment.
    ///
    /// `BLOBHASH_ENVIRONMENT=Development` selects [`TokenPolicy::RefreshLive`];
    /// `BLOBHASH_ALGORITHMS` overrides the default set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            if environment.trim().eq_ignore_ascii_case("development") {
                config.token_policy = TokenPolicy::RefreshLive;
            }
        }

        if let Some(algorithms) = lookup(ENV_ALGORITHMS) {
            config.algorithms = algorithms.parse().map_err(|source| ConfigError::InvalidValue {
                key: ENV_ALGORITHMS,
                source,
            })?;
        }

        Ok(config)
    }

    /// Parse from JSON, e.g. `{"algorithms": ["MD5"], "token_policy": "strict"}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
