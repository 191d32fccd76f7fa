//! Rotating User-Agent pool for listing, article, and PDF requests.
//!
//! The pool is loaded once from a JSON file shaped like
//! `{"user_agents": ["Mozilla/5.0 ...", ...]}` and shared read-only across
//! every request for the rest of the process.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ConfigError;
use crate::pacing::Entropy;

/// Default location of the identity pool file.
pub const DEFAULT_USER_AGENT_FILE: &str = "user_agents.json";

#[derive(Debug, Deserialize)]
struct UserAgentFile {
    user_agents: Vec<String>,
}

/// Immutable set of client identity strings.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Builds a pool from in-memory strings. Blank entries are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPool`] if nothing usable remains.
    pub fn new<I, S>(agents: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .map(|agent| agent.trim().to_string())
            .filter(|agent| !agent.is_empty())
            .collect();
        if agents.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        Ok(Self { agents })
    }

    /// Loads the pool from a JSON file with a top-level `user_agents` array.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing, malformed, or empty.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: UserAgentFile =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let pool = Self::new(parsed.user_agents)?;
        debug!(agents = pool.len(), "loaded user agent pool");
        Ok(pool)
    }

    /// Picks one identity uniformly at random.
    #[must_use]
    pub fn next_identity(&self, entropy: &dyn Entropy) -> &str {
        let index = entropy.pick(self.agents.len()).min(self.agents.len() - 1);
        &self.agents[index]
    }

    /// Number of identities in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always false for a constructed pool; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
