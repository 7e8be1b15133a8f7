//! Browser identity pool rotated per fetch.
//!
//! Each `fetch` call picks one identity from the pool and keeps it for all of
//! its retries. The randomness source is passed in by the caller so a seeded
//! generator makes the choice reproducible.
use rand::Rng;
use reqwest::header::HeaderValue;

use crate::error::RateError;

/// Compiled-in desktop Chrome identities.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4464.5 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.7113.93 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.93 Safari/537.36",
];

/// A non-empty set of valid `User-Agent` header values.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Build a pool from `agents`.
    ///
    /// Fails when the list is empty or when an entry is blank or could not be
    /// sent as a header value.
    pub fn new<S: AsRef<str>>(agents: &[S]) -> Result<Self, RateError> {
        if agents.is_empty() {
            return Err(RateError::EmptyUserAgentPool);
        }

        let mut pool = Vec::with_capacity(agents.len());
        for agent in agents {
            let agent = agent.as_ref().trim();
            if agent.is_empty() || HeaderValue::from_str(agent).is_err() {
                return Err(RateError::InvalidUserAgent(agent.to_string()));
            }
            pool.push(agent.to_string());
        }
        Ok(UserAgentPool { agents: pool })
    }

    /// Pick one identity uniformly at random.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        let index = rng.random_range(0..self.agents.len());
        &self.agents[index]
    }

    /// All identities in the pool.
    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        UserAgentPool {
            agents: USER_AGENTS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_pick_always_returns_pool_member() {
        let pools: Vec<UserAgentPool> = vec![
            UserAgentPool::default(),
            UserAgentPool::new(&["agent/1.0"]).unwrap(),
            UserAgentPool::new(&["a/1", "b/2", "c/3", "d/4", "e/5"]).unwrap(),
        ];

        for pool in &pools {
            for seed in 0..64 {
                let mut rng = StdRng::seed_from_u64(seed);
                let agent = pool.pick(&mut rng);
                assert!(!agent.is_empty());
                assert!(pool.agents().iter().any(|a| a == agent));
            }
        }
    }

    #[test]
    fn test_pick_covers_whole_default_pool() {
        let pool = UserAgentPool::default();
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<String> = (0..200).map(|_| pool.pick(&mut rng).to_string()).collect();
        assert_eq!(seen.len(), USER_AGENTS.len());
    }

    #[test]
    fn test_pick_is_reproducible_with_seed() {
        let pool = UserAgentPool::default();
        let first: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..10).map(|_| pool.pick(&mut rng).to_string()).collect()
        };
        let second: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..10).map(|_| pool.pick(&mut rng).to_string()).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_rejects_empty_pool() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            UserAgentPool::new(&empty),
            Err(RateError::EmptyUserAgentPool)
        ));
    }

    #[test]
    fn test_new_rejects_blank_and_malformed_entries() {
        assert!(matches!(
            UserAgentPool::new(&["ok/1", "   "]),
            Err(RateError::InvalidUserAgent(_))
        ));
        assert!(matches!(
            UserAgentPool::new(&["bad\nagent"]),
            Err(RateError::InvalidUserAgent(_))
        ));
    }
}
