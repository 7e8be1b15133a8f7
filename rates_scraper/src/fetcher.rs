//! Fetch orchestration: request, validate, back off, retry.
//!
//! One `fetch` call picks a single `User-Agent` and keeps it for every
//! attempt. Every response is checked by the validator as soon as it
//! arrives and the first accepted one is returned. After each rejected
//! re-fetch a random backoff pause is taken, so a page that never validates
//! costs `max_retries + 1` requests and `max_retries` pauses.
//!
//! Only validation failures are retried. A transport error from the source
//! ends the call at once. Cancellation and the optional deadline are checked
//! at every retry boundary and before every pause.
use log::{debug, info, warn};
use rand::Rng;
use rates_common::{RateError, UserAgentPool};
use reqwest::Url;
use reqwest::header::HeaderMap;
use scraper::Html;
use std::time::{Duration, Instant};

use crate::source::{DocumentSource, merge_headers};
use crate::validator::Validator;
use crate::wait::Wait;

/// Default number of re-fetches after the first attempt.
pub const DEFAULT_RETRIES: u32 = 10;
/// Default lower bound of a backoff pause.
pub const DEFAULT_BACKOFF_MIN: Duration = Duration::ZERO;
/// Default upper bound (exclusive) of a backoff pause.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(3);

/// Uniform random pause range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Shortest pause.
    pub min: Duration,
    /// Longest pause, exclusive.
    pub max: Duration,
}

impl Backoff {
    /// Create a pause range.
    pub fn new(min: Duration, max: Duration) -> Self {
        Backoff { min, max }
    }

    /// Draw one pause. An empty range always yields `min`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::new(DEFAULT_BACKOFF_MIN, DEFAULT_BACKOFF_MAX)
    }
}

/// Per-call fetch settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Caller headers, replacing base headers of the same name.
    pub headers: HeaderMap,
    /// Run page scripts before validation.
    pub render: bool,
    /// Re-fetches allowed after the first attempt.
    pub max_retries: u32,
    /// Pause drawn after each re-fetch.
    pub backoff: Backoff,
    /// Give up once this instant has passed.
    pub deadline: Option<Instant>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            headers: HeaderMap::new(),
            render: false,
            max_retries: DEFAULT_RETRIES,
            backoff: Backoff::default(),
            deadline: None,
        }
    }
}

/// Drives a document source until a validator accepts the result.
pub struct Fetcher<S, W, R> {
    source: S,
    waiter: W,
    rng: R,
    agents: UserAgentPool,
}

impl<S, W, R> Fetcher<S, W, R>
where
    S: DocumentSource,
    W: Wait,
    R: Rng,
{
    /// Create a fetcher using the built-in user-agent pool.
    pub fn new(source: S, waiter: W, rng: R) -> Self {
        Fetcher {
            source,
            waiter,
            rng,
            agents: UserAgentPool::default(),
        }
    }

    /// Rotate identities from `agents` instead of the built-in pool.
    pub fn with_agents(mut self, agents: UserAgentPool) -> Self {
        self.agents = agents;
        self
    }

    /// Underlying document source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Underlying waiter.
    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    /// Fetch `url` until `validator` accepts the document.
    ///
    /// Makes at most `max_retries + 1` source calls and fails with
    /// `RateError::ValidationExhausted` if none of them validates.
    pub fn fetch(
        &mut self,
        url: &Url,
        options: &FetchOptions,
        validator: &dyn Validator,
    ) -> Result<Html, RateError> {
        let user_agent = self.agents.pick(&mut self.rng).to_string();
        let headers = merge_headers(&user_agent, &options.headers)?;
        info!("Fetching {} as {}", url, user_agent);

        let mut attempts: u32 = 1;
        let mut document = self.source.get(url, &headers, options.render)?;
        if validator.is_valid(&document) {
            debug!("Attempt {} validated", attempts);
            return Ok(document);
        }

        let mut retries: u32 = 0;
        while retries < options.max_retries {
            self.check_boundary(options, attempts)?;
            info!(
                "Attempt {} did not validate, retrying ({}/{})",
                attempts,
                retries + 1,
                options.max_retries
            );
            document = self.source.get(url, &headers, options.render)?;
            attempts += 1;
            retries += 1;

            if validator.is_valid(&document) {
                debug!("Attempt {} validated", attempts);
                return Ok(document);
            }

            let mut delay = options.backoff.sample(&mut self.rng);
            self.check_boundary(options, attempts)?;
            if let Some(deadline) = options.deadline {
                delay = delay.min(deadline.saturating_duration_since(Instant::now()));
            }
            debug!("Backing off for {:?}", delay);
            self.waiter.wait(delay)?;
        }

        warn!("Giving up on {} after {} attempts", url, attempts);
        Err(RateError::ValidationExhausted {
            retries: options.max_retries,
        })
    }

    fn check_boundary(&self, options: &FetchOptions, attempts: u32) -> Result<(), RateError> {
        if self.waiter.is_cancelled() {
            warn!("Fetch cancelled after {} attempts", attempts);
            return Err(RateError::Cancelled);
        }
        if let Some(deadline) = options.deadline {
            if Instant::now() >= deadline {
                warn!("Fetch deadline passed after {} attempts", attempts);
                return Err(RateError::DeadlineExceeded { attempts });
            }
        }
        Ok(())
    }
}
