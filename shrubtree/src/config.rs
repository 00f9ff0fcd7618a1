//! Configuration for the property runner and the shrinking loop.

use std::sync::OnceLock;
use std::time::Duration;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumRuns(usize),
    InvalidMaxAttempts(usize),
    InvalidAssessmentRuns(u32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidNumRuns(n) => write!(f, "num_runs must be > 0, got {n}"),
            ConfigError::InvalidMaxAttempts(n) => write!(f, "max_attempts must be > 0, got {n}"),
            ConfigError::InvalidAssessmentRuns(n) => {
                write!(f, "assessment_runs must be > 0, got {n}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Knobs for the confirmation loop that runs when a property is suspected of
/// being flaky (`shrink_max_retries > 0`).
#[derive(Debug, Clone)]
pub struct ShrinkConfig {
    /// 0 means deterministic mode: each shrink candidate is tried exactly once.
    pub shrink_max_retries: u32,
    /// Runs performed at the start of shrinking to estimate a per-candidate
    /// time budget from the observed failure rate.
    pub assessment_runs: u32,
    /// Multiplier applied to the assessed average time-to-failure to derive
    /// the per-candidate budget.
    pub adaptive_multiplier: f64,
    /// Re-run the assessment after every successful shrink rather than reusing
    /// the initial estimate.
    pub reassess_on_success: bool,
    /// Hard ceiling on the whole shrinking phase, regardless of per-candidate
    /// budgets.
    pub shrink_timeout: Option<Duration>,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            shrink_max_retries: 0,
            assessment_runs: 10,
            adaptive_multiplier: 2.0,
            reassess_on_success: true,
            shrink_timeout: None,
        }
    }
}

impl ShrinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assessment_runs == 0 {
            return Err(ConfigError::InvalidAssessmentRuns(self.assessment_runs));
        }
        Ok(())
    }

    pub fn is_deterministic(&self) -> bool {
        self.shrink_max_retries == 0
    }
}

/// Top-level configuration for a property run.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub seed: Option<u64>,
    pub num_runs: usize,
    pub max_duration: Option<Duration>,
    pub shrink: ShrinkConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            seed: None,
            num_runs: 1000,
            max_duration: None,
            shrink: ShrinkConfig::default(),
        }
    }
}

impl TestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_runs == 0 {
            return Err(ConfigError::InvalidNumRuns(self.num_runs));
        }
        self.shrink.validate()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_num_runs(mut self, num_runs: usize) -> Self {
        self.num_runs = num_runs;
        self
    }
}

/// Runtime-configurable cap for `filter`/`such_that`, resolved as an open
/// question of the original design: how many rejected candidates a filtered
/// generator may draw before giving up.
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    pub max_attempts: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { max_attempts: 10_000 }
    }
}

static GLOBAL_SEED: OnceLock<u64> = OnceLock::new();

/// Derive the process-wide seed once: honor `PROPTEST_SEED` if present and
/// parseable, otherwise fall back to the wall clock. Cached for the lifetime
/// of the process so repeated calls within one run agree.
pub fn global_seed() -> u64 {
    *GLOBAL_SEED.get_or_init(|| {
        std::env::var("PROPTEST_SEED")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(|| {
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0)
            })
    })
}
