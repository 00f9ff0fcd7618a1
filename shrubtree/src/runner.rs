//! Drives a generator and a check closure through repeated runs, capturing
//! panics, discards, and statistics, and handing a failure off to the
//! shrinking loop.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::config::TestConfig;
use crate::context::PropertyContext;
use crate::error::{ControlSignal, PropertyError, RunOutcome};
use crate::generator::{AnyGenerator, AnyShrinkable, Generator};
use crate::random::Random;
use crate::shrink_loop::{self, ReproductionStats};

/// Result of running a property to completion: either every run passed (and
/// any registered statistic assertions held), or the first failure plus its
/// shrunk counterexample are reported.
pub struct PropertyReport<T> {
    pub passed: bool,
    pub runs: usize,
    pub seed: u64,
    pub original_counterexample: Option<T>,
    pub shrunk_counterexample: Option<T>,
    pub error: Option<PropertyError>,
    pub context_summary: String,
}

impl<T: std::fmt::Debug> PropertyReport<T> {
    /// Panics with a human-readable report; intended for `#[test]` functions
    /// that want the usual "assert and fail the test" ergonomics.
    pub fn unwrap(self) {
        if !self.passed {
            let err = self.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
            panic!(
                "property failed after {} runs (seed {})\ncounterexample: {:?}\nshrunk: {:?}\n{err}\n{}",
                self.runs,
                self.seed,
                self.original_counterexample.map(|v| format!("{v:?}")).unwrap_or_default(),
                self.shrunk_counterexample.as_ref().map(|v| format!("{v:?}")).unwrap_or_default(),
                self.context_summary,
            );
        }
    }
}

/// A property under test: a generator for its argument and the runtime
/// configuration controlling how many times, and how carefully, it is
/// exercised.
pub struct Property<T> {
    generator: Generator<T>,
    config: TestConfig,
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Folds a run's outcome in priority order: a `prop_discard`/`prop_success`
/// signal wins first, then any `prop_expect*` failures recorded in the
/// context, then the closure's own return value. Matches spec step 6/7/8:
/// expectations are flushed before the closure's boolean is consulted.
fn finish_run(ctx: &mut PropertyContext, closure_result: Result<bool, PropertyError>) -> RunOutcome {
    if let Some(signal) = ctx.take_signal() {
        return match signal {
            ControlSignal::Discard => RunOutcome::Discard,
            ControlSignal::Success => RunOutcome::Success,
        };
    }
    if let Some(first) = ctx.drain_failures().into_iter().next() {
        return RunOutcome::Fail(first);
    }
    match closure_result {
        Ok(true) => RunOutcome::Pass,
        Ok(false) => RunOutcome::Fail(PropertyError::expectation_failed(
            "property closure returned false",
            "<property>",
            0,
        )),
        Err(err) => RunOutcome::Fail(err),
    }
}

fn run_check<T>(
    check: &impl Fn(&T, &mut PropertyContext) -> Result<bool, PropertyError>,
    value: &T,
    ctx: &mut PropertyContext,
) -> RunOutcome {
    ctx.reset_per_run();
    match panic::catch_unwind(AssertUnwindSafe(|| check(value, ctx))) {
        Ok(closure_result) => finish_run(ctx, closure_result),
        Err(payload) => RunOutcome::Fail(PropertyError::UserPanic { message: panic_message(payload) }),
    }
}

/// Type-erased counterpart of `run_check`, driving a heterogeneous argument
/// slice instead of a single concrete value.
fn run_check_dyn(
    check: &impl Fn(&[AnyShrinkable], &mut PropertyContext) -> Result<bool, PropertyError>,
    values: &[AnyShrinkable],
    ctx: &mut PropertyContext,
) -> RunOutcome {
    ctx.reset_per_run();
    match panic::catch_unwind(AssertUnwindSafe(|| check(values, ctx))) {
        Ok(closure_result) => finish_run(ctx, closure_result),
        Err(payload) => RunOutcome::Fail(PropertyError::UserPanic { message: panic_message(payload) }),
    }
}

impl<T: Clone + std::fmt::Debug + 'static> Property<T> {
    pub fn new(generator: Generator<T>) -> Self {
        Property { generator, config: TestConfig::default() }
    }

    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn num_runs(mut self, num_runs: usize) -> Self {
        self.config.num_runs = num_runs;
        self
    }

    /// Exercises the property across `config.num_runs` generated values,
    /// shrinking and reporting the first failure encountered.
    pub fn for_all(
        &self,
        check: impl Fn(&T, &mut PropertyContext) -> Result<bool, PropertyError> + 'static,
    ) -> PropertyReport<T> {
        self.config.validate().expect("invalid test configuration");
        let seed = self.config.seed.unwrap_or_else(crate::config::global_seed);
        let mut rng = Random::from_seed(seed);
        let start = Instant::now();
        let mut ctx = PropertyContext::new();
        let mut runs = 0usize;

        while runs < self.config.num_runs {
            if let Some(max) = self.config.max_duration {
                if start.elapsed() >= max {
                    break;
                }
            }
            let pre_rng = rng.clone();
            let shr = self.generator.generate(&mut rng);
            match run_check(&check, shr.value(), &mut ctx) {
                // `Success` (via `prop_success`) ends this run early and
                // still counts it, same as an ordinary pass.
                RunOutcome::Pass | RunOutcome::Success => {
                    ctx.record_run();
                    runs += 1;
                }
                RunOutcome::Discard => continue,
                RunOutcome::Fail(err) => {
                    let check_for_shrink = move |v: &T| {
                        let mut scratch = PropertyContext::new();
                        run_check(&check, v, &mut scratch)
                    };
                    let shrunk = shrink_loop::shrink(
                        &self.generator,
                        pre_rng,
                        &check_for_shrink,
                        &self.config.shrink,
                        |_stats: ReproductionStats| {},
                    );
                    return PropertyReport {
                        passed: false,
                        runs,
                        seed,
                        original_counterexample: Some(shr.value().clone()),
                        shrunk_counterexample: Some(shrunk),
                        error: Some(err),
                        context_summary: ctx.summary(),
                    };
                }
            }
        }

        if let Err(err) = ctx.check_assertions() {
            return PropertyReport {
                passed: false,
                runs,
                seed,
                original_counterexample: None,
                shrunk_counterexample: None,
                error: Some(err),
                context_summary: ctx.summary(),
            };
        }

        PropertyReport {
            passed: true,
            runs,
            seed,
            original_counterexample: None,
            shrunk_counterexample: None,
            error: None,
            context_summary: ctx.summary(),
        }
    }

    /// Checks a single explicit value, bypassing generation entirely.
    pub fn example(&self, value: T, check: impl Fn(&T) -> Result<bool, PropertyError>) -> bool {
        let wrapped = move |v: &T, _ctx: &mut PropertyContext| check(v);
        matches!(run_check(&wrapped, &value, &mut PropertyContext::new()), RunOutcome::Pass)
    }

    /// Checks every value in a fixed table, useful for regression corpora
    /// alongside random generation.
    pub fn matrix(values: Vec<T>, check: impl Fn(&T) -> Result<bool, PropertyError>) -> bool {
        let wrapped = move |v: &T, _ctx: &mut PropertyContext| check(v);
        values.iter().all(|v| matches!(run_check(&wrapped, v, &mut PropertyContext::new()), RunOutcome::Pass))
    }
}

impl<A, B> Property<(A, B)>
where
    A: Clone + std::fmt::Debug + 'static,
    B: Clone + std::fmt::Debug + 'static,
{
    /// Checks the closure against the full Cartesian product of the two
    /// per-argument tables, invoking it exactly `a_values.len() *
    /// b_values.len()` times.
    pub fn matrix2(a_values: &[A], b_values: &[B], check: impl Fn(&A, &B) -> Result<bool, PropertyError>) -> bool {
        let wrapped = |v: &(A, B), _ctx: &mut PropertyContext| check(&v.0, &v.1);
        for a in a_values {
            for b in b_values {
                let pair = (a.clone(), b.clone());
                if !matches!(run_check(&wrapped, &pair, &mut PropertyContext::new()), RunOutcome::Pass) {
                    return false;
                }
            }
        }
        true
    }
}

impl<A, B, C> Property<(A, B, C)>
where
    A: Clone + std::fmt::Debug + 'static,
    B: Clone + std::fmt::Debug + 'static,
    C: Clone + std::fmt::Debug + 'static,
{
    /// Three-argument counterpart of [`Property::matrix2`].
    pub fn matrix3(
        a_values: &[A],
        b_values: &[B],
        c_values: &[C],
        check: impl Fn(&A, &B, &C) -> Result<bool, PropertyError>,
    ) -> bool {
        let wrapped = |v: &(A, B, C), _ctx: &mut PropertyContext| check(&v.0, &v.1, &v.2);
        for a in a_values {
            for b in b_values {
                for c in c_values {
                    let triple = (a.clone(), b.clone(), c.clone());
                    if !matches!(run_check(&wrapped, &triple, &mut PropertyContext::new()), RunOutcome::Pass) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Result of running a type-erased property to completion, mirroring
/// [`PropertyReport`] for a heterogeneous argument vector whose individual
/// argument types aren't known until runtime.
pub struct DynPropertyReport {
    pub passed: bool,
    pub runs: usize,
    pub seed: u64,
    pub original_counterexample: Option<Vec<String>>,
    pub shrunk_counterexample: Option<Vec<String>>,
    pub error: Option<PropertyError>,
    pub context_summary: String,
}

/// A property over a heterogeneous argument vector, each argument drawn from
/// its own [`AnyGenerator`]. Exists alongside `Property<T>` rather than
/// replacing it: most properties are single- or fixed-arity and don't need
/// erasure, but callers building argument lists dynamically (e.g. a derive
/// macro or a stateful action list) do.
pub struct DynProperty {
    generators: Vec<AnyGenerator>,
    config: TestConfig,
}

impl DynProperty {
    pub fn new(generators: Vec<AnyGenerator>) -> Self {
        DynProperty { generators, config: TestConfig::default() }
    }

    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn num_runs(mut self, num_runs: usize) -> Self {
        self.config.num_runs = num_runs;
        self
    }

    /// Exercises the property across `config.num_runs` draws of the whole
    /// argument vector. Shrinking on failure is deterministic-only: erased
    /// shrink trees are eager `Vec`s rather than lazy streams, so there's no
    /// reproduction-budget assessment to run (see
    /// [`shrink_loop::shrink_dyn_deterministic`]).
    pub fn for_all(
        &self,
        check: impl Fn(&[AnyShrinkable], &mut PropertyContext) -> Result<bool, PropertyError> + 'static,
    ) -> DynPropertyReport {
        self.config.validate().expect("invalid test configuration");
        let seed = self.config.seed.unwrap_or_else(crate::config::global_seed);
        let mut rng = Random::from_seed(seed);
        let start = Instant::now();
        let mut ctx = PropertyContext::new();
        let mut runs = 0usize;

        while runs < self.config.num_runs {
            if let Some(max) = self.config.max_duration {
                if start.elapsed() >= max {
                    break;
                }
            }
            let values: Vec<AnyShrinkable> = self.generators.iter().map(|g| g.generate(&mut rng)).collect();
            match run_check_dyn(&check, &values, &mut ctx) {
                RunOutcome::Pass | RunOutcome::Success => {
                    ctx.record_run();
                    runs += 1;
                }
                RunOutcome::Discard => continue,
                RunOutcome::Fail(err) => {
                    let check_for_shrink = move |vs: &[AnyShrinkable]| {
                        let mut scratch = PropertyContext::new();
                        run_check_dyn(&check, vs, &mut scratch)
                    };
                    let shrunk = shrink_loop::shrink_dyn_deterministic(values.clone(), &check_for_shrink);
                    return DynPropertyReport {
                        passed: false,
                        runs,
                        seed,
                        original_counterexample: Some(values.iter().map(|v| v.display()).collect()),
                        shrunk_counterexample: Some(shrunk.iter().map(|v| v.display()).collect()),
                        error: Some(err),
                        context_summary: ctx.summary(),
                    };
                }
            }
        }

        if let Err(err) = ctx.check_assertions() {
            return DynPropertyReport {
                passed: false,
                runs,
                seed,
                original_counterexample: None,
                shrunk_counterexample: None,
                error: Some(err),
                context_summary: ctx.summary(),
            };
        }

        DynPropertyReport {
            passed: true,
            runs,
            seed,
            original_counterexample: None,
            shrunk_counterexample: None,
            error: None,
            context_summary: ctx.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::in_range;

    #[test]
    fn passing_property_reports_success() {
        let prop = Property::new(in_range(0, 10)).seed(1).num_runs(50);
        let report = prop.for_all(|v, _ctx| Ok(*v >= 0 && *v <= 10));
        assert!(report.passed);
        assert_eq!(report.runs, 50);
    }

    #[test]
    fn failing_property_reports_shrunk_counterexample() {
        let prop = Property::new(in_range(0, 1000)).seed(7).num_runs(200);
        let report = prop.for_all(|v, _ctx| Ok(*v < 500));
        assert!(!report.passed);
        assert_eq!(report.shrunk_counterexample, Some(500));
    }

    #[test]
    fn panicking_closure_is_captured_as_user_panic() {
        let prop = Property::new(in_range(0, 10)).seed(2).num_runs(20);
        let report = prop.for_all(|v, _ctx| {
            if *v == 0 {
                panic!("boom");
            }
            Ok(true)
        });
        assert!(!report.passed);
        assert!(matches!(report.error, Some(PropertyError::UserPanic { .. })));
    }

    #[test]
    fn example_checks_a_single_value() {
        let prop = Property::new(in_range(0, 10));
        assert!(prop.example(5, |v| Ok(*v == 5)));
        assert!(!prop.example(5, |v| Ok(*v == 6)));
    }

    #[test]
    fn stat_assertion_failure_is_reported_even_when_every_run_passes() {
        let prop = Property::new(in_range(0, 10)).seed(3).num_runs(30);
        let report = prop.for_all(|v, ctx| {
            ctx.classify(*v > 100, "improbable", "yes");
            ctx.stat_assert_ge("improbable", 0.5);
            Ok(true)
        });
        assert!(!report.passed);
        assert!(matches!(report.error, Some(PropertyError::StatAssertionFailed { .. })));
    }

    #[test]
    fn prop_discard_redraws_without_counting_the_run() {
        let prop = Property::new(in_range(0, 10)).seed(4).num_runs(20);
        let report = prop.for_all(|v, ctx| {
            if *v == 0 {
                ctx.prop_discard();
                return Ok(true);
            }
            Ok(true)
        });
        assert!(report.passed);
        assert_eq!(report.runs, 20);
    }

    #[test]
    fn prop_success_ends_the_run_early_as_a_pass() {
        let prop = Property::new(in_range(0, 10)).seed(5).num_runs(10);
        let report = prop.for_all(|_v, ctx| {
            ctx.prop_success();
            panic!("should never run past prop_success");
        });
        assert!(report.passed);
        assert_eq!(report.runs, 10);
    }

    #[test]
    fn prop_expect_failure_fails_the_run_even_when_closure_returns_true() {
        let prop = Property::new(in_range(0, 10)).seed(6).num_runs(10);
        let report = prop.for_all(|v, ctx| {
            ctx.prop_expect(*v < 5, "v < 5", file!(), line!());
            Ok(true)
        });
        assert!(!report.passed);
        assert!(matches!(report.error, Some(PropertyError::ExpectationFailed { .. })));
    }

    #[test]
    fn matrix2_invokes_closure_for_every_pair_in_the_product() {
        use std::cell::Cell;
        let count = Cell::new(0);
        let ok = Property::<(i32, i32)>::matrix2(&[1, 2, 3], &[10, 20], |a, b| {
            count.set(count.get() + 1);
            Ok(a + b > 0)
        });
        assert!(ok);
        assert_eq!(count.get(), 6);
    }

    #[test]
    fn matrix2_reports_failure_on_first_bad_pair() {
        let ok = Property::<(i32, i32)>::matrix2(&[1, 2], &[1, 2], |a, b| Ok(a + b < 4));
        assert!(!ok);
    }

    #[test]
    fn dyn_property_finds_and_shrinks_a_failure() {
        let gens = vec![
            AnyGenerator::from_typed(in_range(0, 1000)),
            AnyGenerator::from_typed(in_range(0, 1000)),
        ];
        let report = DynProperty::new(gens).seed(9).num_runs(200).for_all(|values, _ctx| {
            let a = *values[0].downcast::<i64>().unwrap();
            let b = *values[1].downcast::<i64>().unwrap();
            Ok(a + b < 50)
        });
        assert!(!report.passed);
        let shrunk = report.shrunk_counterexample.unwrap();
        assert_eq!(shrunk.len(), 2);
    }
}
