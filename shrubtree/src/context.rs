//! Per-run bookkeeping: tags, recorded statistics, the assertions a property
//! can register against them, and the expectation/control-signal surface a
//! check closure uses to report soft failures, discards, and early successes.

use std::collections::HashMap;

use crate::error::{ControlSignal, PropertyError};

/// A bound a collected statistic must satisfy once the run completes.
#[derive(Debug, Clone)]
pub enum StatAssertion {
    Ge(f64),
    Le(f64),
    InRange(f64, f64),
}

impl StatAssertion {
    fn holds(&self, value: f64) -> bool {
        match self {
            StatAssertion::Ge(bound) => value >= *bound,
            StatAssertion::Le(bound) => value <= *bound,
            StatAssertion::InRange(lo, hi) => value >= *lo && value <= *hi,
        }
    }

    fn describe(&self) -> String {
        match self {
            StatAssertion::Ge(bound) => format!(">= {bound}"),
            StatAssertion::Le(bound) => format!("<= {bound}"),
            StatAssertion::InRange(lo, hi) => format!("in [{lo}, {hi}]"),
        }
    }
}

/// Accumulates tag/classification counts and statistic assertions across a
/// property's runs. One context lives per `Property`, reset between
/// independent property instances but shared across all runs of the same
/// instance so frequencies are meaningful.
#[derive(Default)]
pub struct PropertyContext {
    tags: HashMap<String, HashMap<String, usize>>,
    total_runs: usize,
    assertions: Vec<(String, StatAssertion)>,
    /// Failures recorded via `prop_expect*` during the current run. Flushed
    /// (and cleared) at the end of every run: a non-empty list fails the run
    /// even when the closure itself returned `Ok(true)`.
    failures: Vec<PropertyError>,
    /// A discard/success signal raised via `prop_discard`/`prop_success`,
    /// which short-circuits the run's outcome ahead of its return value or
    /// any recorded expectation failures.
    signal: Option<ControlSignal>,
}

impl PropertyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run(&mut self) {
        self.total_runs += 1;
    }

    /// Clears the per-run expectation/signal state ahead of a fresh run.
    /// Tags, assertions, and the run counter persist across runs so
    /// frequencies stay meaningful.
    pub fn reset_per_run(&mut self) {
        self.failures.clear();
        self.signal = None;
    }

    pub fn tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        *self.tags.entry(key.into()).or_default().entry(value.into()).or_insert(0) += 1;
    }

    pub fn classify(&mut self, condition: bool, key: impl Into<String>, value: impl Into<String>) {
        if condition {
            self.tag(key, value);
        }
    }

    /// `prop_tag`: unconditional tag, named to match the external interface.
    pub fn prop_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tag(key, value);
    }

    /// `prop_classify`: conditional tag, named to match the external interface.
    pub fn prop_classify(&mut self, condition: bool, key: impl Into<String>, value: impl Into<String>) {
        self.classify(condition, key, value);
    }

    /// Records a numeric observation under `key`, for later inspection via
    /// [`PropertyContext::summary`]. A thin convenience over `tag` for values
    /// that aren't naturally strings.
    pub fn prop_stat(&mut self, key: impl Into<String>, value: f64) {
        self.tag(key, format!("{value}"));
    }

    /// Records an expectation failure if `condition` is false, without
    /// stopping the run immediately; flushed at the end of the run. Returns
    /// `condition` so callers can chain on it if they want early exit too.
    pub fn prop_expect(
        &mut self,
        condition: bool,
        message: impl Into<String>,
        file: &'static str,
        line: u32,
    ) -> bool {
        if !condition {
            self.failures.push(PropertyError::expectation_failed(message, file, line));
        }
        condition
    }

    pub fn prop_expect_eq<T: PartialEq + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left == right, format!("expected {left:?} == {right:?}"), file, line)
    }

    pub fn prop_expect_ne<T: PartialEq + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left != right, format!("expected {left:?} != {right:?}"), file, line)
    }

    pub fn prop_expect_lt<T: PartialOrd + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left < right, format!("expected {left:?} < {right:?}"), file, line)
    }

    pub fn prop_expect_gt<T: PartialOrd + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left > right, format!("expected {left:?} > {right:?}"), file, line)
    }

    pub fn prop_expect_le<T: PartialOrd + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left <= right, format!("expected {left:?} <= {right:?}"), file, line)
    }

    pub fn prop_expect_ge<T: PartialOrd + std::fmt::Debug>(
        &mut self,
        left: &T,
        right: &T,
        file: &'static str,
        line: u32,
    ) -> bool {
        self.prop_expect(left >= right, format!("expected {left:?} >= {right:?}"), file, line)
    }

    /// Re-draw this value without counting it as a run.
    pub fn prop_discard(&mut self) {
        self.signal = Some(ControlSignal::Discard);
    }

    /// This run trivially passes; skip its remaining checks.
    pub fn prop_success(&mut self) {
        self.signal = Some(ControlSignal::Success);
    }

    pub fn take_signal(&mut self) -> Option<ControlSignal> {
        self.signal.take()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn drain_failures(&mut self) -> Vec<PropertyError> {
        std::mem::take(&mut self.failures)
    }

    pub fn stat_assert_ge(&mut self, key: impl Into<String>, bound: f64) {
        self.assertions.push((key.into(), StatAssertion::Ge(bound)));
    }

    pub fn stat_assert_le(&mut self, key: impl Into<String>, bound: f64) {
        self.assertions.push((key.into(), StatAssertion::Le(bound)));
    }

    pub fn stat_assert_in_range(&mut self, key: impl Into<String>, lo: f64, hi: f64) {
        self.assertions.push((key.into(), StatAssertion::InRange(lo, hi)));
    }

    pub fn frequency(&self, key: &str, value: &str) -> f64 {
        if self.total_runs == 0 {
            return 0.0;
        }
        let count = self.tags.get(key).and_then(|m| m.get(value)).copied().unwrap_or(0);
        count as f64 / self.total_runs as f64
    }

    /// Evaluates every registered assertion against the tag with the same
    /// name, summed across all of its values (the total proportion of runs
    /// that tagged this key at all).
    pub fn check_assertions(&self) -> Result<(), PropertyError> {
        for (key, assertion) in &self.assertions {
            let total_tagged: usize =
                self.tags.get(key.as_str()).map(|m| m.values().sum()).unwrap_or(0);
            let proportion = if self.total_runs == 0 { 0.0 } else { total_tagged as f64 / self.total_runs as f64 };
            if !assertion.holds(proportion) {
                return Err(PropertyError::StatAssertionFailed {
                    key: key.clone(),
                    message: format!("observed {proportion:.4}, expected {}", assertion.describe()),
                });
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{} runs", self.total_runs)];
        for (key, values) in &self.tags {
            for (value, count) in values {
                lines.push(format!("  {key}={value}: {count} ({:.1}%)", 100.0 * *count as f64 / self.total_runs.max(1) as f64));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_reflects_recorded_tags() {
        let mut ctx = PropertyContext::new();
        for i in 0..10 {
            ctx.record_run();
            ctx.classify(i % 2 == 0, "parity", "even");
        }
        assert_eq!(ctx.frequency("parity", "even"), 0.5);
    }

    #[test]
    fn ge_assertion_fails_when_underrepresented() {
        let mut ctx = PropertyContext::new();
        for _ in 0..10 {
            ctx.record_run();
        }
        ctx.tag("rare", "x");
        ctx.stat_assert_ge("rare", 0.5);
        assert!(ctx.check_assertions().is_err());
    }

    #[test]
    fn in_range_assertion_passes_within_bounds() {
        let mut ctx = PropertyContext::new();
        for i in 0..10 {
            ctx.record_run();
            ctx.classify(i < 5, "half", "yes");
        }
        ctx.stat_assert_in_range("half", 0.4, 0.6);
        assert!(ctx.check_assertions().is_ok());
    }

    #[test]
    fn prop_expect_records_a_failure_and_returns_the_condition() {
        let mut ctx = PropertyContext::new();
        assert!(ctx.prop_expect(true, "fine", file!(), line!()));
        assert!(!ctx.has_failures());
        assert!(!ctx.prop_expect(false, "not fine", file!(), line!()));
        assert!(ctx.has_failures());
        assert_eq!(ctx.drain_failures().len(), 1);
        assert!(!ctx.has_failures());
    }

    #[test]
    fn prop_expect_eq_formats_both_sides_on_mismatch() {
        let mut ctx = PropertyContext::new();
        assert!(!ctx.prop_expect_eq(&1, &2, file!(), line!()));
        let failures = ctx.drain_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains('1'));
        assert!(failures[0].to_string().contains('2'));
    }

    #[test]
    fn discard_and_success_signals_round_trip_through_take_signal() {
        let mut ctx = PropertyContext::new();
        assert_eq!(ctx.take_signal(), None);
        ctx.prop_discard();
        assert_eq!(ctx.take_signal(), Some(ControlSignal::Discard));
        assert_eq!(ctx.take_signal(), None);
        ctx.prop_success();
        assert_eq!(ctx.take_signal(), Some(ControlSignal::Success));
    }

    #[test]
    fn reset_per_run_clears_failures_and_signal_but_not_tags() {
        let mut ctx = PropertyContext::new();
        ctx.record_run();
        ctx.tag("k", "v");
        ctx.prop_expect(false, "oops", file!(), line!());
        ctx.prop_discard();
        ctx.reset_per_run();
        assert!(!ctx.has_failures());
        assert_eq!(ctx.take_signal(), None);
        assert_eq!(ctx.frequency("k", "v"), 1.0);
    }
}
