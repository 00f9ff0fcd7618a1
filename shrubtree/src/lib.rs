//! # shrubtree - property-based testing for Rust
//!
//! `shrubtree` generates random test data from composable generators, runs a
//! property closure against it, and when a run fails, walks a lazy shrink
//! tree to find a small counterexample.
//!
//! ## Quick start
//!
//! ```rust
//! use shrubtree::combinators::in_range;
//! use shrubtree::runner::Property;
//!
//! let prop = Property::new(in_range(0, 100)).seed(42).num_runs(200);
//! let report = prop.for_all(|v, _ctx| Ok(*v >= 0 && *v <= 100));
//! assert!(report.passed);
//! ```

pub mod arbitrary;
pub mod combinators;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod random;
pub mod runner;
pub mod shrink;
pub mod shrink_loop;
pub mod shrinkable;
pub mod stream;

pub use arbitrary::{arbitrary, Arbitrary};
pub use combinators::{
    accumulate, aggregate, element_of, in_range, intervals, just, lazy, natural, non_negative,
    one_of, reference, unweighted, weighted, Weighted,
};
pub use config::{global_seed, ConfigError, FilterConfig, ShrinkConfig, TestConfig};
pub use context::{PropertyContext, StatAssertion};
pub use error::{ControlSignal, PropertyError, RunOutcome};
pub use generator::{AnyGenerator, AnyShrinkable, Generator};
pub use random::Random;
pub use runner::{DynProperty, DynPropertyReport, Property, PropertyReport};
pub use shrinkable::Shrinkable;
pub use stream::Stream;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_runs_a_passing_property() {
        let prop = Property::new(in_range(1, 10)).seed(1).num_runs(50);
        let report = prop.for_all(|v, _ctx| Ok(*v >= 1 && *v <= 10));
        assert!(report.passed);
    }

    #[test]
    fn public_api_surfaces_a_shrunk_failure() {
        let prop = Property::new(in_range(0, 200)).seed(9).num_runs(100);
        let report = prop.for_all(|v, _ctx| Ok(*v < 100));
        assert!(!report.passed);
        assert_eq!(report.shrunk_counterexample, Some(100));
    }
}
