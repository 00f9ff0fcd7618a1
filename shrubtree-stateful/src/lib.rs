//! # shrubtree-stateful
//!
//! Stateful and concurrent property testing on top of `shrubtree`: generate
//! sequences of user-declared actions against a system-under-test, optionally
//! tracked by an abstract model, and run them either serially (with uniform
//! shrinking of the action list) or concurrently across worker threads (with
//! an interleaving transcript on failure instead of shrinking).
//!
//! ```rust
//! use shrubtree::combinators::element_of;
//! use shrubtree_stateful::action::action;
//! use shrubtree_stateful::serial::StatefulProperty;
//!
//! let actions = element_of(vec![
//!     action::<i32, i32>("incr", |obj, model| { *obj += 1; *model += 1; }),
//!     action::<i32, i32>("decr", |obj, model| { *obj -= 1; *model -= 1; }),
//! ])
//! .unwrap();
//!
//! let prop = StatefulProperty::new(shrubtree::combinators::just(0), |_obj: &i32| 0i32, actions)
//!     .post_check(|obj, model| Ok(*obj == *model));
//! let report = prop.check();
//! assert!(report.passed);
//! ```

pub mod action;
pub mod concurrent;
pub mod serial;

pub use action::{action, simple_action, Action, SimpleAction};
pub use concurrent::{concurrent_action, Concurrency, ConcurrentAction, ConcurrentReport};
pub use serial::StatefulProperty;
