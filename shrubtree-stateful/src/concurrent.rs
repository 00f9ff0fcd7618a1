//! Concurrent stateful testing: a front action list runs serially, then a
//! fixed number of rear lists run on worker threads against the same shared
//! object, with a single append-only log recording interleaving order.
//!
//! The library does not synchronize access to the object under test; actions
//! must be safe to call from multiple threads (typically because the object
//! does its own internal locking). The log itself is the only library-owned
//! shared state, and it is written through atomics rather than a mutex.

use std::fmt::Debug;
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use shrubtree::generator::Generator;
use shrubtree::random::Random;
use shrubtree::shrink::shrink_vec;
use shrubtree::{PropertyError, TestConfig};

const FRONT_THREAD_ID: i64 = -1;
const UNINITIALIZED: i64 = -2;

/// A named closure run against a shared system-under-test. Unlike
/// [`crate::action::Action`], this takes a shared reference since the object
/// is accessed from multiple threads at once.
pub struct ConcurrentAction<Obj> {
    name: String,
    run: Arc<dyn Fn(&Obj) + Send + Sync>,
}

impl<Obj> ConcurrentAction<Obj> {
    pub fn new(name: impl Into<String>, run: impl Fn(&Obj) + Send + Sync + 'static) -> Self {
        ConcurrentAction { name: name.into(), run: Arc::new(run) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, obj: &Obj) {
        (self.run)(obj)
    }
}

impl<Obj> Clone for ConcurrentAction<Obj> {
    fn clone(&self) -> Self {
        ConcurrentAction { name: self.name.clone(), run: self.run.clone() }
    }
}

impl<Obj> Debug for ConcurrentAction<Obj> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub fn concurrent_action<Obj>(
    name: impl Into<String>,
    run: impl Fn(&Obj) + Send + Sync + 'static,
) -> ConcurrentAction<Obj> {
    ConcurrentAction::new(name, run)
}

fn action_list_generator<Obj: 'static>(
    action_gen: Generator<ConcurrentAction<Obj>>,
    min_len: usize,
    max_len: usize,
) -> Generator<Vec<ConcurrentAction<Obj>>> {
    Generator::new(move |rng: &mut Random| {
        let n = rng.size(min_len, max_len + 1);
        let elements = (0..n).map(|_| action_gen.generate(rng)).collect();
        shrink_vec(elements, min_len)
    })
}

/// Append-only interleaving log: each worker claims a slot with an atomic
/// fetch-add before writing into it, so slots never collide even though no
/// lock guards the vector itself.
struct ConcurrentLog {
    counter: AtomicUsize,
    slots: Vec<AtomicI64>,
}

impl ConcurrentLog {
    fn new(capacity: usize) -> Self {
        ConcurrentLog {
            counter: AtomicUsize::new(0),
            slots: (0..capacity).map(|_| AtomicI64::new(UNINITIALIZED)).collect(),
        }
    }

    fn append_front(&self) {
        let idx = self.counter.fetch_add(1, Ordering::SeqCst);
        self.slots[idx].store(FRONT_THREAD_ID, Ordering::SeqCst);
    }

    fn mark(&self, thread_id: usize) {
        let idx = self.counter.fetch_add(1, Ordering::SeqCst);
        self.slots[idx].store(thread_id as i64, Ordering::SeqCst);
    }

    /// Reconstructs a linear transcript: front entries advance the front
    /// iterator, other entries alternate between marking a thread's action
    /// started and marking it finished.
    fn transcript(&self, front_names: &[String], rear_names: &[Vec<String>]) -> String {
        let mut out = String::new();
        let mut front_idx = 0;
        let mut rear_idx = vec![0usize; rear_names.len()];
        let mut started = vec![false; rear_names.len()];
        for slot in &self.slots {
            let id = slot.load(Ordering::SeqCst);
            if id == FRONT_THREAD_ID {
                out.push_str(&front_names[front_idx]);
                out.push_str(" -> ");
                front_idx += 1;
            } else if id >= 0 {
                let t = id as usize;
                let name = &rear_names[t][rear_idx[t]];
                if started[t] {
                    out.push_str(&format!("thr{t} {name} end -> "));
                    rear_idx[t] += 1;
                } else {
                    out.push_str(&format!("thr{t} {name} start -> "));
                }
                started[t] = !started[t];
            }
        }
        out.push_str("onCleanup");
        out
    }
}

/// Result of one concurrent run.
pub struct ConcurrentReport {
    pub passed: bool,
    pub seed: u64,
    pub transcript: Option<String>,
    pub error: Option<PropertyError>,
}

/// Drives action sequences concurrently against a shared system-under-test.
pub struct Concurrency<Obj, Model> {
    initial_gen: Generator<Obj>,
    model_factory: Option<Rc<dyn Fn(&Obj) -> Model>>,
    action_gen: Generator<ConcurrentAction<Obj>>,
    num_threads: usize,
    min_actions: usize,
    max_actions: usize,
    config: TestConfig,
    post_check: Option<Rc<dyn Fn(&Obj, &mut Model) -> Result<bool, PropertyError>>>,
}

impl<Obj: Sync + 'static, Model: 'static> Concurrency<Obj, Model> {
    pub fn new(initial_gen: Generator<Obj>, action_gen: Generator<ConcurrentAction<Obj>>) -> Self {
        Concurrency {
            initial_gen,
            model_factory: None,
            action_gen,
            num_threads: 2,
            min_actions: 0,
            max_actions: 10,
            config: TestConfig::default(),
            post_check: None,
        }
    }

    pub fn with_model(mut self, model_factory: impl Fn(&Obj) -> Model + 'static) -> Self {
        self.model_factory = Some(Rc::new(model_factory));
        self
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = n.max(1);
        self
    }

    pub fn action_range(mut self, min_actions: usize, max_actions: usize) -> Self {
        self.min_actions = min_actions;
        self.max_actions = max_actions;
        self
    }

    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn post_check(mut self, f: impl Fn(&Obj, &mut Model) -> Result<bool, PropertyError> + 'static) -> Self {
        self.post_check = Some(Rc::new(f));
        self
    }

    /// Runs `config.num_runs` rounds; each round draws a fresh object and
    /// action lists, executes them, and stops at the first failing round.
    /// Shrinking is deliberately not attempted for concurrent failures: the
    /// reproducing seed and transcript are the debugging aid instead.
    pub fn check(&self) -> ConcurrentReport
    where
        Obj: Clone,
    {
        let seed = self.config.seed.unwrap_or_else(shrubtree::global_seed);
        let mut rng = Random::from_seed(seed);
        let action_list_gen = action_list_generator(self.action_gen.clone(), self.min_actions, self.max_actions);

        for _ in 0..self.config.num_runs {
            let obj = self.initial_gen.generate(&mut rng).value().clone();
            let front = action_list_gen.generate(&mut rng).value().clone();
            let rears: Vec<Vec<ConcurrentAction<Obj>>> = (0..self.num_threads)
                .map(|_| action_list_gen.generate(&mut rng).value().clone())
                .collect();

            let front_names: Vec<String> = front.iter().map(|a| a.name().to_string()).collect();
            let rear_names: Vec<Vec<String>> =
                rears.iter().map(|r| r.iter().map(|a| a.name().to_string()).collect()).collect();

            let total_rear: usize = rears.iter().map(|r| r.len()).sum();
            let log = ConcurrentLog::new(front.len() + 2 * total_rear);

            for a in &front {
                a.apply(&obj);
                log.append_front();
            }

            // Scoped threads borrow `obj` and `log` directly rather than
            // through `Arc`: the scope guarantees every worker has finished
            // before it returns, so the borrows below outlive them safely.
            let barrier = Barrier::new(self.num_threads + 1);
            let scope_result = crossbeam::thread::scope(|scope| {
                for (thread_id, rear) in rears.iter().enumerate() {
                    let obj = &obj;
                    let log = &log;
                    let barrier = &barrier;
                    scope.spawn(move |_| {
                        barrier.wait();
                        for a in rear {
                            log.mark(thread_id);
                            a.apply(obj);
                            log.mark(thread_id);
                        }
                    });
                }
                barrier.wait();
            });
            if scope_result.is_err() {
                panic!("a worker thread panicked during a concurrent run");
            }

            let transcript = log.transcript(&front_names, &rear_names);

            if let Some(check) = &self.post_check {
                let mut model = self
                    .model_factory
                    .as_ref()
                    .map(|f| f(&obj))
                    .expect("post_check requires with_model");
                match check(&obj, &mut model) {
                    Ok(true) => {}
                    Ok(false) => {
                        return ConcurrentReport {
                            passed: false,
                            seed,
                            transcript: Some(transcript),
                            error: Some(PropertyError::expectation_failed("post_check failed", "<concurrent>", 0)),
                        };
                    }
                    Err(err) => {
                        return ConcurrentReport { passed: false, seed, transcript: Some(transcript), error: Some(err) };
                    }
                }
            }
        }

        ConcurrentReport { passed: true, seed, transcript: None, error: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrubtree::combinators::{element_of, just};
    use std::sync::atomic::AtomicI64 as Counter;

    #[test]
    fn concurrent_increments_are_all_observed() {
        let counted = Arc::new(Counter::new(0));
        let counted_for_action = counted.clone();
        let action_gen = element_of(vec![concurrent_action::<i32>("incr", move |_obj| {
            counted_for_action.fetch_add(1, Ordering::SeqCst);
        })])
        .unwrap();

        let concurrency: Concurrency<i32, ()> = Concurrency::new(just(0), action_gen)
            .num_threads(3)
            .action_range(2, 2)
            .with_config(TestConfig::default().with_seed(5).with_num_runs(1));
        let report = concurrency.check();
        assert!(report.passed);
        assert_eq!(counted.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn post_check_failure_reports_a_transcript() {
        let action_gen = element_of(vec![concurrent_action::<i32>("noop", |_obj| {})]).unwrap();
        let concurrency: Concurrency<i32, i32> = Concurrency::new(just(0), action_gen)
            .with_model(|_obj| 0)
            .num_threads(2)
            .action_range(1, 1)
            .with_config(TestConfig::default().with_seed(11).with_num_runs(1))
            .post_check(|_obj, _model| Ok(false));
        let report = concurrency.check();
        assert!(!report.passed);
        assert!(report.transcript.is_some());
    }
}
