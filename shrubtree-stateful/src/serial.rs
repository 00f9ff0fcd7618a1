//! Serial stateful testing: draw an initial object and a list of actions,
//! apply them in sequence, and delegate to the ordinary property runner so
//! the action list gets uniform list-like shrinking for free.

use std::fmt::Debug;
use std::rc::Rc;

use shrubtree::generator::Generator;
use shrubtree::random::Random;
use shrubtree::runner::{Property, PropertyReport};
use shrubtree::shrink::shrink_vec;
use shrubtree::{PropertyError, TestConfig};

use crate::action::Action;

fn action_list_generator<Obj: 'static, Model: 'static>(
    action_gen: Generator<Action<Obj, Model>>,
    min_len: usize,
    max_len: usize,
) -> Generator<Vec<Action<Obj, Model>>> {
    Generator::new(move |rng: &mut Random| {
        let n = rng.size(min_len, max_len + 1);
        let elements = (0..n).map(|_| action_gen.generate(rng)).collect();
        shrink_vec(elements, min_len)
    })
}

/// A stateful property: an initial-state generator, an optional model
/// factory, and an action generator, composed into a plain property over
/// `(Obj, Vec<Action<Obj, Model>>)`.
pub struct StatefulProperty<Obj, Model> {
    initial_gen: Generator<Obj>,
    model_factory: Rc<dyn Fn(&Obj) -> Model>,
    action_gen: Generator<Action<Obj, Model>>,
    min_actions: usize,
    max_actions: usize,
    config: TestConfig,
    on_startup: Option<Rc<dyn Fn()>>,
    on_cleanup: Option<Rc<dyn Fn()>>,
    post_check: Option<Rc<dyn Fn(&mut Obj, &mut Model) -> Result<bool, PropertyError>>>,
}

impl<Obj: Clone + Debug + 'static, Model: 'static> StatefulProperty<Obj, Model> {
    pub fn new(
        initial_gen: Generator<Obj>,
        model_factory: impl Fn(&Obj) -> Model + 'static,
        action_gen: Generator<Action<Obj, Model>>,
    ) -> Self {
        StatefulProperty {
            initial_gen,
            model_factory: Rc::new(model_factory),
            action_gen,
            min_actions: 0,
            max_actions: 50,
            config: TestConfig::default(),
            on_startup: None,
            on_cleanup: None,
            post_check: None,
        }
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

    pub fn on_startup(mut self, f: impl Fn() + 'static) -> Self {
        self.on_startup = Some(Rc::new(f));
        self
    }

    pub fn on_cleanup(mut self, f: impl Fn() + 'static) -> Self {
        self.on_cleanup = Some(Rc::new(f));
        self
    }

    pub fn post_check(mut self, f: impl Fn(&mut Obj, &mut Model) -> Result<bool, PropertyError> + 'static) -> Self {
        self.post_check = Some(Rc::new(f));
        self
    }

    /// Runs the composed property: every draw builds a fresh model from the
    /// drawn object, applies the action list in order, then the post-check.
    pub fn check(self) -> PropertyReport<(Obj, Vec<Action<Obj, Model>>)> {
        let actions_gen = action_list_generator(self.action_gen.clone(), self.min_actions, self.max_actions);
        let joint = self.initial_gen.pair_with(actions_gen);
        let model_factory = self.model_factory.clone();
        let on_startup = self.on_startup.clone();
        let on_cleanup = self.on_cleanup.clone();
        let post_check = self.post_check.clone();

        Property::new(joint).with_config(self.config).for_all(move |(obj0, actions), _ctx| {
            if let Some(f) = &on_startup {
                f();
            }
            let mut obj = obj0.clone();
            let mut model = model_factory(&obj);
            for action in actions {
                action.apply(&mut obj, &mut model);
            }
            let result = match &post_check {
                Some(f) => f(&mut obj, &mut model),
                None => Ok(true),
            };
            if let Some(f) = &on_cleanup {
                f();
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::action;
    use shrubtree::combinators::{element_of, just};

    fn counter_actions() -> Generator<Action<i32, i32>> {
        element_of(vec![
            action::<i32, i32>("increment", |obj, model| {
                *obj += 1;
                *model += 1;
            }),
            action::<i32, i32>("decrement", |obj, model| {
                *obj -= 1;
                *model -= 1;
            }),
        ])
        .unwrap()
    }

    #[test]
    fn model_and_object_stay_in_sync() {
        let prop = StatefulProperty::new(just(0), |_obj: &i32| 0i32, counter_actions())
            .action_range(0, 20)
            .with_config(TestConfig::default().with_seed(1).with_num_runs(100))
            .post_check(|obj, model| Ok(*obj == *model));
        let report = prop.check();
        assert!(report.passed);
    }

    #[test]
    fn violated_invariant_is_shrunk() {
        let prop = StatefulProperty::new(just(0), |_obj: &i32| 0i32, counter_actions())
            .action_range(1, 30)
            .with_config(TestConfig::default().with_seed(3).with_num_runs(100))
            .post_check(|obj, _model| Ok(*obj < 5));
        let report = prop.check();
        assert!(!report.passed);
        let (_, shrunk_actions) = report.shrunk_counterexample.unwrap();
        assert!(shrunk_actions.len() <= 5);
    }
}
