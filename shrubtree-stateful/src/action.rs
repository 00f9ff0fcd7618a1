//! Named units of work over a system-under-test, optionally paired with
//! updates to an abstract model.

use std::fmt;
use std::rc::Rc;

/// A named closure applied to the system-under-test alone. Used by callers
/// that don't need an abstract model; [`Action::from_simple`] lifts one into
/// the full `Action` type by ignoring the model parameter.
pub struct SimpleAction<Obj> {
    name: String,
    run: Rc<dyn Fn(&mut Obj)>,
}

impl<Obj> SimpleAction<Obj> {
    pub fn new(name: impl Into<String>, run: impl Fn(&mut Obj) + 'static) -> Self {
        SimpleAction { name: name.into(), run: Rc::new(run) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, obj: &mut Obj) {
        (self.run)(obj)
    }
}

impl<Obj> Clone for SimpleAction<Obj> {
    fn clone(&self) -> Self {
        SimpleAction { name: self.name.clone(), run: self.run.clone() }
    }
}

impl<Obj> fmt::Debug for SimpleAction<Obj> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named closure applied to both the system-under-test and an abstract
/// model tracking the expected state.
pub struct Action<Obj, Model> {
    name: String,
    run: Rc<dyn Fn(&mut Obj, &mut Model)>,
}

impl<Obj, Model> Action<Obj, Model> {
    pub fn new(name: impl Into<String>, run: impl Fn(&mut Obj, &mut Model) + 'static) -> Self {
        Action { name: name.into(), run: Rc::new(run) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, obj: &mut Obj, model: &mut Model) {
        (self.run)(obj, model)
    }
}

impl<Obj: 'static, Model: 'static> Action<Obj, Model> {
    /// Lifts a model-free action into the full type, ignoring the model.
    pub fn from_simple(simple: SimpleAction<Obj>) -> Self {
        Action { name: simple.name().to_string(), run: Rc::new(move |obj, _model| simple.apply(obj)) }
    }
}

impl<Obj, Model> Clone for Action<Obj, Model> {
    fn clone(&self) -> Self {
        Action { name: self.name.clone(), run: self.run.clone() }
    }
}

impl<Obj, Model> fmt::Debug for Action<Obj, Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Convenience constructor matching [`SimpleAction::new`].
pub fn simple_action<Obj>(name: impl Into<String>, run: impl Fn(&mut Obj) + 'static) -> SimpleAction<Obj> {
    SimpleAction::new(name, run)
}

/// Convenience constructor matching [`Action::new`].
pub fn action<Obj, Model>(name: impl Into<String>, run: impl Fn(&mut Obj, &mut Model) + 'static) -> Action<Obj, Model> {
    Action::new(name, run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_action_mutates_object() {
        let incr = simple_action::<i32>("increment", |n| *n += 1);
        let mut obj = 0;
        incr.apply(&mut obj);
        assert_eq!(obj, 1);
        assert_eq!(incr.name(), "increment");
    }

    #[test]
    fn action_mutates_object_and_model() {
        let push = action::<Vec<i32>, usize>("push", |obj, model| {
            obj.push(1);
            *model += 1;
        });
        let mut obj = vec![];
        let mut model = 0;
        push.apply(&mut obj, &mut model);
        assert_eq!(obj, vec![1]);
        assert_eq!(model, 1);
    }

    #[test]
    fn from_simple_ignores_model() {
        let simple = simple_action::<i32>("double", |n| *n *= 2);
        let lifted: Action<i32, ()> = Action::from_simple(simple);
        let mut obj = 5;
        let mut model = ();
        lifted.apply(&mut obj, &mut model);
        assert_eq!(obj, 10);
    }
}
