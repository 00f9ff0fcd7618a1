//! `Generator<T>`: a deterministic function from random state to a shrink
//! tree, plus the type-erased `AnyGenerator` the runner stores its argument
//! list as.

use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::random::Random;
use crate::shrinkable::Shrinkable;

type DrawFn<T> = Rc<dyn Fn(&mut Random) -> Shrinkable<T>>;

pub struct Generator<T> {
    draw: DrawFn<T>,
}

impl<T> Clone for Generator<T> {
    fn clone(&self) -> Self {
        Generator { draw: self.draw.clone() }
    }
}

impl<T: 'static> Generator<T> {
    pub fn new(draw: impl Fn(&mut Random) -> Shrinkable<T> + 'static) -> Self {
        Generator { draw: Rc::new(draw) }
    }

    pub fn generate(&self, rng: &mut Random) -> Shrinkable<T> {
        (self.draw)(rng)
    }

    /// Replace this generator's shrink trees with the empty stream.
    pub fn no_shrink(&self) -> Self
    where
        T: Clone,
    {
        let draw = self.draw.clone();
        Generator::new(move |rng| Shrinkable::new(draw(rng).value().clone()))
    }
}

impl<T: Clone + 'static> Generator<T> {
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + Clone + 'static) -> Generator<U> {
        let draw = self.draw.clone();
        Generator::new(move |rng| draw(rng).map(f.clone()))
    }

    pub fn flat_map<U: Clone + 'static>(
        &self,
        f: impl Fn(&T) -> Generator<U> + Clone + 'static,
    ) -> Generator<U> {
        let draw = self.draw.clone();
        Generator::new(move |rng| {
            let shr = draw(rng);
            let next = f(shr.value());
            let dep_shrinkable = next.generate(rng);
            shr.flat_map(move |_v| dep_shrinkable.clone())
        })
    }

    pub fn filter(&self, p: impl Fn(&T) -> bool + Clone + 'static) -> Generator<T> {
        self.filter_with_attempts(p, 10_000)
    }

    pub fn filter_with_attempts(
        &self,
        p: impl Fn(&T) -> bool + Clone + 'static,
        max_attempts: usize,
    ) -> Generator<T> {
        let draw = self.draw.clone();
        Generator::new(move |rng| {
            for _ in 0..max_attempts {
                let shr = draw(rng);
                if p(shr.value()) {
                    return shr.filter(p.clone(), 1).expect("just checked head satisfies p");
                }
            }
            panic!("filter exhausted {max_attempts} attempts without a match");
        })
    }

    pub fn pair_with<U: Clone + 'static>(&self, other: Generator<U>) -> Generator<(T, U)> {
        let a = self.draw.clone();
        Generator::new(move |rng| {
            let shr_a = a(rng);
            let shr_b = other.generate(rng);
            zip_shrinkables(shr_a, shr_b)
        })
    }

    pub fn tuple_with<U: Clone + 'static, V: Clone + 'static>(
        &self,
        second: Generator<U>,
        third: Generator<V>,
    ) -> Generator<(T, U, V)> {
        self.pair_with(second)
            .pair_with(third)
            .map(|((a, b), c)| (a.clone(), b.clone(), c.clone()))
    }
}

/// Shrinks `a` first (holding `b`), then `b` (holding `a`), matching a
/// pair's shrink order.
fn zip_shrinkables<T: Clone + 'static, U: Clone + 'static>(
    a: Shrinkable<T>,
    b: Shrinkable<U>,
) -> Shrinkable<(T, U)> {
    let av = a.value().clone();
    let bv = b.value().clone();
    Shrinkable::new((av, bv)).with_fn(move || {
        let b2 = b.clone();
        let shrink_a_first = a.shrinks().map(move |sa| zip_shrinkables(sa.clone(), b2.clone()));
        let a2 = a.clone();
        let shrink_b_second = b.shrinks().map(move |sb| zip_shrinkables(a2.clone(), sb.clone()));
        shrink_a_first.concat(shrink_b_second)
    })
}

/// Erases the static type of a `Generator<T>` so the runner can hold a
/// heterogeneous argument list. Operations that need the concrete type go
/// through `downcast`.
pub struct AnyGenerator {
    type_id: TypeId,
    type_name: &'static str,
    draw: Rc<dyn Fn(&mut Random) -> AnyShrinkable>,
}

impl Clone for AnyGenerator {
    fn clone(&self) -> Self {
        AnyGenerator { type_id: self.type_id, type_name: self.type_name, draw: self.draw.clone() }
    }
}

impl AnyGenerator {
    pub fn from_typed<T: Clone + std::fmt::Debug + 'static>(r#gen: Generator<T>) -> Self {
        AnyGenerator {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            draw: Rc::new(move |rng| AnyShrinkable::from_typed(r#gen.generate(rng))),
        }
    }

    pub fn generate(&self, rng: &mut Random) -> AnyShrinkable {
        (self.draw)(rng)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Type-erased counterpart of `Shrinkable<T>`.
pub struct AnyShrinkable {
    type_id: TypeId,
    value: Rc<dyn Any>,
    shrinks: Rc<dyn Fn() -> Vec<AnyShrinkable>>,
    display: Rc<dyn Fn() -> String>,
}

impl Clone for AnyShrinkable {
    fn clone(&self) -> Self {
        AnyShrinkable {
            type_id: self.type_id,
            value: self.value.clone(),
            shrinks: self.shrinks.clone(),
            display: self.display.clone(),
        }
    }
}

impl AnyShrinkable {
    pub fn from_typed<T: Clone + std::fmt::Debug + 'static>(shr: Shrinkable<T>) -> Self {
        let value = shr.value().clone();
        let shr_for_shrinks = shr.clone();
        AnyShrinkable {
            type_id: TypeId::of::<T>(),
            value: Rc::new(value.clone()),
            shrinks: Rc::new(move || {
                shr_for_shrinks.shrinks().to_vec().into_iter().map(AnyShrinkable::from_typed).collect()
            }),
            display: Rc::new(move || format!("{value:?}")),
        }
    }

    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn shrinks(&self) -> Vec<AnyShrinkable> {
        (self.shrinks)()
    }

    pub fn display(&self) -> String {
        (self.display)()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_transforms_generated_value() {
        let g = Generator::new(|_rng: &mut Random| Shrinkable::new(3)).map(|x| x * 2);
        let mut rng = Random::from_seed(1);
        assert_eq!(*g.generate(&mut rng).value(), 6);
    }

    #[test]
    fn no_shrink_drops_children() {
        let g = Generator::new(|_rng: &mut Random| {
            Shrinkable::new(5).with(crate::stream::Stream::one(Shrinkable::new(0)))
        })
        .no_shrink();
        let mut rng = Random::from_seed(1);
        assert!(g.generate(&mut rng).shrinks().is_empty());
    }

    #[test]
    fn filter_only_returns_matching_values() {
        let g = Generator::new(|rng: &mut Random| Shrinkable::new(rng.i32_in(0, 100)))
            .filter(|x| x % 2 == 0);
        let mut rng = Random::from_seed(2);
        for _ in 0..20 {
            assert_eq!(*g.generate(&mut rng).value() % 2, 0);
        }
    }

    #[test]
    fn any_generator_roundtrips_through_downcast() {
        let g = AnyGenerator::from_typed(Generator::new(|_rng: &mut Random| Shrinkable::new(42i32)));
        let mut rng = Random::from_seed(1);
        let any = g.generate(&mut rng);
        assert_eq!(any.downcast::<i32>(), Some(&42));
    }
}
