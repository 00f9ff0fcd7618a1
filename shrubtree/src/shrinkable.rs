//! A value paired with a lazy tree of strictly simpler alternatives.
//!
//! `Shrinkable<T>` is the unit the shrinking loop walks: its `shrinks()`
//! stream enumerates candidates that should fail the same predicate for a
//! *simpler* reason, or not fail at all. The combinators here mirror
//! `Shrinkable.hpp`'s semantics precisely, since the distinction between
//! `concat` (horizontal) and `and_then` (vertical) is what makes composite
//! shrinkers (list-like, pair, tuple) converge correctly.

use std::rc::Rc;

use crate::error::PropertyError;
use crate::stream::Stream;

type ShrinkFn<T> = Rc<dyn Fn() -> Stream<Shrinkable<T>>>;

pub struct Shrinkable<T> {
    value: Rc<T>,
    shrinks: ShrinkFn<T>,
}

impl<T> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Shrinkable { value: self.value.clone(), shrinks: self.shrinks.clone() }
    }
}

impl<T: 'static> Shrinkable<T> {
    pub fn new(value: T) -> Self {
        Shrinkable { value: Rc::new(value), shrinks: Rc::new(|| Stream::empty()) }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn shrinks(&self) -> Stream<Shrinkable<T>> {
        (self.shrinks)()
    }

    /// Replace the shrink stream outright.
    pub fn with(&self, shrinks: Stream<Shrinkable<T>>) -> Self {
        Shrinkable { value: self.value.clone(), shrinks: Rc::new(move || shrinks.clone()) }
    }

    pub fn with_fn(&self, shrinks: impl Fn() -> Stream<Shrinkable<T>> + 'static) -> Self {
        Shrinkable { value: self.value.clone(), shrinks: Rc::new(shrinks) }
    }
}

impl<T: Clone + 'static> Shrinkable<T> {
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + Clone + 'static) -> Shrinkable<U> {
        let shrinks = self.shrinks();
        let f2 = f.clone();
        Shrinkable {
            value: Rc::new(f(&self.value)),
            shrinks: Rc::new(move || {
                let f3 = f2.clone();
                shrinks.map(move |shr| shr.map(f3.clone()))
            }),
        }
    }

    /// Evaluate `f` on the current value to get the new root, then thread the
    /// *original* shrinks through `f` recursively to build the new tree.
    pub fn flat_map<U: Clone + 'static>(
        &self,
        f: impl Fn(&T) -> Shrinkable<U> + Clone + 'static,
    ) -> Shrinkable<U> {
        let root = f(&self.value);
        let shrinks = self.shrinks();
        let f2 = f.clone();
        root.with_fn(move || {
            let f3 = f2.clone();
            shrinks.map(move |shr| shr.flat_map(f3.clone()))
        })
    }

    /// The head must satisfy `criteria`. Candidates in the shrink stream that
    /// fail are skipped; when one fails, its own children are spliced in
    /// (up to `tolerance` of them) ahead of continuing the search, so a
    /// rejected branch still contributes useful smaller candidates.
    pub fn filter(
        &self,
        criteria: impl Fn(&T) -> bool + Clone + 'static,
        tolerance: usize,
    ) -> Result<Self, PropertyError> {
        if !criteria(&self.value) {
            return Err(PropertyError::invalid_argument("filter criteria rejected its own head"));
        }
        fn filter_stream<T: Clone + 'static>(
            stream: Stream<Shrinkable<T>>,
            criteria: impl Fn(&T) -> bool + Clone + 'static,
            tolerance: usize,
        ) -> Stream<Shrinkable<T>> {
            if stream.is_empty() {
                return Stream::empty();
            }
            let shr = stream.head().unwrap().clone();
            let tail = stream.tail();
            if criteria(shr.value()) {
                let c2 = criteria.clone();
                Stream::cons(shr, move || filter_stream(tail.clone(), c2.clone(), tolerance))
            } else {
                let spliced = shr.shrinks().take(tolerance).concat(tail);
                filter_stream(spliced, criteria, tolerance)
            }
        }
        let own_shrinks = self.shrinks();
        let c2 = criteria.clone();
        Ok(self.with_fn(move || {
            let c3 = c2.clone();
            filter_stream(own_shrinks.clone(), c3.clone(), tolerance).map(move |shr| {
                // every surviving candidate must itself be re-filtered recursively
                shr.filter(c3.clone(), tolerance).expect("already validated by filter_stream")
            })
        }))
    }

    /// Horizontal extension: append `then(node)` to the shrink stream of
    /// *every* node in the tree, including this root's own stream.
    pub fn concat(&self, then: impl Fn(&Shrinkable<T>) -> Stream<Shrinkable<T>> + Clone + 'static) -> Self {
        let shrinks = self.shrinks();
        let then2 = then.clone();
        let this = self.clone();
        self.with_fn(move || {
            let then3 = then2.clone();
            let with_then = shrinks.map(move |shr| shr.concat(then3.clone()));
            with_then.concat(then(&this))
        })
    }

    /// Vertical extension: append `then(leaf)` only where the shrink stream
    /// is currently empty; non-empty streams are recursed through unchanged.
    pub fn and_then(&self, then: impl Fn(&Shrinkable<T>) -> Stream<Shrinkable<T>> + Clone + 'static) -> Self {
        let shrinks = self.shrinks();
        if shrinks.is_empty() {
            let leaf_shrinks = then(self);
            self.with(leaf_shrinks)
        } else {
            let then2 = then.clone();
            self.with_fn(move || {
                let then3 = then2.clone();
                shrinks.map(move |shr| shr.and_then(then3.clone()))
            })
        }
    }

    pub fn take(&self, n: usize) -> Self {
        let shrinks = self.shrinks();
        self.with_fn(move || shrinks.map(move |shr| shr.take(n)).take(n))
    }
}
