//! A single-linked, lazily-evaluated sequence.
//!
//! Every node holds its head eagerly and its tail as a thunk; forcing a tail
//! is not required to be memoized; re-evaluation must be a pure function of
//! what the thunk captured. [`Shrinkable`](crate::shrinkable::Shrinkable)
//! builds its shrink trees out of `Stream<Shrinkable<T>>`.

use std::rc::Rc;

type TailFn<T> = Rc<dyn Fn() -> Stream<T>>;

enum Node<T> {
    Cons(T, TailFn<T>),
}

/// A possibly-infinite lazy sequence of `T`. Cloning a `Stream` is O(1): it
/// shares the underlying node via reference counting.
pub struct Stream<T>(Option<Rc<Node<T>>>);

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Stream(self.0.clone())
    }
}

impl<T: 'static> Stream<T> {
    pub fn empty() -> Self {
        Stream(None)
    }

    pub fn cons(head: T, tail: impl Fn() -> Stream<T> + 'static) -> Self {
        Stream(Some(Rc::new(Node::Cons(head, Rc::new(tail)))))
    }

    pub fn one(value: T) -> Self {
        Stream::cons(value, Stream::empty)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn head(&self) -> Option<&T> {
        match &self.0 {
            Some(node) => {
                let Node::Cons(h, _) = node.as_ref();
                Some(h)
            }
            None => None,
        }
    }

    /// Forces and returns the tail; cheap (one thunk call) but not cached.
    pub fn tail(&self) -> Stream<T> {
        match &self.0 {
            Some(node) => {
                let Node::Cons(_, t) = node.as_ref();
                t()
            }
            None => Stream::empty(),
        }
    }

    pub fn iter(&self) -> StreamIter<T> {
        StreamIter { current: self.clone() }
    }
}

impl<T: Clone + 'static> Stream<T> {
    pub fn two(a: T, b: T) -> Self {
        Stream::cons(a, move || Stream::one(b.clone()))
    }

    /// Builds a stream from a fixed list of values without re-copying the
    /// backing vector at every lazy step.
    pub fn values(values: Vec<T>) -> Self {
        fn walk<T: Clone + 'static>(values: Rc<Vec<T>>, index: usize) -> Stream<T> {
            if index >= values.len() {
                Stream::empty()
            } else {
                let v = values[index].clone();
                let rest = values.clone();
                Stream::cons(v, move || walk(rest.clone(), index + 1))
            }
        }
        walk(Rc::new(values), 0)
    }

    pub fn of(values: impl IntoIterator<Item = T>) -> Self {
        Stream::values(values.into_iter().collect())
    }

    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + Clone + 'static) -> Stream<U> {
        match &self.0 {
            None => Stream::empty(),
            Some(node) => {
                let Node::Cons(h, t) = node.as_ref();
                let head = f(h);
                let t = t.clone();
                let f2 = f.clone();
                Stream::cons(head, move || t().map(f2.clone()))
            }
        }
    }

    /// Lazily skips elements until the first one satisfying `p`; once found,
    /// the remaining search continues lazily on demand.
    pub fn filter(&self, p: impl Fn(&T) -> bool + Clone + 'static) -> Stream<T> {
        let mut current = self.clone();
        loop {
            match &current.0 {
                None => return Stream::empty(),
                Some(node) => {
                    let Node::Cons(h, t) = node.as_ref();
                    if p(h) {
                        let head = h.clone();
                        let t = t.clone();
                        let p2 = p.clone();
                        return Stream::cons(head, move || t().filter(p2.clone()));
                    }
                    current = t();
                }
            }
        }
    }

    pub fn concat(&self, other: Stream<T>) -> Stream<T> {
        match &self.0 {
            None => other,
            Some(node) => {
                let Node::Cons(h, t) = node.as_ref();
                let head = h.clone();
                let t = t.clone();
                Stream::cons(head, move || t().concat(other.clone()))
            }
        }
    }

    pub fn concat_with(&self, f: impl Fn() -> Stream<T> + Clone + 'static) -> Stream<T> {
        match &self.0 {
            None => f(),
            Some(node) => {
                let Node::Cons(h, t) = node.as_ref();
                let head = h.clone();
                let t = t.clone();
                let f2 = f.clone();
                Stream::cons(head, move || t().concat_with(f2.clone()))
            }
        }
    }

    pub fn take(&self, n: usize) -> Stream<T> {
        if n == 0 {
            return Stream::empty();
        }
        match &self.0 {
            None => Stream::empty(),
            Some(node) => {
                let Node::Cons(h, t) = node.as_ref();
                let head = h.clone();
                let t = t.clone();
                Stream::cons(head, move || t().take(n - 1))
            }
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

pub struct StreamIter<T> {
    current: Stream<T>,
}

impl<T: Clone + 'static> Iterator for StreamIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let head = self.current.head().cloned();
        if head.is_some() {
            self.current = self.current.tail();
        }
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn empty_stream_has_no_head() {
        let s: Stream<i32> = Stream::empty();
        assert!(s.is_empty());
        assert_eq!(s.head(), None);
    }

    #[test]
    fn values_preserves_order() {
        let s = Stream::values(vec![1, 2, 3]);
        assert_eq!(s.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn map_is_lazy_and_transforms_each_element() {
        let calls = Rc::new(RefCell::new(0));
        let calls2 = calls.clone();
        let s = Stream::values(vec![1, 2, 3]).map(move |x| {
            *calls2.borrow_mut() += 1;
            x * 10
        });
        // nothing forced yet beyond the head
        assert!(*calls.borrow() >= 1);
        assert_eq!(s.to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn filter_skips_to_first_match() {
        let s = Stream::values(vec![1, 2, 3, 4, 5]).filter(|x| x % 2 == 0);
        assert_eq!(s.to_vec(), vec![2, 4]);
    }

    #[test]
    fn concat_appends_when_first_is_exhausted() {
        let a = Stream::values(vec![1, 2]);
        let b = Stream::values(vec![3, 4]);
        assert_eq!(a.concat(b).to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn concat_on_empty_returns_other() {
        let a: Stream<i32> = Stream::empty();
        let b = Stream::values(vec![9]);
        assert_eq!(a.concat(b).to_vec(), vec![9]);
    }

    #[test]
    fn take_caps_length() {
        let s = Stream::values(vec![1, 2, 3, 4]).take(2);
        assert_eq!(s.to_vec(), vec![1, 2]);
    }

    #[test]
    fn take_zero_is_empty() {
        let s = Stream::values(vec![1, 2, 3]).take(0);
        assert!(s.is_empty());
    }
}
