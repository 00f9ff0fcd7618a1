//! List-like shrinking: membership-wise (drop interior ranges) composed
//! vertically with element-wise (shrink elements in place) shrinking.
//!
//! The membership tree is built first; element-wise shrinking is attached
//! via `and_then` so it only kicks in once membership shrinking bottoms out
//! at a leaf, matching the two-phase strategy the container shrinkers in the
//! reference implementation use.

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

/// Candidate subsets reachable by dropping one contiguous interior range,
/// trying progressively smaller ranges (binary-search-like in the removal
/// width) and sliding the removed window across the list.
fn subsets<T: Clone + 'static>(elements: &[Shrinkable<T>], min_size: usize) -> Vec<Vec<Shrinkable<T>>> {
    let len = elements.len();
    if len <= min_size {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut remove_size = len - min_size;
    loop {
        let mut start = 0;
        while start + remove_size <= len {
            let mut v = elements.to_vec();
            v.drain(start..start + remove_size);
            out.push(v);
            start += remove_size;
        }
        if remove_size <= 1 {
            break;
        }
        remove_size /= 2;
    }
    out
}

fn membership_tree<T: Clone + 'static>(
    elements: Vec<Shrinkable<T>>,
    min_size: usize,
) -> Shrinkable<Vec<Shrinkable<T>>> {
    let subs = subsets(&elements, min_size);
    Shrinkable::new(elements).with_fn(move || {
        let subs = subs.clone();
        Stream::values(subs).map(move |v: &Vec<Shrinkable<T>>| membership_tree(v.clone(), min_size))
    })
}

/// Recursively shrinks one element at a time, trying every element's next
/// shrink candidate before descending further.
fn elementwise_tree<T: Clone + 'static>(elements: Vec<Shrinkable<T>>) -> Shrinkable<Vec<Shrinkable<T>>> {
    Shrinkable::new(elements.clone()).with_fn(move || {
        let mut candidates = Vec::new();
        for i in 0..elements.len() {
            for shrunk in elements[i].shrinks().to_vec() {
                let mut v = elements.clone();
                v[i] = shrunk;
                candidates.push(v);
            }
        }
        Stream::values(candidates).map(|v: &Vec<Shrinkable<T>>| elementwise_tree(v.clone()))
    })
}

fn to_value_vec<T: Clone + 'static>(elements: &Vec<Shrinkable<T>>) -> Shrinkable<Vec<T>> {
    Shrinkable::new(elements.iter().map(|s| s.value().clone()).collect())
}

/// Shrinks a sequence of already-shrinkable elements down to `min_size`,
/// combining membership-wise and element-wise strategies.
pub fn shrink_vec<T: Clone + 'static>(elements: Vec<Shrinkable<T>>, min_size: usize) -> Shrinkable<Vec<T>> {
    let tree = membership_tree(elements, min_size);
    let with_elementwise =
        tree.and_then(|leaf| elementwise_tree(leaf.value().clone()).shrinks());
    with_elementwise.flat_map(to_value_vec)
}
