//! Higher-level generator combinators built on top of [`Generator`].

use crate::error::PropertyError;
use crate::generator::Generator;
use crate::random::Random;
use crate::shrinkable::Shrinkable;

/// A constant generator with no shrinks.
pub fn just<T: Clone + 'static>(value: T) -> Generator<T> {
    Generator::new(move |_rng| Shrinkable::new(value.clone()))
}

/// Defers constructing the value until draw time.
pub fn lazy<T: Clone + 'static>(f: impl Fn() -> T + Clone + 'static) -> Generator<T> {
    Generator::new(move |_rng| Shrinkable::new(f()))
}

/// One generator paired with an explicit selection weight in `[0, 1]`.
pub struct Weighted<T> {
    pub generator: Generator<T>,
    pub weight: Option<f64>,
}

pub fn weighted<T: Clone + 'static>(weight: f64, generator: Generator<T>) -> Weighted<T> {
    Weighted { generator, weight: Some(weight) }
}

pub fn unweighted<T: Clone + 'static>(generator: Generator<T>) -> Weighted<T> {
    Weighted { generator, weight: None }
}

/// Picks among several generators. Entries with an explicit weight are
/// selected with that probability; the remaining probability mass is split
/// evenly among the unweighted entries. If the picked generator discards
/// (panics are not used for discard — see [`crate::error::RunOutcome`]), the
/// runner retries the same generator; here we simply document that `one_of`
/// always produces a value since `Generator` itself has no discard signal.
pub fn one_of<T: Clone + 'static>(entries: Vec<Weighted<T>>) -> Result<Generator<T>, PropertyError> {
    if entries.is_empty() {
        return Err(PropertyError::invalid_argument("one_of requires at least one generator"));
    }
    let explicit_total: f64 = entries.iter().filter_map(|e| e.weight).sum();
    if explicit_total > 1.0 + 1e-9 {
        return Err(PropertyError::invalid_argument("one_of weights must not sum past 1.0"));
    }
    let unweighted_count = entries.iter().filter(|e| e.weight.is_none()).count();
    let leftover = (1.0 - explicit_total).max(0.0);
    let share = if unweighted_count > 0 { leftover / unweighted_count as f64 } else { 0.0 };
    let weights: Vec<f64> = entries.iter().map(|e| e.weight.unwrap_or(share)).collect();
    let generators: Vec<Generator<T>> = entries.into_iter().map(|e| e.generator).collect();
    Ok(Generator::new(move |rng: &mut Random| {
        let roll = rng.f64_in(0.0, weights.iter().sum());
        let mut acc = 0.0;
        for (w, g) in weights.iter().zip(generators.iter()) {
            acc += w;
            if roll <= acc {
                return g.generate(rng);
            }
        }
        generators.last().unwrap().generate(rng)
    }))
}

/// Picks uniformly among fixed values; shrinks toward earlier entries.
pub fn element_of<T: Clone + 'static>(values: Vec<T>) -> Result<Generator<T>, PropertyError> {
    if values.is_empty() {
        return Err(PropertyError::invalid_argument("element_of requires at least one value"));
    }
    one_of(values.into_iter().map(|v| unweighted(just(v))).collect())
}

/// Union of integer ranges, each range chosen with probability proportional
/// to its size.
pub fn intervals(ranges: Vec<(i64, i64)>) -> Result<Generator<i64>, PropertyError> {
    if ranges.is_empty() {
        return Err(PropertyError::invalid_argument("intervals requires at least one range"));
    }
    for (lo, hi) in &ranges {
        if lo > hi {
            return Err(PropertyError::invalid_argument("interval lo must be <= hi"));
        }
    }
    let sizes: Vec<f64> = ranges.iter().map(|(lo, hi)| (hi - lo + 1) as f64).collect();
    let total: f64 = sizes.iter().sum();
    Ok(Generator::new(move |rng: &mut Random| {
        let roll = rng.f64_in(0.0, total);
        let mut acc = 0.0;
        for ((lo, hi), size) in ranges.iter().zip(sizes.iter()) {
            acc += size;
            if roll <= acc {
                return crate::shrink::shrink_i64(rng.i64_in(*lo, *hi));
            }
        }
        let (lo, hi) = ranges.last().unwrap();
        crate::shrink::shrink_i64(rng.i64_in(*lo, *hi))
    }))
}

pub fn in_range(lo: i64, hi: i64) -> Generator<i64> {
    Generator::new(move |rng: &mut Random| crate::shrink::shrink_i64(rng.i64_in(lo, hi)))
}

pub fn natural(max: i64) -> Generator<i64> {
    in_range(1, max)
}

pub fn non_negative(max: i64) -> Generator<i64> {
    in_range(0, max)
}

/// `accumulate`: draws a size `n` in `[lo, hi]`, then chains `step` starting
/// from a first value, keeping only the last element's shrink tree (earlier
/// elements are frozen dependencies).
pub fn accumulate<T: Clone + 'static>(
    first: Generator<T>,
    step: impl Fn(&T) -> Generator<T> + Clone + 'static,
    lo: usize,
    hi: usize,
) -> Generator<Vec<T>> {
    Generator::new(move |rng: &mut Random| {
        let n = rng.size(lo, hi + 1);
        if n == 0 {
            return Shrinkable::new(Vec::new());
        }
        let mut values = Vec::with_capacity(n);
        let mut last = first.generate(rng);
        values.push(last.value().clone());
        for _ in 1..n {
            let next_gen = step(last.value());
            last = next_gen.generate(rng);
            values.push(last.value().clone());
        }
        let prefix = values[..values.len() - 1].to_vec();
        last.map(move |tail_value| {
            let mut v = prefix.clone();
            v.push(tail_value.clone());
            v
        })
    })
}

/// `aggregate`: like `accumulate` but exposes list-like shrinking (both
/// membership-wise and element-wise) over the whole produced vector, since
/// the aggregator builds a fresh vector on each step rather than threading a
/// single shrinkable tail.
pub fn aggregate<T: Clone + 'static>(
    first: Generator<T>,
    step: impl Fn(&T) -> Generator<T> + Clone + 'static,
    lo: usize,
    hi: usize,
) -> Generator<Vec<T>> {
    Generator::new(move |rng: &mut Random| {
        let n = rng.size(lo, hi + 1);
        let mut elements = Vec::with_capacity(n);
        let mut last = first.generate(rng);
        if n > 0 {
            elements.push(last.clone());
        }
        for _ in 1..n {
            let next_gen = step(last.value());
            last = next_gen.generate(rng);
            elements.push(last.clone());
        }
        crate::shrink::shrink_vec(elements, lo)
    })
}

/// Forwarding wrapper enabling self-referential (recursive) generators: build
/// the generator lazily from a thunk so it can refer to itself.
pub fn reference<T: Clone + 'static>(build: impl Fn() -> Generator<T> + 'static) -> Generator<T> {
    Generator::new(move |rng| build().generate(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_always_returns_same_value_with_no_shrinks() {
        let g = just(42);
        let mut rng = Random::from_seed(1);
        let shr = g.generate(&mut rng);
        assert_eq!(*shr.value(), 42);
        assert!(shr.shrinks().is_empty());
    }

    #[test]
    fn element_of_only_returns_given_values() {
        let g = element_of(vec![1, 3, 5, 7]).unwrap();
        let mut rng = Random::from_seed(3);
        for _ in 0..100 {
            let v = *g.generate(&mut rng).value();
            assert!([1, 3, 5, 7].contains(&v));
        }
    }

    #[test]
    fn one_of_rejects_overweight_input() {
        let entries = vec![weighted(0.7, just(1)), weighted(0.5, just(2))];
        assert!(one_of(entries).is_err());
    }

    #[test]
    fn intervals_draws_within_union() {
        let g = intervals(vec![(0, 5), (100, 105)]).unwrap();
        let mut rng = Random::from_seed(4);
        for _ in 0..100 {
            let v = *g.generate(&mut rng).value();
            assert!((0..=5).contains(&v) || (100..=105).contains(&v));
        }
    }

    #[test]
    fn accumulate_respects_size_bounds() {
        let g = accumulate(just(1), |v| just(v + 1), 2, 4);
        let mut rng = Random::from_seed(5);
        for _ in 0..20 {
            let v = g.generate(&mut rng);
            assert!(v.value().len() >= 2 && v.value().len() <= 4);
        }
    }

    #[test]
    fn aggregate_shrinks_toward_shorter_vectors() {
        let g = aggregate(just(1), |v| just(v + 1), 1, 5);
        let mut rng = Random::from_seed(6);
        let shr = loop {
            let shr = g.generate(&mut rng);
            if shr.value().len() > 2 {
                break shr;
            }
        };
        assert!(shr.shrinks().to_vec().iter().any(|c| c.value().len() < shr.value().len()));
    }
}
