//! Float shrinking: decompose into fraction * 2^exp, shrink the exponent with
//! the integer shrinker, then on every resulting leaf try collapsing the
//! fraction to ±0.5 and truncating to an integer, in that order. Mirrors
//! `floatShrinksImpl` in the original implementation exactly, down to the
//! `frexp`/`ldexp` decomposition (reimplemented by hand since the standard
//! library doesn't expose them).

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

use super::integral::shrink_i64;

/// `value = fraction * 2^exp` with `fraction` in `[0.5, 1.0)` (or its
/// negation). Subnormals are renormalized by scaling up before decomposing,
/// then correcting the exponent back down, same as glibc's `frexp` does.
fn frexp(value: f64) -> (f64, i32) {
    if value == 0.0 {
        return (0.0, 0);
    }
    let bits = value.to_bits();
    let sign = bits & (1u64 << 63);
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    if exp_bits == 0 {
        let (fraction, exp) = frexp(value * 2f64.powi(54));
        return (fraction, exp - 54);
    }
    if exp_bits == 0x7ff {
        return (value, 0);
    }
    let mantissa = bits & 0x000f_ffff_ffff_ffff;
    let fraction = f64::from_bits(sign | (1022u64 << 52) | mantissa);
    (fraction, exp_bits - 1022)
}

fn ldexp(fraction: f64, exp: i32) -> f64 {
    fraction * 2f64.powi(exp)
}

/// Replaces a value with its fraction collapsed to exactly ±0.5 of its own
/// exponent, i.e. the smallest fraction representable at that scale.
fn fraction_collapse(value: f64) -> Stream<Shrinkable<f64>> {
    if value == 0.0 {
        return Stream::empty();
    }
    let (_, exp) = frexp(value);
    let magnitude = ldexp(0.5, exp);
    let collapsed = if value > 0.0 { magnitude } else { -magnitude };
    Stream::one(Shrinkable::new(collapsed))
}

/// Truncates toward zero; only a real shrink when that's both nonzero and
/// strictly smaller in magnitude than the value it came from.
fn integerize(value: f64) -> Stream<Shrinkable<f64>> {
    let truncated = value as i32;
    let truncated_f = truncated as f64;
    if truncated != 0 && truncated_f.abs() < value.abs() {
        Stream::one(Shrinkable::new(truncated_f))
    } else {
        Stream::empty()
    }
}

fn shrink_from(value: f64) -> Stream<Shrinkable<f64>> {
    if value == 0.0 {
        return Stream::empty();
    }
    let (fraction, exp) = frexp(value);
    let exp_shrinkable = shrink_i64(exp as i64);
    let float_shrinkable = exp_shrinkable.map(move |e| ldexp(fraction, *e as i32));
    let mapped_shrinks = float_shrinkable.shrinks();
    let prefixed = float_shrinkable.with(Stream::one(Shrinkable::new(0.0)).concat(mapped_shrinks));
    let with_fraction_collapse =
        prefixed.and_then(|leaf: &Shrinkable<f64>| fraction_collapse(*leaf.value()));
    let with_integerize =
        with_fraction_collapse.and_then(|leaf: &Shrinkable<f64>| integerize(*leaf.value()));
    with_integerize.shrinks()
}

pub fn shrink_f64(value: f64) -> Shrinkable<f64> {
    if value.is_nan() {
        return Shrinkable::new(value).with(Stream::one(Shrinkable::new(0.0)));
    }
    let seed = if value.is_infinite() {
        if value > 0.0 { f64::MAX } else { f64::MIN }
    } else {
        value
    };
    Shrinkable::new(value).with_fn(move || shrink_from(seed))
}

pub fn shrink_f32(value: f32) -> Shrinkable<f32> {
    shrink_f64(value as f64).map(|v| *v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_no_shrinks() {
        assert!(shrink_f64(0.0).shrinks().is_empty());
    }

    #[test]
    fn nonzero_leads_with_zero() {
        let values: Vec<f64> = shrink_f64(12.5).shrinks().to_vec().iter().map(|s| *s.value()).collect();
        assert_eq!(values[0], 0.0);
    }

    #[test]
    fn nan_shrinks_to_zero() {
        let values: Vec<f64> = shrink_f64(f64::NAN).shrinks().to_vec().iter().map(|s| *s.value()).collect();
        assert_eq!(values, vec![0.0]);
    }

    #[test]
    fn infinity_leads_with_zero_then_shrinks_toward_max_finite() {
        let shr = shrink_f64(f64::INFINITY);
        let children = shr.shrinks().to_vec();
        assert_eq!(*children[0].value(), 0.0);
        assert!(children.iter().all(|c| c.value().is_finite()));
        assert!(children.iter().any(|c| *c.value() > 0.0));
    }

    #[test]
    fn children_are_smaller_in_magnitude() {
        fn check(shr: &Shrinkable<f64>, depth: u32) {
            if depth == 0 {
                return;
            }
            let parent_abs = shr.value().abs();
            for child in shr.shrinks().to_vec() {
                assert!(child.value().abs() <= parent_abs);
                check(&child, depth - 1);
            }
        }
        check(&shrink_f64(999.25), 6);
    }

    #[test]
    fn fraction_collapse_emits_half_power_of_two() {
        let (_, exp) = frexp(12.0);
        let children: Vec<f64> = fraction_collapse(12.0).to_vec().iter().map(|s| *s.value()).collect();
        assert_eq!(children, vec![ldexp(0.5, exp)]);
    }

    #[test]
    fn integerize_rejects_values_already_integral() {
        assert!(integerize(4.0).is_empty());
    }

    #[test]
    fn integerize_accepts_fractional_values() {
        let children: Vec<f64> = integerize(4.75).to_vec().iter().map(|s| *s.value()).collect();
        assert_eq!(children, vec![4.0]);
    }
}
