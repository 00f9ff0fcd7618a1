//! Default generators ("arbitrary" instances) for the built-in types.

use crate::generator::Generator;
use crate::random::Random;
use crate::shrink;
use crate::shrinkable::Shrinkable;

/// A type with a canonical default generator.
pub trait Arbitrary: Sized + Clone + 'static {
    fn arbitrary() -> Generator<Self>;
}

impl Arbitrary for bool {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng| shrink::shrink_bool(rng.bool_with_probability(0.5)))
    }
}

macro_rules! impl_arbitrary_int {
    ($ty:ty, $in_fn:ident, $shrink_fn:path, $min:expr, $max:expr) => {
        impl Arbitrary for $ty {
            fn arbitrary() -> Generator<Self> {
                Generator::new(|rng: &mut Random| {
                    // boundary values are over-sampled, the way integral
                    // `Arbi<T>` specializations in the source bias toward
                    // edge cases instead of pure uniform sampling.
                    if rng.bool_with_probability(0.3) {
                        let boundaries: [$ty; 5] = [$min, $max, 0 as $ty, 1 as $ty, (0 as $ty).wrapping_sub(1 as $ty)];
                        let idx = rng.size(0, boundaries.len());
                        $shrink_fn(boundaries[idx])
                    } else {
                        $shrink_fn(rng.$in_fn($min, $max))
                    }
                })
            }
        }
    };
}

impl_arbitrary_int!(i8, i8_in, shrink::shrink_i8, i8::MIN, i8::MAX);
impl_arbitrary_int!(i16, i16_in, shrink::shrink_i16, i16::MIN, i16::MAX);
impl_arbitrary_int!(i32, i32_in, shrink::shrink_i32, i32::MIN, i32::MAX);
impl_arbitrary_int!(u8, u8_in, shrink::shrink_u8, u8::MIN, u8::MAX);
impl_arbitrary_int!(u16, u16_in, shrink::shrink_u16, u16::MIN, u16::MAX);
impl_arbitrary_int!(u32, u32_in, shrink::shrink_u32, u32::MIN, u32::MAX);

impl Arbitrary for i64 {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| shrink::shrink_i64(rng.i64_in(i64::MIN / 2, i64::MAX / 2)))
    }
}

impl Arbitrary for u64 {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| shrink::shrink_u64(rng.u64_in(0, u64::MAX / 2)))
    }
}

impl Arbitrary for f64 {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| {
            if rng.bool_with_probability(0.05) {
                shrink::shrink_f64(f64::NAN)
            } else if rng.bool_with_probability(0.05) {
                shrink::shrink_f64(if rng.bool_with_probability(0.5) { f64::INFINITY } else { f64::NEG_INFINITY })
            } else {
                shrink::shrink_f64(rng.f64_in(-1e6, 1e6))
            }
        })
    }
}

impl Arbitrary for f32 {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| shrink::shrink_f32(rng.f64_in(-1e6, 1e6) as f32))
    }
}

impl Arbitrary for char {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| {
            let code = rng.u32_in(0x20, 0x7e);
            shrink::shrink_char(char::from_u32(code).unwrap_or('a'))
        })
    }
}

impl Arbitrary for String {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| {
            let len = rng.size(0, 20);
            let s: String = (0..len)
                .map(|_| char::from_u32(rng.u32_in(0x20, 0x7e)).unwrap_or('a'))
                .collect();
            shrink::shrink_string(&s, 0, shrink::shrink_char)
        })
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| {
            let len = rng.size(0, 10);
            let r#gen = T::arbitrary();
            let elements: Vec<Shrinkable<T>> = (0..len).map(|_| r#gen.generate(rng)).collect();
            shrink::shrink_vec(elements, 0)
        })
    }
}

impl<T: Arbitrary, U: Arbitrary> Arbitrary for (T, U) {
    fn arbitrary() -> Generator<Self> {
        T::arbitrary().pair_with(U::arbitrary())
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    fn arbitrary() -> Generator<Self> {
        Generator::new(|rng: &mut Random| {
            if rng.bool_with_probability(0.2) {
                Shrinkable::new(None)
            } else {
                T::arbitrary().generate(rng).map(|v| Some(v.clone()))
            }
        })
    }
}

pub fn arbitrary<T: Arbitrary>() -> Generator<T> {
    T::arbitrary()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_arbitrary_produces_both_values() {
        let mut rng = Random::from_seed(1);
        let r#gen = bool::arbitrary();
        let mut saw_true = false;
        let mut saw_false = false;
        for _ in 0..200 {
            match *r#gen.generate(&mut rng).value() {
                true => saw_true = true,
                false => saw_false = true,
            }
        }
        assert!(saw_true && saw_false);
    }

    #[test]
    fn i32_arbitrary_stays_in_declared_range() {
        let mut rng = Random::from_seed(5);
        let r#gen = i32::arbitrary();
        for _ in 0..500 {
            let v = *r#gen.generate(&mut rng).value();
            assert!(v >= i32::MIN && v <= i32::MAX);
        }
    }

    #[test]
    fn string_arbitrary_shrinks_toward_empty() {
        let mut rng = Random::from_seed(2);
        let r#gen = String::arbitrary();
        let shr = loop {
            let shr = r#gen.generate(&mut rng);
            if shr.value().len() > 3 {
                break shr;
            }
        };
        assert!(shr.shrinks().to_vec().iter().any(|c| c.value().len() < shr.value().len()));
    }
}
