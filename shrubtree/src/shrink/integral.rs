//! Binary-search integer shrinking: the first candidate is always zero, then
//! the remaining range is bisected, with every midpoint carrying its own
//! nested shrink tree refining further toward zero.

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

fn genpos(min: i64, max: i64) -> Stream<Shrinkable<i64>> {
    if min + 1 >= max {
        return Stream::empty();
    }
    let mid = min / 2 + max / 2 + if min % 2 != 0 && max % 2 != 0 { 1 } else { 0 };
    if min + 2 >= max {
        return Stream::one(Shrinkable::new(mid));
    }
    let node = Shrinkable::new(mid).with_fn(move || genpos(min, mid));
    Stream::cons(node, move || genpos(mid, max))
}

fn genneg(min: i64, max: i64) -> Stream<Shrinkable<i64>> {
    if min + 1 >= max {
        return Stream::empty();
    }
    let mid = min / 2 + max / 2 + if min % 2 != 0 && max % 2 != 0 { -1 } else { 0 };
    if min + 2 >= max {
        return Stream::one(Shrinkable::new(mid));
    }
    let node = Shrinkable::new(mid).with_fn(move || genneg(mid, max));
    Stream::cons(node, move || genneg(min, mid))
}

pub fn shrink_i64(value: i64) -> Shrinkable<i64> {
    Shrinkable::new(value).with_fn(move || {
        if value == 0 {
            Stream::empty()
        } else if value > 0 {
            Stream::one(Shrinkable::new(0)).concat(genpos(0, value))
        } else {
            Stream::one(Shrinkable::new(0)).concat(genneg(value, 0))
        }
    })
}

fn genpos_u(min: u64, max: u64) -> Stream<Shrinkable<u64>> {
    if min + 1 >= max {
        return Stream::empty();
    }
    let mid = min / 2 + max / 2 + if min % 2 != 0 && max % 2 != 0 { 1 } else { 0 };
    if min + 2 >= max {
        return Stream::one(Shrinkable::new(mid));
    }
    let node = Shrinkable::new(mid).with_fn(move || genpos_u(min, mid));
    Stream::cons(node, move || genpos_u(mid, max))
}

pub fn shrink_u64(value: u64) -> Shrinkable<u64> {
    Shrinkable::new(value).with_fn(move || {
        if value == 0 {
            Stream::empty()
        } else {
            Stream::one(Shrinkable::new(0)).concat(genpos_u(0, value))
        }
    })
}

macro_rules! signed_shrinker {
    ($name:ident, $ty:ty) => {
        pub fn $name(value: $ty) -> Shrinkable<$ty> {
            shrink_i64(value as i64).map(|v| *v as $ty)
        }
    };
}

macro_rules! unsigned_shrinker {
    ($name:ident, $ty:ty) => {
        pub fn $name(value: $ty) -> Shrinkable<$ty> {
            shrink_u64(value as u64).map(|v| *v as $ty)
        }
    };
}

signed_shrinker!(shrink_i8, i8);
signed_shrinker!(shrink_i16, i16);
signed_shrinker!(shrink_i32, i32);
unsigned_shrinker!(shrink_u8, u8);
unsigned_shrinker!(shrink_u16, u16);
unsigned_shrinker!(shrink_u32, u32);
