//! `true` shrinks to `false`; `false` is already minimal.

use crate::shrinkable::Shrinkable;
use crate::stream::Stream;

pub fn shrink_bool(value: bool) -> Shrinkable<bool> {
    if value {
        Shrinkable::new(true).with(Stream::one(Shrinkable::new(false)))
    } else {
        Shrinkable::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_shrinks_to_false() {
        let values: Vec<bool> = shrink_bool(true).shrinks().to_vec().iter().map(|s| *s.value()).collect();
        assert_eq!(values, vec![false]);
    }

    #[test]
    fn false_has_no_shrinks() {
        assert!(shrink_bool(false).shrinks().is_empty());
    }
}
