//! String shrinking: delegates to the list-like shrinker over the
//! character sequence, then reassembles a `String`.

use super::list::shrink_vec;
use crate::shrinkable::Shrinkable;

pub fn shrink_string(value: &str, min_len: usize, char_shrink: impl Fn(char) -> Shrinkable<char> + Clone + 'static) -> Shrinkable<String> {
    let elements: Vec<Shrinkable<char>> = value.chars().map(&char_shrink).collect();
    shrink_vec(elements, min_len).map(|chars| chars.iter().collect())
}

/// Default character shrinker: shrinks toward `'a'`, treating it as the
/// "zero" of the alphabet, the way integer shrinking treats zero.
pub fn shrink_char(value: char) -> Shrinkable<char> {
    let anchor = 'a';
    if value == anchor {
        return Shrinkable::new(value);
    }
    let code = value as u32;
    let anchor_code = anchor as u32;
    Shrinkable::new(value).with_fn(move || {
        use crate::stream::Stream;
        let midpoint = if code > anchor_code {
            anchor_code + (code - anchor_code) / 2
        } else {
            code
        };
        let mut candidates = vec![char::from_u32(anchor_code).unwrap()];
        if midpoint != anchor_code && midpoint != code {
            if let Some(c) = char::from_u32(midpoint) {
                candidates.push(c);
            }
        }
        Stream::values(candidates).map(|c: &char| shrink_char(*c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_no_shrinks() {
        assert!(shrink_string("", 0, shrink_char).shrinks().is_empty());
    }

    #[test]
    fn shrinks_toward_shorter_strings() {
        let shr = shrink_string("hello", 0, shrink_char);
        let mut saw_shorter = false;
        for child in shr.shrinks().to_vec() {
            if child.value().len() < 5 {
                saw_shorter = true;
            }
        }
        assert!(saw_shorter);
    }

    #[test]
    fn char_a_has_no_shrinks() {
        assert!(shrink_char('a').shrinks().is_empty());
    }
}
