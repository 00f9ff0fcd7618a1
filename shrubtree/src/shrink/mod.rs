//! Canonical shrink trees for the built-in domains.

pub mod boolean;
pub mod floating;
pub mod integral;
pub mod list;
pub mod string;

pub use boolean::shrink_bool;
pub use floating::{shrink_f32, shrink_f64};
pub use integral::{
    shrink_i16, shrink_i32, shrink_i64, shrink_i8, shrink_u16, shrink_u32, shrink_u64, shrink_u8,
};
pub use list::shrink_vec;
pub use string::{shrink_char, shrink_string};
