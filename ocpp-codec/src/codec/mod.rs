//! Generic JSON codec
//!
//! - `field`: per-property parse helpers and the JSON writer
//! - `hooks`: per-call vendor override chains
//! - `macros`: declarative generators built on the two above

pub mod field;
pub mod hooks;
#[macro_use]
pub mod macros;

pub use field::{bounded_str, catch_fault, expect_object, JsonCodec, JsonObjectExt, JsonWriter};
pub use hooks::{CodecHooks, Transform, ANY_LABEL};
