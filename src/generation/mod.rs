//! Text and structured output generation.

pub mod object;
pub mod text;

pub use object::{parse_object, strip_code_fences};
pub use text::{generate, generate_text};
