//! GIF89a serialization of a quantized animation.

pub(crate) mod gif89a;
pub(crate) mod lzw;

pub use gif89a::{GifEncoder, check_dimensions};
