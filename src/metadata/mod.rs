//! PNG textual metadata reading and writing.
//!
//! This module provides the comment rewrite and its supporting pieces:
//!
//! - [`rewrite`] — Decode a base64 PNG, embed a JSON comment as a `tEXt` chunk, re-encode
//! - [`rewrite_png`] — The same operation on raw PNG bytes
//! - [`encode_comment`] — Serialize a comment to the JSON text stored in the chunk
//! - [`read_text_entries`] / [`read_user_comment`] — Inspect textual chunks of a PNG
//!
//! All failures are reported as [`MetadataError`], whose [`kind`](MetadataError::kind)
//! separates bad input data, non-PNG images, and unserializable comments.

mod error;
mod finite;
mod json;
mod reader;
mod writer;

pub use error::{ErrorKind, MetadataError};
pub use json::encode_comment;
pub use reader::{TextEntry, read_text_entries, read_user_comment};
pub use writer::{rewrite, rewrite_png};

/// Keyword of the textual chunk that carries the JSON comment.
pub const USER_COMMENT_KEY: &str = "UserComment";

/// In-memory test images shared by the metadata and api tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([255, 0, 0]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, format)
            .unwrap();
        buf.into_inner()
    }

    /// A 1×1 red PNG.
    pub fn red_png() -> Vec<u8> {
        encode(1, 1, ImageFormat::Png)
    }

    /// A 4×3 red PNG, large enough to notice pixel corruption.
    pub fn small_png() -> Vec<u8> {
        encode(4, 3, ImageFormat::Png)
    }

    /// An 8×8 red JPEG.
    pub fn red_jpeg() -> Vec<u8> {
        encode(8, 8, ImageFormat::Jpeg)
    }

    pub fn b64(bytes: &[u8]) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
    }

    pub fn unb64(s: &str) -> Vec<u8> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, s).unwrap()
    }
}
