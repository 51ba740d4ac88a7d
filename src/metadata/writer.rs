use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use img_parts::Bytes;
use img_parts::png::{Png, PngChunk};
use serde::Serialize;

use super::USER_COMMENT_KEY;
use super::error::MetadataError;
use super::json::encode_comment;
use super::reader::{CHUNK_TEXT, chunk_keyword, parse_png};

const CHUNK_IDAT: [u8; 4] = *b"IDAT";
const CHUNK_IEND: [u8; 4] = *b"IEND";

/// Embed a JSON comment into a base64-encoded PNG and return the new image as base64.
///
/// Steps:
/// 1. Decode the base64 payload (ASCII whitespace is ignored)
/// 2. Check that the bytes are a decodable PNG
/// 3. Serialize `comment` with [`encode_comment`]
/// 4. Replace any `UserComment` text chunk with a single new `tEXt` chunk
/// 5. Encode the resulting PNG as base64 (standard alphabet, padded)
///
/// All other chunks, pixel data and colour profile included, are carried over unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use png_comment::metadata::rewrite;
/// use serde_json::json;
///
/// let image_b64 = std::fs::read_to_string("image.b64").unwrap();
/// let updated = rewrite(&image_b64, &json!({"author": "alice"})).unwrap();
/// ```
pub fn rewrite<C>(image_b64: &str, comment: &C) -> Result<String, MetadataError>
where
    C: Serialize + ?Sized,
{
    let png_bytes = decode_base64(image_b64)?;
    let updated = rewrite_png(&png_bytes, comment)?;
    Ok(STANDARD.encode(updated))
}

/// Embed a JSON comment into raw PNG bytes.
///
/// Same contract as [`rewrite`] without the base64 transport encoding.
pub fn rewrite_png<C>(png_bytes: &[u8], comment: &C) -> Result<Vec<u8>, MetadataError>
where
    C: Serialize + ?Sized,
{
    ensure_png(png_bytes)?;
    let text = encode_comment(comment)?;

    let mut png = parse_png(png_bytes)?;
    let removed = remove_user_comments(&mut png);
    if removed > 0 {
        log::debug!("Replacing {removed} existing {USER_COMMENT_KEY} chunk(s)");
    }

    let pos = text_chunk_position(&png);
    png.chunks_mut().insert(pos, user_comment_chunk(&text));
    log::debug!("Inserted {USER_COMMENT_KEY} tEXt chunk ({} bytes) at index {pos}", text.len());

    Ok(png.encoder().bytes().to_vec())
}

fn decode_base64(image_b64: &str) -> Result<Vec<u8>, MetadataError> {
    let compact: Vec<u8> = image_b64
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Reject anything that is not a PNG, then decode it once to make sure it is intact.
fn ensure_png(bytes: &[u8]) -> Result<(), MetadataError> {
    let format = image::guess_format(bytes).map_err(|_| MetadataError::UnknownFormat)?;
    if format != ImageFormat::Png {
        return Err(MetadataError::NotPng(format));
    }

    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| MetadataError::Image(e.to_string()))?;
    log::debug!(
        "Decoded PNG {}x{} ({:?})",
        img.width(),
        img.height(),
        img.color()
    );
    Ok(())
}

fn remove_user_comments(png: &mut Png) -> usize {
    let chunks = png.chunks_mut();
    let before = chunks.len();
    chunks.retain(|chunk| chunk_keyword(chunk) != Some(USER_COMMENT_KEY.as_bytes()));
    before - chunks.len()
}

/// Text goes ahead of the image data, or ahead of `IEND` when there is none.
fn text_chunk_position(png: &Png) -> usize {
    let chunks = png.chunks();
    chunks
        .iter()
        .position(|c| c.kind() == CHUNK_IDAT)
        .or_else(|| chunks.iter().position(|c| c.kind() == CHUNK_IEND))
        .unwrap_or(chunks.len())
}

fn user_comment_chunk(text: &str) -> PngChunk {
    let mut contents = Vec::with_capacity(USER_COMMENT_KEY.len() + 1 + text.len());
    contents.extend_from_slice(USER_COMMENT_KEY.as_bytes());
    contents.push(0);
    contents.extend_from_slice(text.as_bytes());
    PngChunk::new(CHUNK_TEXT, Bytes::from(contents))
}
