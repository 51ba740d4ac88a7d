use img_parts::Bytes;
use img_parts::png::{Png, PngChunk};

use super::USER_COMMENT_KEY;
use super::error::MetadataError;

pub(super) const CHUNK_TEXT: [u8; 4] = *b"tEXt";
pub(super) const CHUNK_ZTEXT: [u8; 4] = *b"zTXt";
pub(super) const CHUNK_ITEXT: [u8; 4] = *b"iTXt";

/// A keyword/text pair read from an uncompressed textual chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

/// Parse PNG bytes into their chunk list.
pub(super) fn parse_png(png_bytes: &[u8]) -> Result<Png, MetadataError> {
    Png::from_bytes(Bytes::copy_from_slice(png_bytes))
        .map_err(|e| MetadataError::Image(format!("failed to parse PNG chunks: {e}")))
}

/// Keyword of a `tEXt`, `zTXt` or `iTXt` chunk, `None` for any other chunk type.
pub(super) fn chunk_keyword(chunk: &PngChunk) -> Option<&[u8]> {
    let kind = chunk.kind();
    if kind != CHUNK_TEXT && kind != CHUNK_ZTEXT && kind != CHUNK_ITEXT {
        return None;
    }
    let contents = chunk.contents();
    let end = contents.iter().position(|&b| b == 0)?;
    Some(&contents[..end])
}

/// Latin-1 bytes map one-to-one onto the first 256 code points.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_text_chunk(chunk: &PngChunk) -> Option<TextEntry> {
    let keyword = chunk_keyword(chunk)?;
    let contents = chunk.contents();
    let rest = &contents[keyword.len() + 1..];

    match chunk.kind() {
        CHUNK_TEXT => Some(TextEntry {
            keyword: latin1_to_string(keyword),
            text: latin1_to_string(rest),
        }),
        CHUNK_ITEXT => {
            // compression flag, compression method, language tag\0, translated keyword\0, text
            let (&flag, rest) = rest.split_first()?;
            if flag != 0 {
                log::debug!("Skipping compressed iTXt chunk");
                return None;
            }
            let rest = rest.get(1..)?;
            let lang_end = rest.iter().position(|&b| b == 0)?;
            let rest = &rest[lang_end + 1..];
            let translated_end = rest.iter().position(|&b| b == 0)?;
            let text = std::str::from_utf8(&rest[translated_end + 1..]).ok()?;
            Some(TextEntry {
                keyword: latin1_to_string(keyword),
                text: text.to_string(),
            })
        }
        _ => {
            log::debug!("Skipping compressed zTXt chunk");
            None
        }
    }
}

/// Read the uncompressed textual entries of a PNG, in file order.
///
/// `tEXt` chunks and `iTXt` chunks without compression are returned; compressed
/// chunks are skipped.
pub fn read_text_entries(png_bytes: &[u8]) -> Result<Vec<TextEntry>, MetadataError> {
    let png = parse_png(png_bytes)?;
    Ok(png.chunks().iter().filter_map(decode_text_chunk).collect())
}

/// Read the `UserComment` text of a PNG, if it has one.
///
/// # Example
///
/// ```rust,no_run
/// use png_comment::metadata::read_user_comment;
///
/// let bytes = std::fs::read("tagged.png").unwrap();
/// if let Some(comment) = read_user_comment(&bytes).unwrap() {
///     println!("{comment}");
/// }
/// ```
pub fn read_user_comment(png_bytes: &[u8]) -> Result<Option<String>, MetadataError> {
    Ok(read_text_entries(png_bytes)?
        .into_iter()
        .find(|entry| entry.keyword == USER_COMMENT_KEY)
        .map(|entry| entry.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::fixtures;

    fn with_chunks(chunks: Vec<PngChunk>) -> Vec<u8> {
        let mut png = parse_png(&fixtures::red_png()).unwrap();
        let at = png.chunks().len() - 1;
        for chunk in chunks.into_iter().rev() {
            png.chunks_mut().insert(at, chunk);
        }
        png.encoder().bytes().to_vec()
    }

    #[test]
    fn plain_png_has_no_entries() {
        assert!(read_text_entries(&fixtures::red_png()).unwrap().is_empty());
        assert_eq!(read_user_comment(&fixtures::red_png()).unwrap(), None);
    }

    #[test]
    fn reads_text_and_itxt() {
        let bytes = with_chunks(vec![
            PngChunk::new(CHUNK_TEXT, Bytes::from_static(b"Author\0J\xf6rg")),
            PngChunk::new(
                CHUNK_ITEXT,
                Bytes::from_static(b"Title\0\0\0en\0Titel\0Gr\xc3\xbc\xc3\x9fe"),
            ),
        ]);
        let entries = read_text_entries(&bytes).unwrap();
        assert_eq!(
            entries,
            vec![
                TextEntry { keyword: "Author".into(), text: "Jörg".into() },
                TextEntry { keyword: "Title".into(), text: "Grüße".into() },
            ]
        );
    }

    #[test]
    fn skips_compressed_chunks() {
        let bytes = with_chunks(vec![
            PngChunk::new(CHUNK_ZTEXT, Bytes::from_static(b"Comment\0\0x\x9c")),
            PngChunk::new(CHUNK_ITEXT, Bytes::from_static(b"Comment\0\x01\0\0\0x\x9c")),
        ]);
        assert!(read_text_entries(&bytes).unwrap().is_empty());
    }

    #[test]
    fn first_user_comment_wins() {
        let bytes = with_chunks(vec![
            PngChunk::new(CHUNK_TEXT, Bytes::from_static(b"UserComment\0{\"a\": 1}")),
            PngChunk::new(CHUNK_TEXT, Bytes::from_static(b"UserComment\0{\"a\": 2}")),
        ]);
        assert_eq!(
            read_user_comment(&bytes).unwrap().as_deref(),
            Some(r#"{"a": 1}"#)
        );
    }

    #[test]
    fn rejects_non_png() {
        assert!(read_text_entries(b"definitely not a png").is_err());
        assert!(read_user_comment(&fixtures::red_jpeg()).is_err());
    }
}
