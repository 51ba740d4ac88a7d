use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

use super::error::MetadataError;
use super::finite::ensure_finite;

/// Compact JSON with a space after `,` and `:`, and every character outside printable
/// ASCII escaped as `\uXXXX`. The output is always 7-bit clean, so it fits a Latin-1
/// `tEXt` chunk as-is.
struct CommentFormatter;

impl Formatter for CommentFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() && c != '\x7f' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize a comment to the JSON text stored under `UserComment`.
///
/// Object keys keep their insertion order and numbers keep their exact digits. The
/// comment must serialize to a JSON object; scalars, arrays, maps with non-string keys
/// and NaN or infinite floats are rejected.
///
/// # Example
///
/// ```rust
/// use png_comment::metadata::encode_comment;
/// use serde_json::json;
///
/// let text = encode_comment(&json!({"author": "alice", "tags": [1, 2, 3]})).unwrap();
/// assert_eq!(text, r#"{"author": "alice", "tags": [1, 2, 3]}"#);
/// ```
pub fn encode_comment<C>(comment: &C) -> Result<String, MetadataError>
where
    C: Serialize + ?Sized,
{
    ensure_finite(comment)?;
    let value = serde_json::to_value(comment)?;
    if !value.is_object() {
        return Err(MetadataError::Serialization(
            "comment must be a JSON object".to_string(),
        ));
    }

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, CommentFormatter);
    value.serialize(&mut ser)?;

    String::from_utf8(buf).map_err(|e| MetadataError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ErrorKind;
    use serde_json::{Value, json};
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn spaced_separators() {
        let text = encode_comment(&json!({"author": "alice", "tags": [1, 2, 3]})).unwrap();
        assert_eq!(text, r#"{"author": "alice", "tags": [1, 2, 3]}"#);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(encode_comment(&json!({})).unwrap(), "{}");
        assert_eq!(
            encode_comment(&json!({"a": [], "b": {}})).unwrap(),
            r#"{"a": [], "b": {}}"#
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let mut map = serde_json::Map::new();
        map.insert("zeta".into(), json!(1));
        map.insert("alpha".into(), json!(2));
        map.insert("mid".into(), json!(3));
        assert_eq!(
            encode_comment(&map).unwrap(),
            r#"{"zeta": 1, "alpha": 2, "mid": 3}"#
        );
    }

    #[test]
    fn escapes_non_ascii() {
        let text = encode_comment(&json!({"name": "café", "face": "😀", "del": "\u{7f}"})).unwrap();
        assert_eq!(
            text,
            r#"{"name": "caf\u00e9", "face": "\ud83d\ude00", "del": "\u007f"}"#
        );
        assert!(text.is_ascii());
    }

    #[test]
    fn control_and_quote_escapes() {
        let text = encode_comment(&json!({"s": "a\"b\\c\nd\u{1}"})).unwrap();
        assert_eq!(text, r#"{"s": "a\"b\\c\nd\u0001"}"#);
    }

    #[test]
    fn lossless_for_nested_values() {
        let comment = json!({
            "n": null,
            "b": true,
            "i": -42,
            "f": 1.5,
            "nested": {"list": [{"x": "y"}, [1, [2, [3]]]], "ünï": "cödé"}
        });
        let text = encode_comment(&comment).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, comment);
    }

    #[test]
    fn accepts_plain_rust_maps() {
        let mut map = HashMap::new();
        map.insert("only", vec![1u8, 2]);
        assert_eq!(encode_comment(&map).unwrap(), r#"{"only": [1, 2]}"#);
    }

    #[test]
    fn rejects_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert((1u8, 2u8), "pair");
        let err = encode_comment(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn rejects_non_finite() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = encode_comment(&HashMap::from([("x", x)])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Serialization, "{x}");
        }
        let nested = HashMap::from([("readings", vec![Some(1.0f32), None, Some(f32::NAN)])]);
        assert_eq!(
            encode_comment(&nested).unwrap_err().kind(),
            ErrorKind::Serialization
        );
    }

    #[test]
    fn big_integers_keep_their_digits() {
        let raw = r#"{"n": 123456789012345678901234567890, "neg": -98765432109876543210}"#;
        let map: serde_json::Map<String, Value> = serde_json::from_str(raw).unwrap();
        assert_eq!(encode_comment(&map).unwrap(), raw);
    }

    #[test]
    fn rejects_non_objects() {
        for value in [json!([1, 2]), json!("text"), json!(3), json!(null)] {
            let err = encode_comment(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Serialization, "{value}");
        }
    }
}
