use image::ImageFormat;

/// Failure category of a metadata operation.
///
/// Callers that need to react differently to bad input and to unsupported images
/// (the HTTP layer maps each kind to its own status code) match on this rather than
/// on the individual [`MetadataError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload is not valid base64, or the bytes are not a decodable image.
    Decode,
    /// The image decoded fine but is not a PNG.
    Format,
    /// The comment has no JSON object representation.
    Serialization,
}

/// Error returned by the PNG metadata functions.
///
/// The `Display` text carries internal detail (decoder messages, detected formats) and
/// is meant for logs. Use [`ErrorKind`] to build client-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image data is not a recognized image format")]
    UnknownFormat,

    #[error("image data could not be decoded: {0}")]
    Image(String),

    #[error("the provided image is not a PNG (detected {0:?})")]
    NotPng(ImageFormat),

    #[error("comment could not be serialized to JSON: {0}")]
    Serialization(String),
}

impl MetadataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Base64(_) | Self::UnknownFormat | Self::Image(_) => ErrorKind::Decode,
            Self::NotPng(_) => ErrorKind::Format,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(MetadataError::UnknownFormat.kind(), ErrorKind::Decode);
        assert_eq!(MetadataError::Image("bad crc".into()).kind(), ErrorKind::Decode);
        assert_eq!(MetadataError::NotPng(ImageFormat::Jpeg).kind(), ErrorKind::Format);
        assert_eq!(
            MetadataError::Serialization("key must be a string".into()).kind(),
            ErrorKind::Serialization
        );
    }

    #[test]
    fn not_png_message() {
        let msg = MetadataError::NotPng(ImageFormat::Gif).to_string();
        assert!(msg.starts_with("the provided image is not a PNG"));
        assert!(msg.contains("Gif"));
    }
}
