//! Encoding detection and transcoding module
//!
//! Word lists arrive as raw bytes. Hebrew lists are still commonly shipped in
//! windows-1255 or ISO-8859-8, so anything that is not valid UTF-8 is
//! detected and transcoded.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Bytes sampled for detection
const SAMPLE_SIZE: usize = 64 * 1024;

/// Result of encoding detection
#[derive(Debug, Clone)]
pub struct EncodingInfo {
    /// Detected encoding name
    pub name: &'static str,
    /// The encoding_rs Encoding reference
    pub encoding: &'static Encoding,
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self {
            name: "UTF-8",
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Detect the encoding of a buffer by sampling its content
pub fn detect_encoding(content: &[u8]) -> EncodingInfo {
    if content.is_empty() {
        return EncodingInfo::default();
    }

    // Check for BOM first
    if let Some((encoding, _)) = Encoding::for_bom(content) {
        return EncodingInfo {
            name: encoding.name(),
            encoding,
        };
    }

    if std::str::from_utf8(content).is_ok() {
        return EncodingInfo::default();
    }

    let sample = &content[..content.len().min(SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == content.len());

    let encoding = detector.guess(Some(b"il"), true);

    EncodingInfo {
        name: encoding.name(),
        encoding,
    }
}

/// Decode a buffer to UTF-8, stripping any BOM
pub fn decode_text(content: &[u8]) -> (String, EncodingInfo) {
    let info = detect_encoding(content);

    // decode() sniffs and removes the BOM itself
    let (decoded, _, had_errors) = info.encoding.decode(content);
    if had_errors {
        log::warn!("Encoding errors while decoding {} text, using lossy conversion", info.name);
    }

    (decoded.into_owned(), info)
}
