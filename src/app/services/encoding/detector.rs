//! Byte buffer to text conversion with encoding detection

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use tracing::{debug, warn};

use crate::app::models::{DetectedEncoding, EncodingSource, RawDocument};
use crate::constants::{CONFIDENCE_BOM, CONFIDENCE_GUESS, CONFIDENCE_HINT, CONFIDENCE_UTF8};
use crate::{Error, Result};

/// Decoded text of one upload together with the encoding decision
#[derive(Debug, Clone)]
pub struct DecodedText {
    /// Decoded content with any byte-order mark removed
    pub text: String,

    /// Encoding used for decoding
    pub encoding: DetectedEncoding,

    /// Number of U+FFFD replacement characters introduced by decoding
    pub replacements: usize,
}

/// Choose an encoding for a byte buffer
///
/// Evidence is weighed in order: byte-order mark, recognised hint label,
/// UTF-8 validity, then a statistical guess.
pub fn detect_encoding(bytes: &[u8], hint: Option<&str>) -> (&'static Encoding, DetectedEncoding) {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, describe(encoding, CONFIDENCE_BOM, EncodingSource::Bom));
    }

    if let Some(label) = hint {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => {
                return (encoding, describe(encoding, CONFIDENCE_HINT, EncodingSource::Hint));
            }
            None => warn!("Ignoring unknown encoding hint '{}'", label),
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        return (
            UTF_8,
            describe(UTF_8, CONFIDENCE_UTF8, EncodingSource::Utf8Validation),
        );
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, false);

    (encoding, describe(encoding, CONFIDENCE_GUESS, EncodingSource::Guess))
}

/// Detect the encoding of a raw upload and decode it to text
///
/// Fails only when the buffer is empty or looks binary; replacement
/// characters from an imperfect guess are logged and counted instead.
pub fn decode_document(doc: &RawDocument) -> Result<DecodedText> {
    if doc.is_empty() {
        return Err(Error::empty_document(&doc.identity));
    }

    let (encoding, mut detected) = detect_encoding(&doc.bytes, doc.encoding_hint.as_deref());

    let wide = encoding == UTF_16LE || encoding == UTF_16BE;
    if !wide && doc.bytes.contains(&0) {
        return Err(Error::decode(
            &doc.identity,
            "content contains NUL bytes and is not text under any supported encoding",
        ));
    }

    let (text, used, had_errors) = encoding.decode(&doc.bytes);
    if used != encoding {
        detected.name = used.name().to_string();
    }

    let replacements = if had_errors {
        text.chars().filter(|c| *c == char::REPLACEMENT_CHARACTER).count()
    } else {
        0
    };

    if replacements > 0 {
        warn!(
            "Decoding '{}' as {} replaced {} invalid sequences",
            doc.identity, detected.name, replacements
        );
    }

    debug!(
        "Detected encoding for '{}': {} ({:?}, confidence {:.2})",
        doc.identity, detected.name, detected.source, detected.confidence
    );

    Ok(DecodedText {
        text: text.into_owned(),
        encoding: detected,
        replacements,
    })
}

fn describe(encoding: &'static Encoding, confidence: f32, source: EncodingSource) -> DetectedEncoding {
    DetectedEncoding {
        name: encoding.name().to_string(),
        confidence,
        source,
    }
}
