use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> chardetng fallback.
///
/// Malformed sequences become U+FFFD; a page is never lost to a bad byte.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

/// True for bodies that are clearly not markup or text: NUL bytes near the
/// start, or a PDF signature.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.starts_with(b"%PDF-") || head.contains(&0)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches(['"', '\'']).to_string())
            } else {
                None
            }
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        engine_warn!("Malformed {} bytes replaced while decoding", enc.name());
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    }
}
