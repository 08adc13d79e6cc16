use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};
use std::borrow::Cow;
use tracing::trace;

use crate::config::EncodingPolicy;
use crate::error::DecodeError;

/// Bytes that have no mapping in the Windows-1252 code page.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    /// Encoding that produced `text`.
    pub encoding: &'static Encoding,
    /// True when no candidate matched and the lossy fallback was used.
    pub fallback: bool,
    /// Number of U+FFFD substitutions made by the fallback.
    pub replaced: usize,
}

/// Decode `bytes` with the first candidate in `policy` that accepts them.
///
/// When every candidate rejects the input, the bytes are decoded as
/// Windows-1252 with its undefined bytes replaced by U+FFFD. That step cannot
/// fail, so the only error is a policy that disables it.
pub fn decode(bytes: &[u8], policy: &EncodingPolicy) -> Result<Decoded, DecodeError> {
    for &encoding in &policy.candidates {
        if let Some(text) = decode_strict(bytes, encoding) {
            return Ok(Decoded {
                text,
                encoding,
                fallback: false,
                replaced: 0,
            });
        }
        trace!(encoding = encoding.name(), "candidate rejected");
    }

    if !policy.lossy_fallback {
        let tried = policy
            .candidates
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(DecodeError::NoCandidate { tried });
    }

    let (text, replaced) = decode_single_byte_lossy(without_utf8_bom(bytes));
    Ok(Decoded {
        text,
        encoding: WINDOWS_1252,
        fallback: true,
        replaced,
    })
}

/// Decode without replacement. A matching BOM is stripped; UTF-16 is only
/// accepted behind its BOM. A UTF-8 BOM in front of single-byte text is
/// dropped as well, it must not end up as `ï»¿` in the header.
fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ if encoding == UTF_16LE || encoding == UTF_16BE => return None,
        _ => without_utf8_bom(bytes),
    };

    if encoding == WINDOWS_1252 && body.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
        return None;
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
}

fn without_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn decode_single_byte_lossy(bytes: &[u8]) -> (String, usize) {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    let mut replaced = 0;
    // encoding_rs passes the undefined bytes through as C1 controls
    let text = text
        .chars()
        .map(|c| match c {
            '\u{81}' | '\u{8D}' | '\u{8F}' | '\u{90}' | '\u{9D}' => {
                replaced += 1;
                char::REPLACEMENT_CHARACTER
            }
            other => other,
        })
        .collect();
    (text, replaced)
}
