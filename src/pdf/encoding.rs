//! PDF text-string encoding
//!
//! PDF text strings are either PDFDocEncoded (treated here as Latin-1/UTF-8
//! on a best-effort basis) or UTF-16BE with a leading byte-order mark.

/// Decode the bytes of a PDF text string.
pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Encode a string as PDF text-string bytes.
///
/// Plain ASCII goes out as-is; anything else is written as UTF-16BE with a
/// byte-order mark so titles survive viewers that do not accept UTF-8.
pub fn encode_text(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        text.as_bytes().to_vec()
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }
}
