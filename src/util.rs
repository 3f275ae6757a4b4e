//! Byte decoding helpers for corpus files.

use std::borrow::Cow;

/// Decode file bytes to text.
///
/// UTF-8 is tried first (a BOM is handled by encoding_rs). Malformed input
/// falls back to the encoding named in the XML declaration, then to
/// Windows-1252, which older EPUB tooling still emits.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(label) = extract_xml_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding label from an `<?xml ... encoding="..."?>` declaration.
///
/// Only the first 100 bytes are inspected.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let decl_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let decl = &prefix[decl_start..];
    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let value = &decl[enc_pos + 9..];

    let quote = *value.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = value[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&value[1..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let text = "Blessed is the man \u{2020}";
        assert_eq!(decode_text(text.as_bytes()), text);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // 0x86 is the dagger in CP1252 and invalid as a lone UTF-8 byte.
        let bytes = b"God\x86 said";
        assert_eq!(decode_text(bytes), "God\u{2020} said");
    }

    #[test]
    fn test_xml_declared_encoding() {
        let bytes = b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><p>caf\xe9</p>";
        assert_eq!(extract_xml_encoding(bytes), Some("ISO-8859-1"));
        assert!(decode_text(bytes).contains("caf\u{e9}"));
    }

    #[test]
    fn test_missing_declaration() {
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
    }
}
