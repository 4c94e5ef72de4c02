//! Byte decoding for file-based sources.
//!
//! vkOpt exports have been seen in UTF-8 (with and without BOM) and in
//! UTF-16 as written by Windows editors. Decoding is strict: a byte sequence
//! that is not valid in the chosen encoding fails the whole source.

use crate::config::TextEncoding;
use crate::error::ChatstatError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Decodes `bytes` into a string.
///
/// [`TextEncoding::Auto`] honours a byte-order mark and otherwise requires
/// UTF-8. A BOM matching the requested encoding is always stripped.
///
/// # Errors
///
/// Returns [`ChatstatError::Encoding`] (with `context` as its context) if
/// the bytes are not valid in the selected encoding.
///
/// # Example
///
/// ```rust
/// use chatstat::config::TextEncoding;
/// use chatstat::parsing::encoding::decode;
///
/// let text = decode(b"\xEF\xBB\xBFhi", TextEncoding::Auto, "example").unwrap();
/// assert_eq!(text, "hi");
///
/// let utf16 = [0xFF, 0xFE, b'h', 0, b'i', 0];
/// assert_eq!(decode(&utf16, TextEncoding::Auto, "example").unwrap(), "hi");
/// ```
pub fn decode(bytes: &[u8], encoding: TextEncoding, context: &str) -> Result<String, ChatstatError> {
    match encoding {
        TextEncoding::Auto => {
            if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
                decode_utf16(rest, u16::from_le_bytes, context)
            } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
                decode_utf16(rest, u16::from_be_bytes, context)
            } else {
                decode_utf8(bytes, context)
            }
        }
        TextEncoding::Utf8 => decode_utf8(bytes, context),
        TextEncoding::Utf16Le => decode_utf16(
            bytes.strip_prefix(UTF16_LE_BOM).unwrap_or(bytes),
            u16::from_le_bytes,
            context,
        ),
        TextEncoding::Utf16Be => decode_utf16(
            bytes.strip_prefix(UTF16_BE_BOM).unwrap_or(bytes),
            u16::from_be_bytes,
            context,
        ),
    }
}

fn decode_utf8(bytes: &[u8], context: &str) -> Result<String, ChatstatError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        ChatstatError::encoding(
            context,
            format!(
                "invalid UTF-8 at byte {}",
                e.utf8_error().valid_up_to()
            ),
        )
    })
}

fn decode_utf16(
    bytes: &[u8],
    unit: fn([u8; 2]) -> u16,
    context: &str,
) -> Result<String, ChatstatError> {
    if bytes.len() % 2 != 0 {
        return Err(ChatstatError::encoding(
            context,
            format!("UTF-16 input has odd length {}", bytes.len()),
        ));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    // position in code units; astral characters take two
    let mut position = 0;
    char::decode_utf16(units)
        .map(|c| match c {
            Ok(c) => {
                position += c.len_utf16();
                Ok(c)
            }
            Err(e) => Err(ChatstatError::encoding(
                context,
                format!(
                    "unpaired UTF-16 surrogate {:#06x} at byte {}",
                    e.unpaired_surrogate(),
                    position * 2
                ),
            )),
        })
        .collect()
}
