//! ASCII85 and ASCIIHex stream decoders.

use crate::error::{PdfError, Result};

const fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x00')
}

/// Decode ASCII85-encoded data (PDF variant).
/// Handles: z-encoding, <~ ~> markers, whitespace, missing EOD.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut result = Vec::with_capacity(data.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut filled = 0;

    for (pos, &byte) in data.iter().enumerate() {
        match byte {
            b if is_pdf_whitespace(b) => {}
            b'z' if filled == 0 => result.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[filled] = byte - b'!';
                filled += 1;
                if filled == 5 {
                    result.extend_from_slice(&group_value(&group, pos)?.to_be_bytes());
                    filled = 0;
                }
            }
            _ => {
                return Err(PdfError::DecodeError(format!(
                    "invalid ASCII85 byte 0x{byte:02x} at {pos}"
                )));
            }
        }
    }

    if filled == 1 {
        return Err(PdfError::DecodeError(
            "ASCII85 data ends with a single character group".into(),
        ));
    }
    if filled > 1 {
        group[filled..].fill(b'u' - b'!');
        let bytes = group_value(&group, data.len())?.to_be_bytes();
        result.extend_from_slice(&bytes[..filled - 1]);
    }

    Ok(result)
}

fn group_value(group: &[u8; 5], pos: usize) -> Result<u32> {
    let value = group
        .iter()
        .fold(0u64, |acc, &digit| acc * 85 + u64::from(digit));
    u32::try_from(value)
        .map_err(|_| PdfError::DecodeError(format!("ASCII85 group overflows before {pos}")))
}

/// Decode ASCIIHex-encoded data. Stops at `>`; an odd final digit is
/// padded with zero.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for (pos, &byte) in data.iter().enumerate() {
        if byte == b'>' {
            break;
        }
        if is_pdf_whitespace(byte) {
            continue;
        }
        let nibble = hex_nibble(byte).ok_or_else(|| {
            PdfError::DecodeError(format!("invalid hex digit 0x{byte:02x} at {pos}"))
        })?;
        match pending.take() {
            Some(high) => result.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    if let Some(high) = pending {
        result.push(high << 4);
    }

    Ok(result)
}

const fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
