//! LZWDecode via weezl.

use crate::error::{PdfError, Result};
use weezl::{BitOrder, decode::Decoder};

/// LZW with the PDF default `/EarlyChange 1`.
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    lzwdecode_with_earlychange(data, 1)
}

fn decoder(early_change: i64) -> Decoder {
    match early_change {
        0 => Decoder::new(BitOrder::Msb, 8),
        _ => Decoder::with_tiff_size_switch(BitOrder::Msb, 8),
    }
}

/// LZW, MSB-first with 8-bit symbols.
///
/// `/EarlyChange 1` widens codes one entry early, which is what weezl calls
/// the TIFF size switch. A missing end-of-data code is accepted; an invalid
/// code is an error.
pub fn lzwdecode_with_earlychange(data: &[u8], early_change: i64) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    decoder(early_change)
        .into_vec(&mut output)
        .decode(data)
        .status
        .map_err(|e| PdfError::DecodeError(format!("lzw: {e}")))?;
    Ok(output)
}

/// Best-effort LZW decode: the output produced before the first invalid code.
pub fn lzwdecode_lenient(data: &[u8], early_change: i64) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() * 2);
    let _ = decoder(early_change).into_vec(&mut output).decode(data);
    output
}
