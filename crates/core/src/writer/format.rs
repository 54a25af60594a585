//! Operand serialization.
//!
//! Numbers use a bounded number of fraction digits with trailing zeros
//! trimmed. Names escape delimiters and bytes outside `!`..`~` as `#xx`.
//! Strings are literal when every byte is 7-bit and there is no line break,
//! hex otherwise.

use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;
use std::io::Write;

const POWERS_OF_TEN: [i64; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// Largest fraction precision the fast path supports.
pub const MAX_FRACTION_DIGITS: usize = POWERS_OF_TEN.len() - 1;

/// Fixed-point formatting through integer arithmetic.
///
/// Returns `false` without writing when the scaled value does not fit in an
/// `i64`.
fn format_fast(out: &mut Vec<u8>, value: f64, max_fraction_digits: usize) -> bool {
    let digits = max_fraction_digits.min(MAX_FRACTION_DIGITS);
    let pow = POWERS_OF_TEN[digits];
    let scaled = (value.abs() * pow as f64).round();
    if scaled >= i64::MAX as f64 {
        return false;
    }
    let scaled = scaled as i64;
    if scaled == 0 {
        out.push(b'0');
        return true;
    }
    if value < 0.0 {
        out.push(b'-');
    }
    let int_part = scaled / pow;
    let mut frac_part = scaled % pow;
    // infallible on Vec
    let _ = write!(out, "{int_part}");
    if frac_part != 0 {
        let mut width = digits;
        while frac_part % 10 == 0 {
            frac_part /= 10;
            width -= 1;
        }
        let _ = write!(out, ".{frac_part:0width$}");
    }
    true
}

/// Locale-independent decimal formatting for values the fast path rejects.
fn format_decimal(out: &mut Vec<u8>, value: f64, max_fraction_digits: usize) {
    let mut text = format!("{value:.max_fraction_digits$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    out.extend_from_slice(text.as_bytes());
}

/// Append a real number.
///
/// NaN and infinities have no content stream representation and fail with
/// [`PdfError::Argument`].
pub fn write_number(out: &mut Vec<u8>, value: f64, max_fraction_digits: usize) -> Result<()> {
    if !value.is_finite() {
        return Err(PdfError::argument(format!(
            "{value} is not a finite number and cannot be written"
        )));
    }
    if !format_fast(out, value, max_fraction_digits) {
        format_decimal(out, value, max_fraction_digits);
    }
    Ok(())
}

/// Convenience wrapper around [`write_number`].
pub fn format_number(value: f64, max_fraction_digits: usize) -> Result<String> {
    let mut out = Vec::new();
    write_number(&mut out, value, max_fraction_digits)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

const fn needs_name_escape(b: u8) -> bool {
    !matches!(b, b'!'..=b'~')
        || matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#'
        )
}

/// Append `/name` with `#xx` escapes.
pub fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(b'/');
    for &b in name.as_bytes() {
        if needs_name_escape(b) {
            let _ = write!(out, "#{b:02X}");
        } else {
            out.push(b);
        }
    }
}

/// Append a string operand.
pub fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    let literal = bytes.iter().all(|&b| b < 0x80 && b != b'\r' && b != b'\n');
    if literal {
        out.push(b'(');
        for &b in bytes {
            if matches!(b, b'(' | b')' | b'\\') {
                out.push(b'\\');
            }
            out.push(b);
        }
        out.push(b')');
    } else {
        out.push(b'<');
        for &b in bytes {
            let _ = write!(out, "{b:02X}");
        }
        out.push(b'>');
    }
}

/// Append any direct object. Streams cannot appear inline.
pub fn write_object(out: &mut Vec<u8>, obj: &PDFObject, max_fraction_digits: usize) -> Result<()> {
    match obj {
        PDFObject::Null => out.extend_from_slice(b"null"),
        PDFObject::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        PDFObject::Int(n) => {
            let _ = write!(out, "{n}");
        }
        PDFObject::Real(n) => write_number(out, *n, max_fraction_digits)?,
        PDFObject::Name(name) => write_name(out, name),
        PDFObject::String(bytes) => write_string(out, bytes),
        PDFObject::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_object(out, item, max_fraction_digits)?;
            }
            out.push(b']');
        }
        PDFObject::Dict(dict) => {
            out.extend_from_slice(b"<<");
            for (i, (key, value)) in dict.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_name(out, key);
                out.push(b' ');
                write_object(out, value, max_fraction_digits)?;
            }
            out.extend_from_slice(b">>");
        }
        PDFObject::Ref(r) => {
            let _ = write!(out, "{} {} R", r.objid, r.genno);
        }
        PDFObject::Stream(_) => {
            return Err(PdfError::argument(
                "a stream cannot be written inline; add it as a resource",
            ));
        }
    }
    Ok(())
}
