//! Filters backed by the codecs in [`crate::codec`].

use super::{DecodeOptions, DecodeResult, Filter};
use crate::codec::{
    PredictorParams, apply_predictor, ascii85decode, asciihexdecode, flate_decode,
    flate_decode_lenient, lzwdecode_lenient, lzwdecode_with_earlychange, rldecode,
};
use crate::error::{PdfError, Result};
use crate::model::objects::PDFDict;
use std::io::{Read, Write};

fn read_all(input: &mut dyn Read) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    input.read_to_end(&mut data)?;
    Ok(data)
}

/// `/ASCIIHexDecode`
#[derive(Debug, Clone, Copy, Default)]
pub struct ASCIIHexFilter;

impl Filter for ASCIIHexFilter {
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        _index: usize,
        _options: &DecodeOptions,
    ) -> Result<DecodeResult> {
        output.write_all(&asciihexdecode(&read_all(input)?)?)?;
        Ok(DecodeResult::with_parameters(params))
    }
}

/// `/ASCII85Decode`
#[derive(Debug, Clone, Copy, Default)]
pub struct ASCII85Filter;

impl Filter for ASCII85Filter {
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        _index: usize,
        _options: &DecodeOptions,
    ) -> Result<DecodeResult> {
        output.write_all(&ascii85decode(&read_all(input)?)?)?;
        Ok(DecodeResult::with_parameters(params))
    }
}

/// `/RunLengthDecode`
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthFilter;

impl Filter for RunLengthFilter {
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        _index: usize,
        _options: &DecodeOptions,
    ) -> Result<DecodeResult> {
        output.write_all(&rldecode(&read_all(input)?)?)?;
        Ok(DecodeResult::with_parameters(params))
    }
}

/// `/LZWDecode`, honouring `/EarlyChange` and predictors.
///
/// Output decoded before an invalid code is kept, and flagged as repaired,
/// unless `skip_expensive_repair` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LZWFilter;

impl Filter for LZWFilter {
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        _index: usize,
        options: &DecodeOptions,
    ) -> Result<DecodeResult> {
        let early_change = params
            .get("EarlyChange")
            .and_then(|v| v.as_int().ok())
            .unwrap_or(1);
        let data = read_all(input)?;
        let mut result = DecodeResult::with_parameters(params);
        let decoded = match lzwdecode_with_earlychange(&data, early_change) {
            Ok(decoded) => decoded,
            Err(err) if options.skip_expensive_repair => return Err(err),
            Err(err) => {
                let partial = lzwdecode_lenient(&data, early_change);
                if partial.is_empty() {
                    return Err(err);
                }
                result.repaired = true;
                partial
            }
        };
        let decoded = apply_predictor(decoded, &PredictorParams::from_dict(params))?;
        output.write_all(&decoded)?;
        Ok(result)
    }
}

/// `/FlateDecode`, honouring predictors.
///
/// Damaged zlib data is recovered up to the first error unless
/// `skip_expensive_repair` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateFilter;

impl Filter for FlateFilter {
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        _index: usize,
        options: &DecodeOptions,
    ) -> Result<DecodeResult> {
        let data = read_all(input)?;
        let mut result = DecodeResult::with_parameters(params);
        let decoded = match flate_decode(&data) {
            Ok(decoded) => decoded,
            Err(err) if options.skip_expensive_repair => return Err(err),
            Err(err) => {
                let partial = flate_decode_lenient(&data);
                if partial.is_empty() {
                    return Err(err);
                }
                result.repaired = true;
                partial
            }
        };
        let decoded = apply_predictor(decoded, &PredictorParams::from_dict(params))
            .map_err(|e| PdfError::DecodeError(format!("flate predictor: {e}")))?;
        output.write_all(&decoded)?;
        Ok(result)
    }
}
