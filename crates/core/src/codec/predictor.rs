//! PNG and TIFF predictor reversal for Flate and LZW streams.

use crate::error::{PdfError, Result};
use crate::model::objects::PDFDict;

const MAX_ROW_BYTES: usize = 1 << 26;

/// `/Predictor`, `/Colors`, `/BitsPerComponent` and `/Columns` from a
/// filter's parameter dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    pub predictor: i64,
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    pub fn from_dict(params: &PDFDict) -> Self {
        let int = |key: &str, default: i64| {
            params
                .get(key)
                .and_then(|v| v.as_int().ok())
                .unwrap_or(default)
        };
        Self {
            predictor: int("Predictor", 1),
            colors: int("Colors", 1).clamp(1, 32) as usize,
            bits_per_component: int("BitsPerComponent", 8).clamp(1, 16) as usize,
            columns: int("Columns", 1).max(1) as usize,
        }
    }

    /// Bytes per row, excluding the PNG filter-type byte.
    fn row_bytes(&self) -> Result<usize> {
        self.colors
            .checked_mul(self.columns)
            .and_then(|n| n.checked_mul(self.bits_per_component))
            .map(|bits| bits.div_ceil(8))
            .filter(|&n| n <= MAX_ROW_BYTES)
            .ok_or_else(|| {
                PdfError::DecodeError(format!(
                    "predictor row too large: {} colors x {} columns x {} bits",
                    self.colors, self.columns, self.bits_per_component
                ))
            })
    }

    fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }
}

/// Undo the predictor described by `params`. Predictor 1 is a no-op.
pub fn apply_predictor(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data),
        2 => tiff_predictor(data, params),
        10..=15 => png_predictor(&data, params),
        other => Err(PdfError::DecodeError(format!("unsupported predictor {other}"))),
    }
}

fn tiff_predictor(mut data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(PdfError::DecodeError(format!(
            "TIFF predictor with {} bits per component",
            params.bits_per_component
        )));
    }
    let row_bytes = params.row_bytes()?;
    let bpp = params.bytes_per_pixel();
    for row in data.chunks_mut(row_bytes) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(data)
}

/// PNG prediction adds a filter-type byte at the start of each row.
fn png_predictor(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>> {
    let row_bytes = params.row_bytes()?;
    let bpp = params.bytes_per_pixel();
    let row_size = row_bytes + 1;
    if row_size > data.len() {
        return Ok(Vec::new());
    }

    let mut result = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];
    let mut current_row = vec![0u8; row_bytes];

    for chunk in data.chunks(row_size) {
        if chunk.len() < row_size {
            break;
        }
        let filter_type = chunk[0];
        let row_data = &chunk[1..];

        for i in 0..row_bytes {
            let left = if i >= bpp { current_row[i - bpp] } else { 0 };
            let above = prev_row[i];
            let upper_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
            let predicted = match filter_type {
                1 => left,
                2 => above,
                3 => ((u16::from(left) + u16::from(above)) / 2) as u8,
                4 => paeth_predictor(left, above, upper_left),
                _ => 0,
            };
            current_row[i] = row_data[i].wrapping_add(predicted);
        }

        result.extend_from_slice(&current_row);
        std::mem::swap(&mut prev_row, &mut current_row);
    }

    Ok(result)
}

const fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i32;
    let b = above as i32;
    let c = upper_left as i32;
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(columns: usize) -> PredictorParams {
        PredictorParams {
            predictor: 12,
            columns,
            ..PredictorParams::default()
        }
    }

    #[test]
    fn png_up_filter() {
        let data = [2, 1, 2, 3, 2, 1, 1, 1];
        assert_eq!(png_predictor(&data, &params(3)).unwrap(), vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn png_sub_filter() {
        let data = [1, 5, 1, 1];
        assert_eq!(png_predictor(&data, &params(3)).unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn tiff_horizontal_differencing() {
        let p = PredictorParams {
            predictor: 2,
            columns: 3,
            ..PredictorParams::default()
        };
        assert_eq!(apply_predictor(vec![10, 1, 1], &p).unwrap(), vec![10, 11, 12]);
    }

    #[test]
    fn oversized_rows_are_rejected() {
        let huge = params(1 << 61);
        assert!(matches!(
            apply_predictor(vec![2, 0, 0, 0], &huge),
            Err(PdfError::DecodeError(_))
        ));
        let wide = PredictorParams {
            predictor: 2,
            colors: 32,
            bits_per_component: 8,
            columns: 1 << 40,
        };
        assert!(apply_predictor(vec![0; 8], &wide).is_err());
    }

    #[test]
    fn row_longer_than_data_yields_nothing() {
        assert!(png_predictor(&[2, 1, 2], &params(8)).unwrap().is_empty());
    }
}
