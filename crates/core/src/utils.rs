//! Geometry shared by the writer and the interpreter.
//!
//! Matrices follow the PDF layout `(a, b, c, d, e, f)` and map `(x, y)` to
//! `(ax + cy + e, bx + dy + f)`.

pub type Point = (f64, f64);

/// `(x0, y0, x1, y1)`
pub type Rect = (f64, f64, f64, f64);

pub type Matrix = (f64, f64, f64, f64, f64, f64);

pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Concatenation `m1 × m0`: points go through `m1`, then `m0`.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    let (e, f) = apply_matrix_pt(m0, (e1, f1));
    (
        a1 * a0 + b1 * c0,
        a1 * b0 + b1 * d0,
        c1 * a0 + d1 * c0,
        c1 * b0 + d1 * d0,
        e,
        f,
    )
}

/// `m` preceded by a translation of `offset`.
pub fn translate_matrix(m: Matrix, offset: Point) -> Matrix {
    let (a, b, c, d, _, _) = m;
    let (e, f) = apply_matrix_pt(m, offset);
    (a, b, c, d, e, f)
}

pub fn apply_matrix_pt(m: Matrix, (x, y): Point) -> Point {
    let (a, b, c, d, e, f) = m;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Corners of the rectangle at `(x, y)` with size `w` by `h`, counter-clockwise
/// from the origin corner.
pub fn rect_corners(x: f64, y: f64, w: f64, h: f64) -> [Point; 4] {
    [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
}

pub fn matrix_from_slice(values: &[f64]) -> Option<Matrix> {
    match *values {
        [a, b, c, d, e, f] => Some((a, b, c, d, e, f)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mult_applies_left_operand_first() {
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = (1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        assert_eq!(apply_matrix_pt(mult_matrix(scale, shift), (1.0, 1.0)), (12.0, 2.0));
        assert_eq!(apply_matrix_pt(mult_matrix(shift, scale), (1.0, 1.0)), (22.0, 2.0));
    }

    #[test]
    fn translate_moves_in_local_space() {
        let rot90 = (0.0, 1.0, -1.0, 0.0, 5.0, 5.0);
        assert_eq!(translate_matrix(rot90, (2.0, 0.0)), (0.0, 1.0, -1.0, 0.0, 5.0, 7.0));
        assert_eq!(matrix_from_slice(&[1.0, 2.0]), None);
    }
}
