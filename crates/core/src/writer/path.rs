//! Path construction and painting operators.
//!
//! Handles: m, l, c, v, y, re, h, S, s, f, f*, B, B*, b, b*, W n, W* n
//!
//! None of these are allowed inside a text object. The shape helpers
//! (`fill_rect`, `draw_line`, `draw_polygon`, ...) write their whole operator
//! sequence as one fragment.

use super::{ContentStreamWriter, Fragment};
use crate::error::{PdfError, Result};
use crate::interp::resources::ResourceAllocator;
use crate::utils::Point;
use std::io::Write;

/// Rule deciding which areas a fill or clip covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl WindingRule {
    const fn fill_operator(self) -> &'static str {
        match self {
            Self::NonZero => "f",
            Self::EvenOdd => "f*",
        }
    }

    const fn clip_operator(self) -> &'static str {
        match self {
            Self::NonZero => "W",
            Self::EvenOdd => "W*",
        }
    }
}

fn polygon(frag: &mut Fragment, points: &[Point]) -> Result<()> {
    let Some(((x0, y0), rest)) = points.split_first() else {
        return Err(PdfError::argument("Error: a polygon needs at least one point"));
    };
    frag.number(*x0)?.number(*y0)?.operator("m");
    for &(x, y) in rest {
        frag.number(x)?.number(y)?.operator("l");
    }
    frag.operator("h");
    Ok(())
}

impl<W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, W, R> {
    /// Write `operands op` after checking that no text object is open.
    fn path_op(&mut self, what: &str, operands: &[f64], op: &str) -> Result<()> {
        self.machine.require_no_text(what)?;
        let mut frag = self.fragment();
        frag.numbers(operands)?.operator(op);
        self.emit(&frag)
    }

    /// PDF operator: `m`
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.path_op("moveTo", &[x, y], "m")
    }

    /// PDF operator: `l`
    pub fn line_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.path_op("lineTo", &[x, y], "l")
    }

    /// Cubic Bézier curve with two control points.
    ///
    /// PDF operator: `c`
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Result<()> {
        self.path_op("curveTo", &[x1, y1, x2, y2, x3, y3], "c")
    }

    /// Curve whose first control point is the current point.
    ///
    /// PDF operator: `v`
    pub fn curve_to2(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) -> Result<()> {
        self.path_op("curveTo2", &[x2, y2, x3, y3], "v")
    }

    /// Curve whose second control point is the end point.
    ///
    /// PDF operator: `y`
    pub fn curve_to1(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) -> Result<()> {
        self.path_op("curveTo1", &[x1, y1, x3, y3], "y")
    }

    /// Append a rectangle in user space.
    ///
    /// PDF operator: `re`
    pub fn add_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.path_op("addRect", &[x, y, width, height], "re")
    }

    /// Append a closed polygon: one `m`, an `l` per further point, then `h`.
    pub fn add_polygon(&mut self, points: &[Point]) -> Result<()> {
        self.machine.require_no_text("addPolygon")?;
        let mut frag = self.fragment();
        polygon(&mut frag, points)?;
        self.emit(&frag)
    }

    /// Stroke a closed polygon.
    pub fn draw_polygon(&mut self, points: &[Point]) -> Result<()> {
        self.machine.require_no_text("drawPolygon")?;
        let mut frag = self.fragment();
        polygon(&mut frag, points)?;
        frag.operator("S");
        self.emit(&frag)
    }

    /// Fill a closed polygon using the nonzero winding rule.
    pub fn fill_polygon(&mut self, points: &[Point]) -> Result<()> {
        self.machine.require_no_text("fillPolygon")?;
        let mut frag = self.fragment();
        polygon(&mut frag, points)?;
        frag.operator("f");
        self.emit(&frag)
    }

    /// Fill a rectangle with the non-stroking color.
    ///
    /// PDF operators: `re f`
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.machine.require_no_text("fillRect")?;
        let mut frag = self.fragment();
        frag.numbers(&[x, y, width, height])?
            .operator("re")
            .operator("f");
        self.emit(&frag)
    }

    /// Append a line segment as a new subpath.
    ///
    /// PDF operators: `m l`
    pub fn add_line(&mut self, x_start: f64, y_start: f64, x_end: f64, y_end: f64) -> Result<()> {
        self.machine.require_no_text("addLine")?;
        let mut frag = self.fragment();
        frag.number(x_start)?.number(y_start)?.operator("m");
        frag.number(x_end)?.number(y_end)?.operator("l");
        self.emit(&frag)
    }

    /// Stroke a line with the current stroking color and line width.
    ///
    /// PDF operators: `m l S`
    pub fn draw_line(&mut self, x_start: f64, y_start: f64, x_end: f64, y_end: f64) -> Result<()> {
        self.machine.require_no_text("drawLine")?;
        let mut frag = self.fragment();
        frag.number(x_start)?.number(y_start)?.operator("m");
        frag.number(x_end)?.number(y_end)?.operator("l").operator("S");
        self.emit(&frag)
    }

    /// PDF operator: `h`
    pub fn close_path(&mut self) -> Result<()> {
        self.path_op("closePath", &[], "h")
    }

    /// PDF operator: `S`
    pub fn stroke(&mut self) -> Result<()> {
        self.path_op("stroke", &[], "S")
    }

    /// PDF operator: `s`
    pub fn close_and_stroke(&mut self) -> Result<()> {
        self.path_op("closeAndStroke", &[], "s")
    }

    /// Fill using the nonzero winding rule.
    ///
    /// PDF operator: `f`
    pub fn fill(&mut self) -> Result<()> {
        self.path_op("fill", &[], "f")
    }

    /// PDF operator: `f*`
    pub fn fill_even_odd(&mut self) -> Result<()> {
        self.path_op("fillEvenOdd", &[], "f*")
    }

    /// PDF operator: `B`
    pub fn fill_and_stroke(&mut self) -> Result<()> {
        self.path_op("fillAndStroke", &[], "B")
    }

    /// PDF operator: `B*`
    pub fn fill_and_stroke_even_odd(&mut self) -> Result<()> {
        self.path_op("fillAndStrokeEvenOdd", &[], "B*")
    }

    /// PDF operator: `b`
    pub fn close_and_fill_and_stroke(&mut self) -> Result<()> {
        self.path_op("closeAndFillAndStroke", &[], "b")
    }

    /// PDF operator: `b*`
    pub fn close_and_fill_and_stroke_even_odd(&mut self) -> Result<()> {
        self.path_op("closeAndFillAndStrokeEvenOdd", &[], "b*")
    }

    /// Intersect the clip with the current path (nonzero) and end the path.
    ///
    /// PDF operators: `W n`
    pub fn clip(&mut self) -> Result<()> {
        self.clip_with_rule(WindingRule::NonZero)
    }

    /// PDF operators: `W* n`
    pub fn clip_even_odd(&mut self) -> Result<()> {
        self.clip_with_rule(WindingRule::EvenOdd)
    }

    /// Fill the current path with the given winding rule.
    ///
    /// PDF operator: `f` or `f*`
    pub fn fill_with_rule(&mut self, rule: WindingRule) -> Result<()> {
        self.path_op("fill", &[], rule.fill_operator())
    }

    /// Clip with the given winding rule and end the path.
    ///
    /// PDF operators: `W n` or `W* n`
    pub fn clip_with_rule(&mut self, rule: WindingRule) -> Result<()> {
        self.machine.require_no_text("clipPath")?;
        let mut frag = self.fragment();
        frag.operator(rule.clip_operator()).operator("n");
        self.emit(&frag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::resources::PDFResources;

    #[test]
    fn path_operators() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.move_to(1.0, 2.0).unwrap();
        writer.curve_to(1.0, 2.0, 3.5, 4.0, 5.0, 6.0).unwrap();
        writer.curve_to2(1.0, 1.0, 2.0, 2.0).unwrap();
        writer.curve_to1(1.0, 1.0, 2.0, 2.0).unwrap();
        writer.close_and_fill_and_stroke_even_odd().unwrap();
        writer.add_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        writer.clip_even_odd().unwrap();
        let out = String::from_utf8(writer.close().unwrap()).unwrap();
        assert_eq!(
            out,
            "1 2 m\n1 2 3.5 4 5 6 c\n1 1 2 2 v\n1 1 2 2 y\nb*\n0 0 10 10 re\nW*\nn\n"
        );
    }

    #[test]
    fn polygon_is_closed() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer
            .add_polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)])
            .unwrap();
        assert!(matches!(writer.add_polygon(&[]), Err(PdfError::Argument(_))));
        assert_eq!(writer.get_ref(), b"0 0 m\n10 0 l\n5 8 l\nh\n");
    }

    #[test]
    fn drawing_inside_text_object_fails() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.begin_text().unwrap();
        assert!(matches!(writer.add_rect(0.0, 0.0, 1.0, 1.0), Err(PdfError::State(_))));
        assert!(matches!(writer.fill(), Err(PdfError::State(_))));
        assert_eq!(writer.get_ref(), b"BT\n");
    }

    #[test]
    fn non_finite_coordinates_write_nothing() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        assert!(matches!(
            writer.line_to(f64::NAN, 0.0),
            Err(PdfError::Argument(_))
        ));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn shape_helpers() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.fill_rect(1.0, 2.0, 3.0, 4.0).unwrap();
        writer.draw_line(0.0, 0.0, 5.5, 5.0).unwrap();
        writer.add_line(1.0, 1.0, 2.0, 2.0).unwrap();
        writer.stroke().unwrap();
        writer.draw_polygon(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)]).unwrap();
        writer.fill_polygon(&[(0.0, 0.0), (1.0, 1.0)]).unwrap();
        let out = String::from_utf8(writer.close().unwrap()).unwrap();
        assert_eq!(
            out,
            "1 2 3 4 re\nf\n0 0 m\n5.5 5 l\nS\n1 1 m\n2 2 l\nS\n\
             0 0 m\n4 0 l\n2 3 l\nh\nS\n0 0 m\n1 1 l\nh\nf\n"
        );
    }

    #[test]
    fn winding_rule_forms() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.fill_with_rule(WindingRule::NonZero).unwrap();
        writer.fill_with_rule(WindingRule::EvenOdd).unwrap();
        writer.clip_with_rule(WindingRule::NonZero).unwrap();
        writer.clip_with_rule(WindingRule::EvenOdd).unwrap();
        assert_eq!(writer.get_ref(), b"f\nf*\nW\nn\nW*\nn\n");
    }

    #[test]
    fn shape_helpers_are_all_or_nothing() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        assert!(matches!(
            writer.draw_line(0.0, 0.0, f64::INFINITY, 1.0),
            Err(PdfError::Argument(_))
        ));
        assert!(matches!(writer.fill_polygon(&[]), Err(PdfError::Argument(_))));
        writer.begin_text().unwrap();
        assert!(matches!(writer.fill_rect(0.0, 0.0, 1.0, 1.0), Err(PdfError::State(_))));
        assert!(matches!(
            writer.clip_with_rule(WindingRule::EvenOdd),
            Err(PdfError::State(_))
        ));
        assert_eq!(writer.get_ref(), b"BT\n");
    }
}
