//! Path construction and painting operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n, W, W*
//!
//! Path construction:
//! - m: Move to
//! - l: Line to
//! - c, v, y: Bezier curves (cubic variants)
//! - h: Close subpath
//! - re: Rectangle shorthand
//!
//! Path painting:
//! - S/s: Stroke (s closes first)
//! - f/F/f*: Fill (F is legacy, f* uses even-odd rule)
//! - B/B*/b/b*: Fill then stroke
//! - n: End path without painting
//!
//! Clipping:
//! - W/W*: Mark the path as a clip (non-zero/even-odd), applied by the
//!   painting operator that ends it
//!
//! Coordinates are transformed by the CTM in effect when each segment is
//! appended, so the current path is kept in device space.

use crate::interp::device::{PDFDevice, PathSegment};
use crate::interp::interpreter::ContentInterpreter;
use crate::model::state::ClipPath;
use crate::utils::{apply_matrix_pt, rect_corners};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        apply_matrix_pt(self.machine.ctm(), (x, y))
    }

    fn push_segment(&mut self, segment: PathSegment) {
        if let Some(point) = segment.end_point() {
            self.current_point = Some(point);
        }
        self.device.append_path(&segment);
        self.curpath.push(segment);
    }

    // ========================================================================
    // Path Construction Operators
    // ========================================================================

    /// Begins a new subpath at the given point.
    ///
    /// PDF operator: `m`
    pub fn do_m(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_device(x, y);
        self.push_segment(PathSegment::MoveTo(x, y));
    }

    /// Appends a straight line segment from the current point.
    ///
    /// PDF operator: `l`
    pub fn do_l(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_device(x, y);
        self.push_segment(PathSegment::LineTo(x, y));
    }

    /// Appends a cubic Bezier curve to (x3, y3) with control points
    /// (x1, y1) and (x2, y2).
    ///
    /// PDF operator: `c`
    pub fn do_c(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x1, y1) = self.to_device(x1, y1);
        let (x2, y2) = self.to_device(x2, y2);
        let (x3, y3) = self.to_device(x3, y3);
        self.push_segment(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
    }

    /// Appends a cubic Bezier curve with the current point as first control point.
    ///
    /// PDF operator: `v`
    pub fn do_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x1, y1) = match self.current_point {
            Some(point) => point,
            None => self.to_device(0.0, 0.0),
        };
        let (x2, y2) = self.to_device(x2, y2);
        let (x3, y3) = self.to_device(x3, y3);
        self.push_segment(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
    }

    /// Appends a cubic Bezier curve with the endpoint as second control point.
    ///
    /// PDF operator: `y`
    pub fn do_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        let (x1, y1) = self.to_device(x1, y1);
        let (x3, y3) = self.to_device(x3, y3);
        self.push_segment(PathSegment::CurveTo(x1, y1, x3, y3, x3, y3));
    }

    /// Closes the current subpath. The current point returns to the start
    /// of the subpath.
    ///
    /// PDF operator: `h`
    pub fn do_h(&mut self) {
        let start = self.curpath.iter().rev().find_map(|segment| match segment {
            PathSegment::MoveTo(x, y) => Some((*x, *y)),
            _ => None,
        });
        self.push_segment(PathSegment::ClosePath);
        if start.is_some() {
            self.current_point = start;
        }
    }

    /// Appends a rectangle as a complete subpath.
    ///
    /// Each corner is transformed on its own, so a rotated or skewed CTM
    /// yields the exact device-space quadrilateral.
    ///
    /// PDF operator: `re`
    pub fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let [p0, p1, p2, p3] = rect_corners(x, y, w, h).map(|(px, py)| self.to_device(px, py));
        self.push_segment(PathSegment::MoveTo(p0.0, p0.1));
        self.push_segment(PathSegment::LineTo(p1.0, p1.1));
        self.push_segment(PathSegment::LineTo(p2.0, p2.1));
        self.push_segment(PathSegment::LineTo(p3.0, p3.1));
        self.push_segment(PathSegment::ClosePath);
        self.current_point = Some(p0);
    }

    // ========================================================================
    // Path Painting Operators
    // ========================================================================

    /// Paint (when `stroke` or `fill`), apply a pending clip, then clear the path.
    fn finish_path(&mut self, stroke: bool, fill: bool, evenodd: bool) {
        if stroke || fill {
            self.device.paint_path(
                self.machine.state(),
                stroke,
                fill,
                evenodd,
                &self.curpath,
            );
        }
        if let Some(clip_evenodd) = self.pending_clip.take() {
            let path = std::mem::take(&mut self.curpath);
            self.device
                .clip_path(self.machine.state(), clip_evenodd, &path);
            self.machine.state_mut().clip.push(ClipPath {
                path,
                evenodd: clip_evenodd,
            });
        }
        self.curpath.clear();
        self.current_point = None;
    }

    /// Strokes the current path.
    ///
    /// PDF operator: `S`
    pub fn do_S(&mut self) {
        self.finish_path(true, false, false);
    }

    /// Closes and strokes the current path.
    ///
    /// PDF operator: `s`
    pub fn do_s(&mut self) {
        self.do_h();
        self.do_S();
    }

    /// Fills the current path using the nonzero winding number rule.
    ///
    /// PDF operators: `f`, `F`
    pub fn do_f(&mut self) {
        self.finish_path(false, true, false);
    }

    /// PDF operator: `f*`
    pub fn do_f_star(&mut self) {
        self.finish_path(false, true, true);
    }

    /// Fills and strokes the current path using the nonzero winding number rule.
    ///
    /// PDF operator: `B`
    pub fn do_B(&mut self) {
        self.finish_path(true, true, false);
    }

    /// PDF operator: `B*`
    pub fn do_B_star(&mut self) {
        self.finish_path(true, true, true);
    }

    /// Closes, fills, and strokes the current path.
    ///
    /// PDF operator: `b`
    pub fn do_b(&mut self) {
        self.do_h();
        self.do_B();
    }

    /// PDF operator: `b*`
    pub fn do_b_star(&mut self) {
        self.do_h();
        self.do_B_star();
    }

    /// Ends the path without filling or stroking it; usually follows `W`.
    ///
    /// PDF operator: `n`
    pub fn do_n(&mut self) {
        self.finish_path(false, false, false);
    }

    // ========================================================================
    // Clipping Path Operators
    // ========================================================================

    /// Marks the current path as a clip using the nonzero winding rule.
    ///
    /// PDF operator: `W`
    pub fn do_W(&mut self) {
        self.pending_clip = Some(false);
    }

    /// PDF operator: `W*`
    pub fn do_W_star(&mut self) {
        self.pending_clip = Some(true);
    }
}

#[cfg(test)]
mod tests {
    use crate::interp::device::{DeviceEvent, PathSegment, RecordingDevice};
    use crate::interp::interpreter::ContentInterpreter;
    use crate::interp::resources::PDFResources;

    fn run(content: &[u8]) -> RecordingDevice {
        let resources = PDFResources::new();
        let mut device = RecordingDevice::new();
        ContentInterpreter::new(&mut device, &resources).execute(content);
        device
    }

    #[test]
    fn rect_corners_follow_rotated_ctm() {
        let device = run(b"0 1 -1 0 0 0 cm 0 0 10 5 re f");
        let Some(DeviceEvent::Paint { path, fill, .. }) = device.paints().next() else {
            panic!("no paint");
        };
        assert!(fill);
        assert_eq!(
            path,
            &vec![
                PathSegment::MoveTo(0.0, 0.0),
                PathSegment::LineTo(0.0, 10.0),
                PathSegment::LineTo(-5.0, 10.0),
                PathSegment::LineTo(-5.0, 0.0),
                PathSegment::ClosePath,
            ]
        );
    }

    #[test]
    fn v_uses_current_point_as_first_control() {
        let device = run(b"1 1 m 2 2 3 3 v S");
        let Some(DeviceEvent::Paint { path, .. }) = device.paints().next() else {
            panic!("no paint");
        };
        assert_eq!(path[1], PathSegment::CurveTo(1.0, 1.0, 2.0, 2.0, 3.0, 3.0));
    }

    #[test]
    fn clip_applies_at_path_end() {
        let device = run(b"0 0 5 5 re W* n 0 0 m 1 1 l b");
        let clips: Vec<_> = device
            .events
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Clip { .. }))
            .collect();
        assert_eq!(clips.len(), 1);
        assert!(matches!(clips[0], DeviceEvent::Clip { evenodd: true, path } if path.len() == 5));
        let paints: Vec<_> = device.paints().collect();
        assert_eq!(paints.len(), 1);
        assert!(matches!(
            paints[0],
            DeviceEvent::Paint { stroke: true, fill: true, evenodd: false, path, .. }
                if path.last() == Some(&PathSegment::ClosePath)
        ));
    }
}
