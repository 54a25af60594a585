//! XObject and shading operators.
//!
//! Handles: Do, sh
//!
//! - Do: Paint a named image or run a named form XObject
//! - sh: Paint a named shading over the current clip
//!
//! A form runs between an implicit `q`/`Q`, with its `/Matrix` concatenated
//! and its `/BBox` as an extra clip. Nesting deeper than
//! [`InterpreterOptions::max_xobject_depth`] is skipped with a warning.
//!
//! [`InterpreterOptions::max_xobject_depth`]: crate::interp::InterpreterOptions

use crate::diagnostics::{Warning, WarningKind};
use crate::error::{PdfError, Result};
use crate::filter::{Buffering, DecodeOptions, decode_stream};
use crate::interp::device::{PDFDevice, PathSegment};
use crate::interp::interpreter::ContentInterpreter;
use crate::interp::resources::PDFResources;
use crate::model::objects::{PDFObject, PDFStream};
use crate::model::state::ClipPath;
use crate::utils::{MATRIX_IDENTITY, Matrix, Rect, apply_matrix_pt, matrix_from_slice};

/// Parse a `/BBox` array.
pub(crate) fn parse_bbox(obj: Option<&PDFObject>) -> Option<Rect> {
    let values = obj?.as_numbers().ok()?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Some((*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// Parse a `/Matrix` array; identity when absent or malformed.
pub(crate) fn parse_matrix(obj: Option<&PDFObject>) -> Matrix {
    obj.and_then(|o| o.as_numbers().ok())
        .and_then(|values| matrix_from_slice(&values))
        .unwrap_or(MATRIX_IDENTITY)
}

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    // ========================================================================
    // XObject Operators
    // ========================================================================

    /// Do - Paint an image or run a form XObject.
    ///
    /// XObjects of other subtypes (e.g. PostScript) are ignored.
    ///
    /// PDF operator: `Do`
    pub fn do_Do(&mut self, xobjid: &str) -> Result<()> {
        let xobj = self
            .lookup()
            .xobject(xobjid)
            .cloned()
            .ok_or_else(|| PdfError::KeyError(format!("XObject {xobjid}")))?;
        match xobj.get("Subtype").and_then(|s| s.as_name().ok()) {
            Some("Image") => {
                self.device
                    .render_image(xobjid, &xobj, self.machine.state());
            }
            Some("Form") => self.run_form(xobjid, &xobj),
            _ => {}
        }
        Ok(())
    }

    fn run_form(&mut self, xobjid: &str, form: &PDFStream) {
        if self.depth >= self.options.max_xobject_depth {
            self.warn(
                Warning::new(
                    WarningKind::RecursionLimit,
                    format!(
                        "form {xobjid} nested deeper than {}",
                        self.options.max_xobject_depth
                    ),
                )
                .operator("Do"),
            );
            return;
        }
        let content = match decode_stream(
            form,
            &self.filters,
            &DecodeOptions::default(),
            Buffering::InMemory,
        )
        .and_then(|decoded| decoded.read_to_vec())
        {
            Ok(content) => content,
            Err(err) => {
                self.warn(
                    Warning::new(WarningKind::XObjectDecode, format!("form {xobjid}: {err}"))
                        .operator("Do"),
                );
                return;
            }
        };
        let Some((x0, y0, x1, y1)) = parse_bbox(form.get("BBox")) else {
            self.warn(
                Warning::new(WarningKind::XObjectDecode, format!("form {xobjid} has no /BBox"))
                    .operator("Do"),
            );
            return;
        };
        let matrix = parse_matrix(form.get("Matrix"));
        let resources = form
            .get("Resources")
            .and_then(|r| r.as_dict().ok())
            .map(PDFResources::from_dict);

        let saved_path = std::mem::take(&mut self.curpath);
        let saved_point = self.current_point.take();
        let saved_clip = self.pending_clip.take();
        let was_in_text = self.machine.in_text_object();
        let entry_depth = self.machine.depth();

        // The implicit q/cm/Q are not operators of the content; no warnings.
        let _ = self.machine.save();
        let _ = self.machine.concat(matrix);
        let ctm = self.machine.ctm();
        self.device.begin_figure(xobjid, (x0, y0, x1, y1), ctm);
        let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1)].map(|point| apply_matrix_pt(ctm, point));
        let path = vec![
            PathSegment::MoveTo(corners[0].0, corners[0].1),
            PathSegment::LineTo(corners[1].0, corners[1].1),
            PathSegment::LineTo(corners[2].0, corners[2].1),
            PathSegment::LineTo(corners[3].0, corners[3].1),
            PathSegment::ClosePath,
        ];
        self.device.clip_path(self.machine.state(), false, &path);
        self.machine
            .state_mut()
            .clip
            .push(ClipPath { path, evenodd: false });

        self.run_nested(&content, resources);

        if !was_in_text && self.machine.in_text_object() {
            self.warn(
                Warning::new(
                    WarningKind::UnclosedTextObject,
                    format!("form {xobjid} ended inside a text object"),
                )
                .operator("ET"),
            );
            let _ = self.machine.end_text();
        }
        // Unbalanced q inside the form are closed along with the implicit one.
        while self.machine.depth() > entry_depth {
            let _ = self.machine.restore();
        }
        self.device.end_figure(xobjid);
        self.curpath = saved_path;
        self.current_point = saved_point;
        self.pending_clip = saved_clip;
    }

    /// sh - Paint a shading resource.
    ///
    /// PDF operator: `sh`
    pub fn do_sh(&mut self, name: &str) -> Result<()> {
        if !self.lookup().has_shading(name) {
            return Err(PdfError::KeyError(format!("Shading {name}")));
        }
        self.device.shading_fill(name, self.machine.state());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::device::{DeviceEvent, RecordingDevice};
    use crate::interp::interpreter::InterpreterOptions;
    use crate::interp::resources::ResourceKind;
    use crate::model::objects::PDFDict;

    fn ints(values: &[i64]) -> PDFObject {
        PDFObject::Array(values.iter().copied().map(PDFObject::Int).collect())
    }

    fn form(content: &[u8], resources: Option<PDFDict>) -> PDFObject {
        let mut attrs = PDFDict::new();
        attrs.insert("Subtype".into(), PDFObject::name("Form"));
        attrs.insert("BBox".into(), ints(&[0, 0, 10, 10]));
        attrs.insert("Matrix".into(), ints(&[2, 0, 0, 2, 0, 0]));
        if let Some(resources) = resources {
            attrs.insert("Resources".into(), PDFObject::Dict(resources));
        }
        PDFObject::Stream(Box::new(PDFStream::new(attrs, content.to_vec())))
    }

    #[test]
    fn form_runs_with_matrix_clip_and_restore() {
        let mut resources = PDFResources::new();
        resources.insert(ResourceKind::XObject, "Fm1", form(b"q 1 w 0 0 m 5 5 l S", None));
        let mut device = RecordingDevice::new();
        let summary = {
            let mut interp = ContentInterpreter::new(&mut device, &resources);
            let summary = interp.execute(b"3 w /Fm1 Do");
            let state = interp.machine().state();
            assert_eq!(state.linewidth, 3.0);
            assert!(state.clip.is_empty());
            assert_eq!(interp.machine().depth(), 0);
            summary
        };
        assert!(!summary.has_warnings());
        assert!(matches!(&device.events[0], DeviceEvent::BeginFigure { name, .. } if name == "Fm1"));
        assert!(matches!(&device.events[1], DeviceEvent::Clip { path, .. }
            if path[2] == PathSegment::LineTo(20.0, 20.0)));
        let paint = device.paints().next();
        assert!(matches!(paint, Some(DeviceEvent::Paint { path, line_width, .. })
            if path[1] == PathSegment::LineTo(10.0, 10.0) && *line_width == 1.0));
        assert!(matches!(device.events.last(), Some(DeviceEvent::EndFigure { .. })));
    }

    #[test]
    fn nesting_beyond_limit_is_skipped() {
        let mut inner_res = PDFDict::new();
        let mut xobjects = PDFDict::new();
        xobjects.insert("Inner".into(), form(b"0 0 m 1 1 l S", None));
        inner_res.insert("XObject".into(), PDFObject::Dict(xobjects));

        let mut resources = PDFResources::new();
        resources.insert(ResourceKind::XObject, "Outer", form(b"/Inner Do", Some(inner_res)));
        let mut device = RecordingDevice::new();
        let options = InterpreterOptions::default().with_max_xobject_depth(1);
        let summary =
            ContentInterpreter::with_options(&mut device, &resources, options).execute(b"/Outer Do");
        assert_eq!(summary.warnings_of(WarningKind::RecursionLimit).count(), 1);
        assert_eq!(device.paints().count(), 0);
    }

    #[test]
    fn form_resources_shadow_page_resources() {
        let mut form_res = PDFDict::new();
        let mut xobjects = PDFDict::new();
        xobjects.insert("Inner".into(), form(b"0 0 m 1 1 l S", None));
        form_res.insert("XObject".into(), PDFObject::Dict(xobjects));

        let mut resources = PDFResources::new();
        resources.insert(ResourceKind::XObject, "Outer", form(b"/Inner Do", Some(form_res)));
        let mut device = RecordingDevice::new();
        let summary = ContentInterpreter::new(&mut device, &resources).execute(b"/Outer Do /Inner Do");
        assert_eq!(device.paints().count(), 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.warnings[0].kind, WarningKind::MissingResource);
    }

    #[test]
    fn undecodable_form_is_reported() {
        let mut attrs = PDFDict::new();
        attrs.insert("Subtype".into(), PDFObject::name("Form"));
        attrs.insert("Filter".into(), PDFObject::name("FlateDecode"));
        let stream = PDFStream::new(attrs, b"not deflate".to_vec());
        let mut resources = PDFResources::new();
        resources.insert(ResourceKind::XObject, "Bad", PDFObject::Stream(Box::new(stream)));
        let mut device = RecordingDevice::new();
        let summary = ContentInterpreter::new(&mut device, &resources).execute(b"/Bad Do 0 0 m");
        assert_eq!(summary.warnings_of(WarningKind::XObjectDecode).count(), 1);
        assert_eq!(summary.operations, 2);
        assert!(device.events.is_empty());
    }

    #[test]
    fn images_and_shadings_reach_the_device() {
        let mut attrs = PDFDict::new();
        attrs.insert("Subtype".into(), PDFObject::name("Image"));
        let mut resources = PDFResources::new();
        resources.insert(
            ResourceKind::XObject,
            "Im1",
            PDFObject::Stream(Box::new(PDFStream::new(attrs, vec![0u8]))),
        );
        resources.insert(ResourceKind::Shading, "Sh1", PDFObject::Dict(PDFDict::new()));
        let mut device = RecordingDevice::new();
        let summary = ContentInterpreter::new(&mut device, &resources)
            .execute(b"q 5 0 0 5 1 1 cm /Im1 Do Q /Sh1 sh /Sh2 sh");
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            device.events,
            vec![
                DeviceEvent::Image {
                    name: "Im1".into(),
                    ctm: (5.0, 0.0, 0.0, 5.0, 1.0, 1.0),
                },
                DeviceEvent::Shading { name: "Sh1".into() },
            ]
        );
    }
}
