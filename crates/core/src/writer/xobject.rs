//! XObjects, inline images, shadings, marked content and comments.
//!
//! Handles: Do, BI/ID/EI, sh, BMC, BDC, EMC, `%` comments
//!
//! Images are drawn inside their own `q`/`Q` pair with a `cm` that maps the
//! unit square onto the target rectangle.

use super::ContentStreamWriter;
use crate::error::{PdfError, Result};
use crate::interp::resources::{ResourceAllocator, ResourceKind};
use crate::model::objects::{PDFDict, PDFObject, PDFStream};
use crate::parser::InlineImage;
use crate::utils::Matrix;
use std::io::Write;

impl<W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, W, R> {
    fn add_xobject(&mut self, stream: &PDFStream, prefix: &str) -> Result<String> {
        self.resources.add_resource(
            ResourceKind::XObject,
            PDFObject::Stream(Box::new(stream.clone())),
            Some(prefix),
        )
    }

    /// Draw an image XObject scaled to `width` x `height` at (`x`, `y`).
    ///
    /// PDF operators: `q`, `cm`, `Do`, `Q`
    pub fn draw_image(
        &mut self,
        image: &PDFStream,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.draw_image_with_matrix(image, (width, 0.0, 0.0, height, x, y))
    }

    /// Draw an image XObject with an arbitrary placement matrix.
    pub fn draw_image_with_matrix(&mut self, image: &PDFStream, matrix: Matrix) -> Result<()> {
        self.machine.require_no_text("drawImage")?;
        let (a, b, c, d, e, f) = matrix;
        let mut frag = self.fragment();
        frag.operator("q").numbers(&[a, b, c, d, e, f])?.operator("cm");
        let name = self.add_xobject(image, "Im")?;
        frag.name(&name).operator("Do").operator("Q");
        self.emit(&frag)
    }

    /// Draw an inline image scaled to `width` x `height` at (`x`, `y`).
    ///
    /// The image dictionary must carry `/W` and `/H`; its entries are written
    /// in order.
    ///
    /// PDF operators: `q`, `cm`, `BI`, `ID`, `EI`, `Q`
    pub fn draw_inline_image(
        &mut self,
        image: &InlineImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.machine.require_no_text("drawImage")?;
        for key in ["W", "H"] {
            let valid = image
                .dict
                .get(key)
                .or_else(|| image.dict.get(if key == "W" { "Width" } else { "Height" }))
                .and_then(|v| v.as_int().ok())
                .is_some_and(|n| n > 0);
            if !valid {
                return Err(PdfError::argument(format!(
                    "inline image needs a positive /{key}"
                )));
            }
        }
        let mut frag = self.fragment();
        frag.operator("q")
            .numbers(&[width, 0.0, 0.0, height, x, y])?
            .operator("cm")
            .raw(b"BI");
        for (key, value) in &image.dict {
            frag.raw(b"\n ").name(key).value(value)?;
        }
        frag.raw(b"\n")
            .operator("ID")
            .raw(&image.data)
            .raw(b"\n")
            .operator("EI")
            .operator("Q");
        self.emit(&frag)
    }

    /// Paint a form XObject with the current transformation.
    ///
    /// PDF operator: `Do`
    pub fn draw_form(&mut self, form: &PDFStream) -> Result<()> {
        self.machine.require_no_text("drawForm")?;
        let name = self.add_xobject(form, "Form")?;
        let mut frag = self.fragment();
        frag.name(&name).operator("Do");
        self.emit(&frag)
    }

    /// Fill the clip region with a shading.
    ///
    /// PDF operator: `sh`
    pub fn shading_fill(&mut self, shading: &PDFObject) -> Result<()> {
        self.machine.require_no_text("shadingFill")?;
        let name = self
            .resources
            .add_resource(ResourceKind::Shading, shading.clone(), None)?;
        let mut frag = self.fragment();
        frag.name(&name).operator("sh");
        self.emit(&frag)
    }

    /// PDF operator: `BMC`
    pub fn begin_marked_content(&mut self, tag: &str) -> Result<()> {
        let mut frag = self.fragment();
        frag.name(tag).operator("BMC");
        self.emit(&frag)
    }

    /// Begin marked content with a property list stored as a resource.
    ///
    /// PDF operator: `BDC`
    pub fn begin_marked_content_with_properties(
        &mut self,
        tag: &str,
        properties: &PDFDict,
    ) -> Result<()> {
        let name = self.resources.add_resource(
            ResourceKind::Properties,
            PDFObject::Dict(properties.clone()),
            None,
        )?;
        let mut frag = self.fragment();
        frag.name(tag).name(&name).operator("BDC");
        self.emit(&frag)
    }

    /// PDF operator: `EMC`
    pub fn end_marked_content(&mut self) -> Result<()> {
        let mut frag = self.fragment();
        frag.operator("EMC");
        self.emit(&frag)
    }

    /// Write a `%` comment line.
    pub fn add_comment(&mut self, comment: &str) -> Result<()> {
        if comment.contains(['\n', '\r']) {
            return Err(PdfError::argument("comment should not include a newline"));
        }
        let mut frag = self.fragment();
        frag.raw(b"%").raw(comment.as_bytes()).raw(b"\n");
        self.emit(&frag)
    }
}
