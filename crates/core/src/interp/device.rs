//! Device callbacks driven by the interpreter.
//!
//! A device receives the drawing side effects of a content stream: painted
//! paths, clips, text, images and marked-content brackets. All methods have
//! no-op defaults so a device only implements what it needs.

use crate::model::objects::{PDFDict, PDFStream};
use crate::model::state::{Color, PDFGraphicState, PDFTextState};
use crate::parser::InlineImage;
use crate::utils::{Matrix, Rect};

/// Sequence of text elements: positioning adjustments or character codes.
pub type PDFTextSeq = Vec<PDFTextSeqItem>;

#[derive(Debug, Clone, PartialEq)]
pub enum PDFTextSeqItem {
    /// Adjustment in thousandths of text space, subtracted from the advance.
    Number(f64),
    /// Character codes
    Bytes(Vec<u8>),
}

/// Path segment in device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Move to point (x, y)
    MoveTo(f64, f64),
    /// Line to point (x, y)
    LineTo(f64, f64),
    /// Cubic bezier curve (x1, y1, x2, y2, x3, y3)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close path
    ClosePath,
}

impl PathSegment {
    /// End point of the segment, if it has one.
    pub const fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            Self::MoveTo(x, y) | Self::LineTo(x, y) | Self::CurveTo(_, _, _, _, x, y) => {
                Some((x, y))
            }
            Self::ClosePath => None,
        }
    }
}

/// Interface for consumers of interpreted content.
pub trait PDFDevice {
    /// Begin a marked content sequence (`BMC`/`BDC`).
    fn begin_tag(&mut self, _tag: &str, _props: Option<&PDFDict>) {}

    /// End a marked content sequence (`EMC`).
    fn end_tag(&mut self) {}

    /// Marked content point (`MP`/`DP`).
    fn do_tag(&mut self, _tag: &str, _props: Option<&PDFDict>) {}

    /// Begin a Form XObject.
    fn begin_figure(&mut self, _name: &str, _bbox: Rect, _matrix: Matrix) {}

    /// End a Form XObject.
    fn end_figure(&mut self, _name: &str) {}

    /// A segment was appended to the current path.
    fn append_path(&mut self, _segment: &PathSegment) {}

    /// Paint the current path.
    fn paint_path(
        &mut self,
        _graphicstate: &PDFGraphicState,
        _stroke: bool,
        _fill: bool,
        _evenodd: bool,
        _path: &[PathSegment],
    ) {
    }

    /// Intersect the clip with the current path.
    fn clip_path(&mut self, _graphicstate: &PDFGraphicState, _evenodd: bool, _path: &[PathSegment]) {
    }

    /// Render an image XObject.
    fn render_image(&mut self, _name: &str, _stream: &PDFStream, _graphicstate: &PDFGraphicState) {}

    /// Render an inline image.
    fn render_inline_image(&mut self, _image: &InlineImage, _graphicstate: &PDFGraphicState) {}

    /// Paint a shading (`sh`).
    fn shading_fill(&mut self, _name: &str, _graphicstate: &PDFGraphicState) {}

    /// Render a text string with the text state in effect before it is shown.
    fn render_string(
        &mut self,
        _textstate: &PDFTextState,
        _seq: &PDFTextSeq,
        _graphicstate: &PDFGraphicState,
    ) {
    }
}

/// A device that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl PDFDevice for NullDevice {}

/// One recorded device callback.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    BeginTag {
        tag: String,
        props: Option<PDFDict>,
    },
    EndTag,
    Tag {
        tag: String,
        props: Option<PDFDict>,
    },
    BeginFigure {
        name: String,
        bbox: Rect,
        matrix: Matrix,
    },
    EndFigure {
        name: String,
    },
    Paint {
        stroke: bool,
        fill: bool,
        evenodd: bool,
        path: Vec<PathSegment>,
        stroking_color: Color,
        non_stroking_color: Color,
        line_width: f64,
    },
    Clip {
        evenodd: bool,
        path: Vec<PathSegment>,
    },
    Image {
        name: String,
        ctm: Matrix,
    },
    InlineImage {
        data_len: usize,
        ctm: Matrix,
    },
    Shading {
        name: String,
    },
    Text {
        text: String,
        fontname: Option<String>,
        fontsize: f64,
        matrix: Matrix,
    },
}

/// Device that records every callback, for inspection and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingDevice {
    pub events: Vec<DeviceEvent>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint events only.
    pub fn paints(&self) -> impl Iterator<Item = &DeviceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, DeviceEvent::Paint { .. }))
    }

    /// Concatenated text of all `Text` events.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PDFDevice for RecordingDevice {
    fn begin_tag(&mut self, tag: &str, props: Option<&PDFDict>) {
        self.events.push(DeviceEvent::BeginTag {
            tag: tag.to_string(),
            props: props.cloned(),
        });
    }

    fn end_tag(&mut self) {
        self.events.push(DeviceEvent::EndTag);
    }

    fn do_tag(&mut self, tag: &str, props: Option<&PDFDict>) {
        self.events.push(DeviceEvent::Tag {
            tag: tag.to_string(),
            props: props.cloned(),
        });
    }

    fn begin_figure(&mut self, name: &str, bbox: Rect, matrix: Matrix) {
        self.events.push(DeviceEvent::BeginFigure {
            name: name.to_string(),
            bbox,
            matrix,
        });
    }

    fn end_figure(&mut self, name: &str) {
        self.events.push(DeviceEvent::EndFigure {
            name: name.to_string(),
        });
    }

    fn paint_path(
        &mut self,
        graphicstate: &PDFGraphicState,
        stroke: bool,
        fill: bool,
        evenodd: bool,
        path: &[PathSegment],
    ) {
        self.events.push(DeviceEvent::Paint {
            stroke,
            fill,
            evenodd,
            path: path.to_vec(),
            stroking_color: graphicstate.scolor.clone(),
            non_stroking_color: graphicstate.ncolor.clone(),
            line_width: graphicstate.linewidth,
        });
    }

    fn clip_path(&mut self, _graphicstate: &PDFGraphicState, evenodd: bool, path: &[PathSegment]) {
        self.events.push(DeviceEvent::Clip {
            evenodd,
            path: path.to_vec(),
        });
    }

    fn render_image(&mut self, name: &str, _stream: &PDFStream, graphicstate: &PDFGraphicState) {
        self.events.push(DeviceEvent::Image {
            name: name.to_string(),
            ctm: graphicstate.ctm,
        });
    }

    fn render_inline_image(&mut self, image: &InlineImage, graphicstate: &PDFGraphicState) {
        self.events.push(DeviceEvent::InlineImage {
            data_len: image.data.len(),
            ctm: graphicstate.ctm,
        });
    }

    fn shading_fill(&mut self, name: &str, _graphicstate: &PDFGraphicState) {
        self.events.push(DeviceEvent::Shading {
            name: name.to_string(),
        });
    }

    fn render_string(
        &mut self,
        textstate: &PDFTextState,
        seq: &PDFTextSeq,
        _graphicstate: &PDFGraphicState,
    ) {
        let text = seq
            .iter()
            .filter_map(|item| match item {
                PDFTextSeqItem::Bytes(codes) => Some(match &textstate.font {
                    Some(font) => font.decode(codes),
                    None => String::from_utf8_lossy(codes).into_owned(),
                }),
                PDFTextSeqItem::Number(_) => None,
            })
            .collect();
        self.events.push(DeviceEvent::Text {
            text,
            fontname: textstate.fontname.clone(),
            fontsize: textstate.fontsize,
            matrix: textstate.matrix,
        });
    }
}
