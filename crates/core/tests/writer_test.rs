//! Content stream writer: emitted operator text, mode and argument checks,
//! and round trips through the interpreter.

use contentstream_core::PdfError;
use contentstream_core::font::{PDFFont, StandardFont};
use contentstream_core::interp::{DeviceEvent, PDFResources, PathSegment, RecordingDevice, interpret};
use contentstream_core::writer::{ContentStreamWriter, TextElement};
use std::sync::Arc;

fn helvetica() -> Arc<dyn PDFFont> {
    Arc::new(StandardFont::new("Helvetica"))
}

fn written(build: impl FnOnce(&mut ContentStreamWriter<'_, Vec<u8>>)) -> String {
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    build(&mut writer);
    String::from_utf8(writer.close().unwrap()).unwrap()
}

// ============================================================================
// Emitted text
// ============================================================================

#[test]
fn test_page_content_snapshot() {
    let font = helvetica();
    let out = written(|w| {
        w.set_non_stroking_rgb_255(255, 0, 0).unwrap();
        w.add_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        w.fill().unwrap();
        w.begin_text().unwrap();
        w.set_font(&font, 12.0).unwrap();
        w.new_line_at_offset(72.0, 700.0).unwrap();
        w.show_text("Hello").unwrap();
        w.end_text().unwrap();
    });
    insta::assert_snapshot!(out.trim_end(), @r"
    1 0 0 rg
    0 0 10 10 re
    f
    BT
    /F1 12 Tf
    72 700 Td
    (Hello) Tj
    ET
    ");
}

#[test]
fn test_graphics_state_snapshot() {
    let out = written(|w| {
        w.save_graphics_state().unwrap();
        w.transform((1.0, 0.0, 0.0, 1.0, 0.5, 0.25)).unwrap();
        w.set_line_width(2.5).unwrap();
        w.set_stroking_gray(0.5).unwrap();
        w.move_to(0.0, 0.0).unwrap();
        w.curve_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0).unwrap();
        w.stroke().unwrap();
        w.restore_graphics_state().unwrap();
    });
    insta::assert_snapshot!(out.trim_end(), @r"
    q
    1 0 0 1 0.5 0.25 cm
    2.5 w
    0.5 G
    0 0 m
    1 2 3 4 5 6 c
    S
    Q
    ");
}

#[test]
fn test_positioned_text() {
    let font = helvetica();
    let out = written(|w| {
        w.begin_text().unwrap();
        w.set_font(&font, 10.0).unwrap();
        w.show_text_with_positioning(&[
            TextElement::Text("A"),
            TextElement::Adjust(-120.0),
            TextElement::Text("(B)"),
        ])
        .unwrap();
        w.end_text().unwrap();
    });
    assert_eq!(out, "BT\n/F1 10 Tf\n[(A)-120 (\\(B\\))] TJ\nET\n");
}

// ============================================================================
// Mode and argument checks
// ============================================================================

#[test]
fn test_nested_begin_text_is_state_error() {
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    writer.begin_text().unwrap();
    assert!(matches!(writer.begin_text(), Err(PdfError::State(_))));
    assert_eq!(writer.get_ref(), b"BT\n");
}

#[test]
fn test_show_text_without_font_is_state_error() {
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    writer.begin_text().unwrap();
    assert!(matches!(writer.show_text("x"), Err(PdfError::State(_))));
    assert_eq!(writer.get_ref(), b"BT\n");
}

#[test]
fn test_show_text_outside_text_object_is_state_error() {
    let font = helvetica();
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    writer.set_font(&font, 12.0).unwrap();
    assert!(matches!(writer.show_text("x"), Err(PdfError::State(_))));
}

#[test]
fn test_out_of_range_colors_write_nothing() {
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    assert!(matches!(
        writer.set_stroking_rgb(1.5, 0.0, 0.0),
        Err(PdfError::Argument(_))
    ));
    assert!(matches!(
        writer.set_non_stroking_gray_255(256),
        Err(PdfError::Argument(_))
    ));
    assert!(matches!(
        writer.set_stroking_cmyk(0.0, -0.1, 0.0, 0.0),
        Err(PdfError::Argument(_))
    ));
    assert!(writer.get_ref().is_empty());
    assert!(writer.machine().stroking_color_space().is_none());
}

#[test]
fn test_non_finite_number_writes_nothing() {
    let mut resources = PDFResources::new();
    let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
    assert!(writer.move_to(f64::NAN, 0.0).is_err());
    assert!(writer.line_to(0.0, f64::INFINITY).is_err());
    assert!(writer.get_ref().is_empty());
}

// ============================================================================
// Round trips through the interpreter
// ============================================================================

#[test]
fn test_rect_fill_round_trip() {
    let mut resources = PDFResources::new();
    let content = {
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.add_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        writer.fill().unwrap();
        writer.close().unwrap()
    };

    let mut device = RecordingDevice::new();
    let summary = interpret(&content, &mut device, &resources);
    assert!(!summary.has_warnings());

    let paints: Vec<_> = device.paints().collect();
    assert_eq!(paints.len(), 1);
    let DeviceEvent::Paint { path, fill, stroke, .. } = paints[0] else {
        panic!("not a paint event");
    };
    assert!(*fill);
    assert!(!*stroke);
    assert_eq!(
        path,
        &vec![
            PathSegment::MoveTo(0.0, 0.0),
            PathSegment::LineTo(10.0, 0.0),
            PathSegment::LineTo(10.0, 10.0),
            PathSegment::LineTo(0.0, 10.0),
            PathSegment::ClosePath,
        ]
    );
}

#[test]
fn test_text_round_trip() {
    let font = helvetica();
    let mut resources = PDFResources::new();
    let content = {
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.begin_text().unwrap();
        writer.set_font(&font, 12.0).unwrap();
        writer.new_line_at_offset(72.0, 700.0).unwrap();
        writer.show_text("Hello").unwrap();
        writer.end_text().unwrap();
        writer.close().unwrap()
    };

    let mut device = RecordingDevice::new();
    let summary = interpret(&content, &mut device, &resources);
    assert!(!summary.has_warnings());
    assert_eq!(device.text(), "Hello");
    let Some(DeviceEvent::Text { fontname, fontsize, matrix, .. }) = device
        .events
        .iter()
        .find(|e| matches!(e, DeviceEvent::Text { .. }))
    else {
        panic!("no text event");
    };
    assert_eq!(fontname.as_deref(), Some("F1"));
    assert_eq!(*fontsize, 12.0);
    assert_eq!((matrix.4, matrix.5), (72.0, 700.0));
}
