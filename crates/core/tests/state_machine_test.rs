//! Graphics state machine: save/restore balance, mode rules and the
//! auxiliary color-space and font stacks.

use contentstream_core::PdfError;
use contentstream_core::font::{PDFFont, StandardFont};
use contentstream_core::model::{
    Color, FontBinding, GraphicsStateMachine, PDFColorSpace, StateWarning,
};
use std::sync::Arc;

fn binding(name: &str, size: f64) -> FontBinding {
    FontBinding {
        font: Arc::new(StandardFont::new("Helvetica")) as Arc<dyn PDFFont>,
        name: name.to_string(),
        size,
    }
}

// ============================================================================
// Save / restore
// ============================================================================

#[test]
fn test_n_saves_then_n_restores_restore_everything() {
    let mut machine = GraphicsStateMachine::new();
    machine.set_stroking_color_space(PDFColorSpace::device_rgb());
    machine.set_stroking_color(Color::Rgb(0.2, 0.4, 0.6));
    machine.set_font(binding("F1", 12.0));
    let ctm = machine.ctm();
    let scolor = machine.state().scolor.clone();

    for n in 1..=4 {
        for i in 0..n {
            assert!(machine.save().is_none());
            machine.concat((2.0, 0.0, 0.0, 2.0, i as f64, 0.0));
            machine.set_stroking_color_space(PDFColorSpace::device_cmyk());
            machine.set_stroking_color(Color::Cmyk(0.0, 0.0, 0.0, 1.0));
            machine.set_font(binding("F2", 8.0));
        }
        assert_eq!(machine.depth(), n);
        for _ in 0..n {
            assert!(machine.restore().is_none());
        }
        assert_eq!(machine.depth(), 0);
        assert_eq!(machine.ctm(), ctm);
        assert_eq!(machine.state().scolor, scolor);
        assert_eq!(
            machine.stroking_color_space(),
            Some(&PDFColorSpace::device_rgb())
        );
        let font = machine.font().unwrap();
        assert_eq!(font.name, "F1");
        assert_eq!(font.size, 12.0);
        assert_eq!(machine.font_stack_depth(), 1);
    }
}

#[test]
fn test_restore_without_save_is_reported_and_harmless() {
    let mut machine = GraphicsStateMachine::new();
    machine.state_mut().linewidth = 4.0;
    assert_eq!(machine.restore(), Some(StateWarning::RestoreWithoutSave));
    assert_eq!(machine.state().linewidth, 4.0);
}

// ============================================================================
// Text object mode
// ============================================================================

#[test]
fn test_nested_begin_text_is_state_error() {
    let mut machine = GraphicsStateMachine::new();
    machine.begin_text().unwrap();
    assert!(matches!(machine.begin_text(), Err(PdfError::State(_))));
    machine.end_text().unwrap();
    assert!(matches!(machine.end_text(), Err(PdfError::State(_))));
}

#[test]
fn test_transform_inside_text_warns_but_applies() {
    let mut machine = GraphicsStateMachine::new();
    machine.begin_text().unwrap();
    assert_eq!(
        machine.concat((1.0, 0.0, 0.0, 1.0, 5.0, 5.0)),
        Some(StateWarning::InsideTextObject { operator: "cm" })
    );
    assert_eq!(machine.ctm().4, 5.0);
    assert_eq!(
        machine.save(),
        Some(StateWarning::InsideTextObject { operator: "q" })
    );
    assert_eq!(
        machine.restore(),
        Some(StateWarning::InsideTextObject { operator: "Q" })
    );
    assert!(machine.in_text_object());
}

#[test]
fn test_selecting_color_space_resets_color() {
    let mut machine = GraphicsStateMachine::new();
    machine.set_non_stroking_color(Color::Gray(0.5));
    machine.set_non_stroking_color_space(PDFColorSpace::device_cmyk());
    assert_eq!(machine.state().ncolor, Color::Cmyk(0.0, 0.0, 0.0, 1.0));
    assert!(machine.stroking_color_space().is_none());
}
