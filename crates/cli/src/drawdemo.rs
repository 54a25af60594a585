//! drawdemo - Write a sample page content stream
//!
//! Draws a grid of colored boxes, a curve, a dashed frame and a few lines of
//! text with [`ContentStreamWriter`], then writes the content (optionally
//! Flate-compressed) and the resulting `/Resources` dictionary.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use contentstream_core::font::{PDFFont, StandardFont};
use contentstream_core::interp::{PDFResources, ResourceKind};
use contentstream_core::model::{PDFDict, PDFObject};
use contentstream_core::writer::format::write_object;
use contentstream_core::writer::{ContentStreamWriter, RenderingMode, TextElement, WriterOptions};
use contentstream_core::{Result as ContentResult, Warning};
use itertools::Itertools;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Write a sample page content stream.
#[derive(Parser, Debug)]
#[command(name = "drawdemo")]
#[command(author, version, about = "Write a sample page content stream", long_about = None)]
struct Args {
    /// Boxes per row in the color grid
    #[arg(short = 'n', long, default_value_t = 6)]
    columns: usize,

    /// Text drawn under the grid
    #[arg(short = 't', long, default_value = "Hello, content streams")]
    text: String,

    /// Flate-compress the content
    #[arg(short = 'z', long, action = ArgAction::SetTrue)]
    compress: bool,

    /// Fraction digits kept for real numbers
    #[arg(long, default_value_t = 5)]
    digits: usize,

    /// Print the /Resources dictionary to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    resources: bool,

    /// Path to file where content is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn draw_grid<W: Write>(writer: &mut ContentStreamWriter<'_, W>, columns: usize) -> ContentResult<()> {
    let size = 480.0 / columns.max(1) as f64;
    for row in 0..3 {
        for col in 0..columns {
            let t = col as f64 / columns.max(2).saturating_sub(1) as f64;
            match row {
                0 => writer.set_non_stroking_rgb(t, 0.2, 1.0 - t)?,
                1 => writer.set_non_stroking_gray(t)?,
                _ => writer.set_non_stroking_cmyk(0.0, t, 1.0 - t, 0.1)?,
            }
            let x = 66.0 + col as f64 * size;
            let y = 600.0 - row as f64 * size;
            writer.fill_rect(x, y, size - 4.0, size - 4.0)?;
        }
    }
    Ok(())
}

fn draw_frame<W: Write>(writer: &mut ContentStreamWriter<'_, W>) -> ContentResult<()> {
    let mut gs = PDFDict::new();
    gs.insert("CA".into(), PDFObject::Real(0.6));

    writer.save_graphics_state()?;
    writer.set_graphics_state_parameters(&gs)?;
    writer.set_line_width(2.0)?;
    writer.set_line_dash_pattern(&[6.0, 3.0], 0.0)?;
    writer.set_line_cap_style(1)?;
    writer.set_stroking_rgb_255(40, 40, 160)?;
    writer.add_rect(50.0, 300.0, 512.0, 480.0)?;
    writer.stroke()?;

    writer.set_line_dash_pattern(&[], 0.0)?;
    writer.draw_line(50.0, 320.0, 562.0, 320.0)?;
    writer.move_to(66.0, 340.0)?;
    writer.curve_to(200.0, 460.0, 400.0, 220.0, 546.0, 340.0)?;
    writer.stroke()?;
    writer.restore_graphics_state()
}

fn draw_text<W: Write>(
    writer: &mut ContentStreamWriter<'_, W>,
    font: &Arc<dyn PDFFont>,
    text: &str,
) -> ContentResult<()> {
    writer.begin_marked_content("Span")?;
    writer.begin_text()?;
    writer.set_font(font, 18.0)?;
    writer.set_leading(22.0)?;
    writer.new_line_at_offset(66.0, 400.0)?;
    writer.show_text(text)?;
    writer.new_line()?;
    writer.set_character_spacing(1.5)?;
    writer.show_text_with_positioning(&[
        TextElement::Text("Kern"),
        TextElement::Adjust(-250.0),
        TextElement::Text("ing"),
    ])?;
    writer.new_line()?;
    writer.set_rendering_mode(RenderingMode::Stroke)?;
    writer.show_text("Outlined")?;
    writer.end_text()?;
    writer.end_marked_content()
}

fn write_resources(resources: &PDFResources) -> Result<()> {
    let mut out = Vec::new();
    write_object(&mut out, &PDFObject::Dict(resources.to_dict()), 4)?;
    eprintln!("{}", String::from_utf8_lossy(&out));
    let summary = ResourceKind::ALL
        .iter()
        .filter_map(|&kind| {
            let names = resources.names(kind);
            (!names.is_empty()).then(|| format!("{}: {}", kind.key(), names.join(" ")))
        })
        .join("; ");
    info!(%summary, "resources");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let font: Arc<dyn PDFFont> = Arc::new(StandardFont::new("Helvetica"));
    let options = WriterOptions::page()
        .with_compress(args.compress)
        .with_max_fraction_digits(args.digits);

    let mut resources = PDFResources::new();
    let mut warnings: Vec<Warning> = Vec::new();
    let stream = {
        let mut writer = ContentStreamWriter::with_options(Vec::new(), &mut resources, options)
            .with_diagnostics(&mut warnings);
        writer.add_comment("drawdemo")?;
        draw_grid(&mut writer, args.columns).context("drawing grid")?;
        draw_frame(&mut writer).context("drawing frame")?;
        draw_text(&mut writer, &font, &args.text).context("drawing text")?;
        writer.into_stream()?
    };
    for warning in &warnings {
        warn!("{warning}");
    }
    debug!(
        bytes = stream.rawdata().len(),
        compressed = args.compress,
        "content written"
    );

    if args.resources {
        write_resources(&resources)?;
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("creating {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };
    output.write_all(stream.rawdata())?;
    output.flush()?;
    Ok(())
}
