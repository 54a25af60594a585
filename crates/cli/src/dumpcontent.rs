//! dumpcontent - Decode and interpret a PDF content stream
//!
//! Reads raw content bytes from a file (or stdin), runs them through an
//! optional filter chain, then prints the parsed operations, the device
//! events produced by interpretation, and any warnings.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use contentstream_core::filter::{Buffering, DecodeOptions, FilterRegistry, decode};
use contentstream_core::font::{PDFFont, StandardFont};
use contentstream_core::interp::{
    ContentInterpreter, InterpreterOptions, PDFResources, RecordingDevice,
};
use contentstream_core::model::PDFObject;
use contentstream_core::parser::{ContentToken, parse_content};
use contentstream_core::writer::format::write_object;
use contentstream_core::{ExecutionSummary, TracingDiagnostics, Warning};
use itertools::Itertools;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Which sections to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Operations,
    Events,
    Warnings,
    All,
}

/// Decode and interpret a PDF content stream.
#[derive(Parser, Debug)]
#[command(name = "dumpcontent")]
#[command(author, version, about = "Decode and interpret a PDF content stream", long_about = None)]
struct Args {
    /// Content stream file, or "-" for stdin
    #[arg(default_value = "-")]
    file: String,

    /// Filters to apply in order, e.g. --filter ASCIIHexDecode --filter FlateDecode
    #[arg(short = 'f', long = "filter", action = ArgAction::Append)]
    filters: Vec<String>,

    /// Spool intermediate filter output to temporary files
    #[arg(long, action = ArgAction::SetTrue)]
    spool: bool,

    /// Bind a resource name to a standard font, e.g. --font F1=Helvetica
    #[arg(long = "font", value_name = "NAME=BASEFONT", action = ArgAction::Append)]
    fonts: Vec<String>,

    /// Maximum form XObject nesting depth
    #[arg(long, default_value_t = 12)]
    max_depth: usize,

    /// What to print
    #[arg(short = 's', long, value_enum, default_value_t = Section::All)]
    section: Section,

    /// Emit JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

#[derive(Debug, Serialize)]
struct OperationRecord {
    offset: usize,
    operator: String,
    operands: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    operations: Vec<OperationRecord>,
    events: Vec<String>,
    summary: ExecutionSummary,
}

fn read_input(file: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if file == "-" {
        io::stdin().read_to_end(&mut data)?;
    } else {
        let path = PathBuf::from(file);
        File::open(&path)
            .and_then(|mut f| f.read_to_end(&mut data))
            .with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(data)
}

fn build_resources(fonts: &[String]) -> Result<PDFResources> {
    let mut resources = PDFResources::new();
    for binding in fonts {
        let Some((name, basefont)) = binding.split_once('=') else {
            bail!("--font expects NAME=BASEFONT, got {binding:?}");
        };
        let font = StandardFont::new(basefont);
        let dict = font.to_dict();
        resources.insert_font(name, Arc::new(font) as Arc<dyn PDFFont>, dict);
    }
    Ok(resources)
}

fn render_operand(obj: &PDFObject) -> String {
    let mut out = Vec::new();
    match write_object(&mut out, obj, 5) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("{obj:?}"),
    }
}

fn operation_records(content: &[u8]) -> Vec<OperationRecord> {
    let (tokens, _) = parse_content(content);
    tokens
        .iter()
        .map(|token| match token {
            ContentToken::Operation(op) => OperationRecord {
                offset: op.offset,
                operator: op.operator.clone(),
                operands: op.operands.iter().map(render_operand).collect(),
            },
            ContentToken::InlineImage(image) => OperationRecord {
                offset: image.offset,
                operator: "BI".to_string(),
                operands: vec![format!("<{} bytes>", image.data.len())],
            },
        })
        .collect()
}

fn format_warning(warning: &Warning) -> String {
    let offset = warning
        .offset
        .map_or_else(|| "-".to_string(), |o| o.to_string());
    let operator = warning.operator.as_deref().unwrap_or("-");
    format!(
        "{offset:>8}  {:<20} {operator:<4} {}",
        warning.kind.as_str(),
        warning.message
    )
}

fn write_text(out: &mut dyn Write, report: &Report, section: Section) -> Result<()> {
    let show = |s: Section| section == Section::All || section == s;

    if show(Section::Operations) {
        writeln!(out, "# operations ({})", report.operations.len())?;
        for op in &report.operations {
            let operands = op.operands.iter().join(" ");
            if operands.is_empty() {
                writeln!(out, "{:>8}  {}", op.offset, op.operator)?;
            } else {
                writeln!(out, "{:>8}  {} {}", op.offset, operands, op.operator)?;
            }
        }
    }
    if show(Section::Events) {
        writeln!(out, "# events ({})", report.events.len())?;
        for event in &report.events {
            writeln!(out, "{event}")?;
        }
    }
    if show(Section::Warnings) {
        let summary = &report.summary;
        writeln!(
            out,
            "# warnings ({}), {} applied, {} skipped",
            summary.warnings.len(),
            summary.operations,
            summary.skipped
        )?;
        let counts = summary
            .warnings
            .iter()
            .counts_by(|w| w.kind.as_str())
            .into_iter()
            .sorted()
            .map(|(kind, n)| format!("{kind}={n}"))
            .join(", ");
        if !counts.is_empty() {
            writeln!(out, "# by kind: {counts}")?;
        }
        for warning in &summary.warnings {
            writeln!(out, "{}", format_warning(warning))?;
        }
    }
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

    let raw = read_input(&args.file)?;
    info!(bytes = raw.len(), filters = ?args.filters, "read content");

    let buffering = if args.spool {
        Buffering::Spooled
    } else {
        Buffering::InMemory
    };
    let registry = FilterRegistry::standard();
    let decoded = decode(
        raw,
        &args.filters,
        None,
        &registry,
        &DecodeOptions::default(),
        buffering,
    )
    .context("decoding content")?;
    if decoded.decode_results().iter().any(|r| r.repaired) {
        info!("content was repaired while decoding");
    }
    let content = decoded.read_to_vec()?;
    debug!(bytes = content.len(), "decoded content");

    let resources = build_resources(&args.fonts)?;
    let mut device = RecordingDevice::new();
    let summary = {
        let options = InterpreterOptions::default().with_max_xobject_depth(args.max_depth);
        let mut interp = ContentInterpreter::with_options(&mut device, &resources, options)
            .with_diagnostics(TracingDiagnostics);
        interp.execute(&content)
    };
    debug!(
        operations = summary.operations,
        skipped = summary.skipped,
        "interpretation finished"
    );

    let report = Report {
        operations: operation_records(&content),
        events: device.events.iter().map(|e| format!("{e:?}")).collect(),
        summary,
    };

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("creating {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    if args.json {
        serde_json::to_writer_pretty(&mut output, &report)?;
        writeln!(output)?;
    } else {
        write_text(&mut output, &report, args.section)?;
    }
    output.flush()?;
    Ok(())
}
