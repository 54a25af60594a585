//! Benchmarks for content stream processing.
//!
//! Benchmark groups:
//! - `content_lexer`: raw lexing throughput
//! - `content_interpret`: parse and dispatch against a null device
//! - `content_filters`: filter pipeline, in memory and spooled
//! - `content_writer`: operator emission

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use contentstream_core::codec::flate_encode;
use contentstream_core::filter::{Buffering, DecodeOptions, FilterRegistry, decode};
use contentstream_core::font::{PDFFont, StandardFont};
use contentstream_core::interp::{NullDevice, PDFResources, interpret};
use contentstream_core::parser::ContentLexer;
use contentstream_core::writer::ContentStreamWriter;
use std::sync::Arc;

// =============================================================================
// Data Generation
// =============================================================================

/// Page-like content with `n` operators drawn from a fixed template cycle.
fn generate_content(n: usize) -> Vec<u8> {
    let templates: &[&[u8]] = &[
        b"q\n",
        b"1 0 0 1 72 720 cm\n",
        b"0.5 0.25 0 rg\n",
        b"10 10 200 100 re\n",
        b"f\n",
        b"0 0 m\n",
        b"100 100 l\n",
        b"50 0 100 50 150 0 c\n",
        b"S\n",
        b"BT\n",
        b"/F1 12 Tf\n",
        b"100 700 Td\n",
        b"(Hello World) Tj\n",
        b"[(Kern) -120 (ing)] TJ\n",
        b"ET\n",
        b"Q\n",
    ];
    let mut data = Vec::with_capacity(n * 12);
    for i in 0..n {
        data.extend_from_slice(templates[i % templates.len()]);
    }
    data
}

fn resources() -> PDFResources {
    let mut resources = PDFResources::new();
    let font: Arc<dyn PDFFont> = Arc::new(StandardFont::new("Helvetica"));
    resources.insert_font("F1", font, Default::default());
    resources
}

// =============================================================================
// Benchmark Groups
// =============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_lexer");

    for ops in [1_000usize, 10_000, 100_000] {
        let data = generate_content(ops);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("mixed", ops), &data, |b, data| {
            b.iter(|| {
                let mut lexer = ContentLexer::new(black_box(data));
                let mut count = 0usize;
                while let Some(result) = lexer.next_lexeme() {
                    black_box(result.unwrap());
                    count += 1;
                }
                count
            })
        });
    }

    group.finish();
}

fn bench_interpret(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_interpret");
    let resources = resources();

    for ops in [1_000usize, 10_000, 100_000] {
        let data = generate_content(ops);
        group.throughput(Throughput::Elements(ops as u64));
        group.bench_with_input(BenchmarkId::new("null_device", ops), &data, |b, data| {
            b.iter(|| {
                let mut device = NullDevice;
                let summary = interpret(black_box(data), &mut device, &resources);
                black_box(summary.operations)
            })
        });
    }

    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_filters");
    let registry = FilterRegistry::standard();
    let options = DecodeOptions::default();
    let filters = vec!["ASCIIHexDecode".to_string(), "FlateDecode".to_string()];

    for ops in [10_000usize, 100_000] {
        let content = generate_content(ops);
        let mut raw = hex::encode_upper(flate_encode(&content).unwrap()).into_bytes();
        raw.push(b'>');
        group.throughput(Throughput::Bytes(content.len() as u64));

        for buffering in [Buffering::InMemory, Buffering::Spooled] {
            let label = match buffering {
                Buffering::InMemory => "in_memory",
                Buffering::Spooled => "spooled",
            };
            group.bench_with_input(BenchmarkId::new(label, ops), &raw, |b, raw| {
                b.iter(|| {
                    let decoded = decode(
                        raw.clone(),
                        &filters,
                        None,
                        &registry,
                        &options,
                        buffering,
                    )
                    .unwrap();
                    black_box(decoded.read_to_vec().unwrap().len())
                })
            });
        }
    }

    group.finish();
}

fn bench_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_writer");
    let font: Arc<dyn PDFFont> = Arc::new(StandardFont::new("Helvetica"));

    for rects in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements(rects as u64));
        group.bench_with_input(BenchmarkId::new("rects_and_text", rects), &rects, |b, &rects| {
            b.iter(|| {
                let mut resources = PDFResources::new();
                let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
                for i in 0..rects {
                    let x = (i % 50) as f64 * 10.5;
                    writer.set_non_stroking_rgb(0.1, 0.2, 0.3).unwrap();
                    writer.add_rect(x, x / 2.0, 10.0, 10.0).unwrap();
                    writer.fill().unwrap();
                }
                writer.begin_text().unwrap();
                writer.set_font(&font, 12.0).unwrap();
                writer.show_text("Benchmark").unwrap();
                writer.end_text().unwrap();
                black_box(writer.close().unwrap().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_interpret, bench_filters, bench_writer);
criterion_main!(benches);
