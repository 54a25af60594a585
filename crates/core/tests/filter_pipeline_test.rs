//! Filter decode pipeline: chaining, buffering modes and failure reporting.

use contentstream_core::codec::flate_encode;
use contentstream_core::filter::{
    Buffering, DecodeOptions, DecodeResult, FilterRegistry, decode, decode_stream,
};
use contentstream_core::model::{PDFDict, PDFObject, PDFStream};
use contentstream_core::PdfError;

fn names(filters: &[&str]) -> Vec<String> {
    filters.iter().map(|f| f.to_string()).collect()
}

fn hex_encoded(data: &[u8]) -> Vec<u8> {
    let mut out = hex::encode_upper(data).into_bytes();
    out.push(b'>');
    out
}

// ============================================================================
// Empty chain
// ============================================================================

#[test]
fn test_empty_chain_passes_input_through() {
    let registry = FilterRegistry::standard();
    for buffering in [Buffering::InMemory, Buffering::Spooled] {
        let decoded = decode(
            b"0 0 m 1 1 l S".to_vec(),
            &[],
            None,
            &registry,
            &DecodeOptions::default(),
            buffering,
        )
        .unwrap();
        assert!(decoded.decode_results().is_empty());
        assert!(decoded.decode_result().is_default());
        assert_eq!(decoded.decode_result(), DecodeResult::default());
        assert_eq!(decoded.read_to_vec().unwrap(), b"0 0 m 1 1 l S");
    }
}

// ============================================================================
// Buffering modes
// ============================================================================

#[test]
fn test_in_memory_and_spooled_are_identical() {
    let content: Vec<u8> = (0..20_000u32)
        .flat_map(|i| format!("{} {} m\n", i % 97, i % 13).into_bytes())
        .collect();
    let raw = hex_encoded(&flate_encode(&content).unwrap());
    let registry = FilterRegistry::standard();

    for chain in [
        names(&["ASCIIHexDecode"]),
        names(&["ASCIIHexDecode", "FlateDecode"]),
        names(&["AHx", "Fl"]),
    ] {
        let memory = decode(
            raw.clone(),
            &chain,
            None,
            &registry,
            &DecodeOptions::default(),
            Buffering::InMemory,
        )
        .unwrap();
        let spooled = decode(
            raw.clone(),
            &chain,
            None,
            &registry,
            &DecodeOptions::default(),
            Buffering::Spooled,
        )
        .unwrap();
        assert!(!memory.is_spooled());
        assert!(spooled.is_spooled());
        assert_eq!(memory.decode_results().len(), chain.len());
        assert_eq!(memory.decode_results(), spooled.decode_results());
        assert_eq!(memory.read_to_vec().unwrap(), spooled.read_to_vec().unwrap());
    }
}

#[test]
fn test_decode_stream_uses_stream_dictionary() {
    let mut attrs = PDFDict::new();
    attrs.insert(
        "Filter".into(),
        PDFObject::Array(vec![
            PDFObject::name("ASCIIHexDecode"),
            PDFObject::name("FlateDecode"),
        ]),
    );
    let stream = PDFStream::new(attrs, hex_encoded(&flate_encode(b"BT ET").unwrap()));
    let decoded = decode_stream(
        &stream,
        &FilterRegistry::standard(),
        &DecodeOptions::default(),
        Buffering::Spooled,
    )
    .unwrap();
    assert_eq!(decoded.read_to_vec().unwrap(), b"BT ET");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failure_reports_index_and_name() {
    let raw = hex_encoded(b"definitely not zlib");
    let err = decode(
        raw,
        &names(&["ASCIIHexDecode", "FlateDecode"]),
        None,
        &FilterRegistry::standard(),
        &DecodeOptions::default(),
        Buffering::Spooled,
    )
    .unwrap_err();
    match err {
        PdfError::Filter { index, name, .. } => {
            assert_eq!(index, 1);
            assert_eq!(name, "FlateDecode");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unknown_filter_is_a_filter_error() {
    let err = decode(
        b"abc".to_vec(),
        &names(&["JBIG2Decode"]),
        None,
        &FilterRegistry::standard(),
        &DecodeOptions::default(),
        Buffering::InMemory,
    )
    .unwrap_err();
    assert!(matches!(err, PdfError::Filter { index: 0, ref name, .. } if name == "JBIG2Decode"));
}

#[test]
fn test_oversized_predictor_row_is_a_filter_error() {
    let mut parms = PDFDict::new();
    parms.insert("Predictor".into(), PDFObject::Int(12));
    parms.insert("Columns".into(), PDFObject::Int(1 << 61));
    let err = decode(
        flate_encode(&[2, 0, 0, 0]).unwrap(),
        &names(&["FlateDecode"]),
        Some(&PDFObject::Dict(parms)),
        &FilterRegistry::standard(),
        &DecodeOptions::default(),
        Buffering::InMemory,
    )
    .unwrap_err();
    assert!(matches!(err, PdfError::Filter { index: 0, ref name, .. } if name == "FlateDecode"));
}

#[test]
fn test_corrupt_lzw_is_a_filter_error() {
    for options in [
        DecodeOptions::default(),
        DecodeOptions::default().skip_expensive_repair(true),
    ] {
        let err = decode(
            vec![0xFF; 16],
            &names(&["LZWDecode"]),
            None,
            &FilterRegistry::standard(),
            &options,
            Buffering::InMemory,
        )
        .unwrap_err();
        assert!(matches!(err, PdfError::Filter { index: 0, ref name, .. } if name == "LZWDecode"));
    }
}

#[test]
fn test_lzw_prefix_before_bad_code_is_flagged_repaired() {
    // 9-bit codes: clear, 'A', 'B', then an unassigned code
    let raw = vec![0x80, 0x10, 0x48, 0x52, 0xC0];
    let mut parms = PDFDict::new();
    parms.insert("EarlyChange".into(), PDFObject::Int(0));
    let parms = PDFObject::Dict(parms);
    let registry = FilterRegistry::standard();

    let strict = decode(
        raw.clone(),
        &names(&["LZW"]),
        Some(&parms),
        &registry,
        &DecodeOptions::default().skip_expensive_repair(true),
        Buffering::InMemory,
    );
    assert!(matches!(strict, Err(PdfError::Filter { index: 0, .. })));

    // lenient decoding either keeps a prefix (flagged) or fails outright
    let lenient = decode(
        raw,
        &names(&["LZW"]),
        Some(&parms),
        &registry,
        &DecodeOptions::default(),
        Buffering::InMemory,
    );
    match lenient {
        Ok(decoded) => {
            assert!(decoded.decode_result().repaired);
            let data = decoded.read_to_vec().unwrap();
            assert!(!data.is_empty() && b"AB".starts_with(&data));
        }
        Err(err) => assert!(matches!(err, PdfError::Filter { index: 0, .. })),
    }
}
