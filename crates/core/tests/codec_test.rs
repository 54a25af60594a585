//! Stream codecs used by the standard filters.

use contentstream_core::codec::{
    ascii85decode, asciihexdecode, flate_decode, flate_decode_lenient, flate_encode, lzwdecode,
    rldecode,
};

// === ascii85decode ===

#[test]
fn test_ascii85decode_wikipedia() {
    assert_eq!(
        ascii85decode(b"9jqo^BlbD-BleB1DJ+*+F(f,q").unwrap(),
        b"Man is distinguished"
    );
}

#[test]
fn test_ascii85decode_with_eod() {
    assert_eq!(ascii85decode(b"E,9)oF*2M7/c~>").unwrap(), b"pleasure.");
}

#[test]
fn test_ascii85decode_z_encoding() {
    assert_eq!(
        ascii85decode(b"zE,9)oF*2M7/c~>").unwrap(),
        b"\0\0\0\0pleasure."
    );
}

#[test]
fn test_ascii85decode_eod_variants() {
    for input in [
        &b"E,9)oF*2M7/c"[..],
        b"E,9)oF*2M7/c~",
        b"<~E,9)oF*2M7/c~",
        b"<~E,9)oF*2M7/c~\n>",
    ] {
        assert_eq!(ascii85decode(input).unwrap(), b"pleasure.");
    }
}

#[test]
fn test_ascii85decode_rejects_bad_bytes() {
    assert!(ascii85decode(b"abc{def~>").is_err());
}

// === asciihexdecode ===

#[test]
fn test_asciihexdecode_whitespace() {
    assert_eq!(asciihexdecode(b"61 62 2e6364   65").unwrap(), b"ab.cde");
}

#[test]
fn test_asciihexdecode_odd_with_eod() {
    assert_eq!(asciihexdecode(b"61 62 2e6364   657>").unwrap(), b"ab.cdep");
    assert_eq!(asciihexdecode(b"7>").unwrap(), b"p");
}

#[test]
fn test_asciihexdecode_binary() {
    let bytes = hex::decode("00ff10e0").unwrap();
    let encoded = format!("{}>", hex::encode_upper(&bytes));
    assert_eq!(asciihexdecode(encoded.as_bytes()).unwrap(), bytes);
}

// === lzw / runlength / flate ===

#[test]
fn test_lzwdecode() {
    let input = b"\x80\x0b\x60\x50\x22\x0c\x0c\x85\x01";
    let expected = b"\x2d\x2d\x2d\x2d\x2d\x41\x2d\x2d\x2d\x42";
    assert_eq!(lzwdecode(input).unwrap(), expected);
}

#[test]
fn test_rldecode_stops_at_eod() {
    let data = [1, b'h', b'i', 253, b'!', 128, 5, b'x'];
    assert_eq!(rldecode(&data).unwrap(), b"hi!!!!");
}

#[test]
fn test_flate_truncated_stream_is_partially_recovered() {
    let content = b"q 1 0 0 1 10 10 cm 0 0 m 100 100 l S Q\n".repeat(50);
    let encoded = flate_encode(&content).unwrap();
    assert_eq!(flate_decode(&encoded).unwrap(), content);
    let truncated = &encoded[..encoded.len() / 2];
    let partial = flate_decode_lenient(truncated);
    assert!(!partial.is_empty());
    assert!(content.starts_with(&partial));
}
