//! Stream codecs wrapped by the filter pipeline.
//!
//! - `ascii85`: ASCII85 and ASCIIHex decoding
//! - `flate`: zlib inflate/deflate
//! - `lzw`: LZW decompression
//! - `predictor`: PNG and TIFF predictor reversal
//! - `runlength`: Run-length decoding

pub mod ascii85;
pub mod flate;
pub mod lzw;
pub mod predictor;
pub mod runlength;

pub use ascii85::{ascii85decode, asciihexdecode};
pub use flate::{flate_decode, flate_decode_lenient, flate_encode};
pub use lzw::{lzwdecode, lzwdecode_lenient, lzwdecode_with_earlychange};
pub use predictor::{PredictorParams, apply_predictor};
pub use runlength::rldecode;
