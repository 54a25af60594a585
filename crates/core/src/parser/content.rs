//! Groups lexemes into operations.
//!
//! Operands precede their operator. Arrays and dictionaries nest. Inline
//! images (`BI ... ID <data> EI`) become a single token. Malformed input is
//! skipped and recorded as a [`Warning`]; tokenizing always continues.

use super::lexer::{ContentLexer, Lexeme};
use crate::diagnostics::{Warning, WarningKind};
use crate::error::Result;
use crate::model::objects::{PDFDict, PDFObject, filter_names};
use smallvec::SmallVec;

/// Operand list; most operators take six operands or fewer.
pub type Operands = SmallVec<[PDFObject; 6]>;

/// An operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    pub operands: Operands,
    /// Offset of the first operand (or the operator when there are none).
    pub offset: usize,
}

impl Operation {
    pub fn new(operator: impl Into<String>, operands: impl IntoIterator<Item = PDFObject>) -> Self {
        Self {
            operator: operator.into(),
            operands: operands.into_iter().collect(),
            offset: 0,
        }
    }
}

/// Image dictionary and raw sample data of an inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub dict: PDFDict,
    pub data: Vec<u8>,
    pub offset: usize,
}

impl InlineImage {
    /// Filter chain from `/Filter` or its inline abbreviation `/F`.
    pub fn filters(&self) -> Result<Vec<String>> {
        filter_names(self.dict.get("Filter").or_else(|| self.dict.get("F")))
    }

    /// `/DecodeParms`, or its inline abbreviation `/DP`.
    pub fn decode_parms(&self) -> Option<&PDFObject> {
        self.dict.get("DecodeParms").or_else(|| self.dict.get("DP"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentToken {
    Operation(Operation),
    InlineImage(InlineImage),
}

impl ContentToken {
    pub const fn offset(&self) -> usize {
        match self {
            Self::Operation(op) => op.offset,
            Self::InlineImage(img) => img.offset,
        }
    }
}

enum Context {
    Array(usize, Vec<PDFObject>),
    Dict(usize, Vec<PDFObject>),
}

/// Parser for decoded content streams.
pub struct ContentParser<'a> {
    lexer: ContentLexer<'a>,
    operands: Vec<(usize, PDFObject)>,
    contexts: Vec<Context>,
    warnings: Vec<Warning>,
}

impl<'a> ContentParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: ContentLexer::new(data),
            operands: Vec::new(),
            contexts: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Warnings recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, offset: usize, message: impl Into<String>) {
        self.warnings
            .push(Warning::new(WarningKind::MalformedToken, message).at(offset));
    }

    fn push_value(&mut self, offset: usize, value: PDFObject) {
        match self.contexts.last_mut() {
            Some(Context::Array(_, items) | Context::Dict(_, items)) => items.push(value),
            None => self.operands.push((offset, value)),
        }
    }

    fn build_dict(&mut self, offset: usize, items: Vec<PDFObject>) -> PDFDict {
        let mut dict = PDFDict::new();
        let mut iter = items.into_iter();
        while let Some(key) = iter.next() {
            match (key, iter.next()) {
                (PDFObject::Name(name), Some(value)) => {
                    dict.insert(name, value);
                }
                (PDFObject::Name(name), None) => {
                    self.warn(offset, format!("dictionary key /{name} has no value"));
                }
                (other, _) => {
                    self.warn(
                        offset,
                        format!("dictionary key must be a name, got {}", other.type_name()),
                    );
                }
            }
        }
        dict
    }

    /// Collect the `BI` dictionary and the data following `ID`.
    fn parse_inline_image(&mut self, offset: usize) -> Option<InlineImage> {
        let mut items = Vec::new();
        loop {
            match self.lexer.next_lexeme() {
                Some(Ok((_, Lexeme::Keyword(kw)))) if kw == "ID" => break,
                Some(Ok((pos, Lexeme::Keyword(kw)))) => {
                    self.warn(pos, format!("unexpected keyword {kw} in inline image dictionary"));
                }
                Some(Ok((_, Lexeme::Value(value)))) => items.push(value),
                Some(Ok((pos, _))) => {
                    self.warn(pos, "unexpected bracket in inline image dictionary");
                }
                Some(Err(err)) => self.warn(self.lexer.tell(), err.to_string()),
                None => {
                    self.warn(offset, "inline image without ID");
                    return None;
                }
            }
        }
        let dict = self.build_dict(offset, items);
        let length = dict
            .get("L")
            .or_else(|| dict.get("Length"))
            .and_then(|v| v.as_int().ok())
            .and_then(|n| usize::try_from(n).ok());
        let data = self.lexer.read_inline_data(length);
        Some(InlineImage { dict, data, offset })
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<ContentToken> {
        loop {
            let (pos, lexeme) = match self.lexer.next_lexeme() {
                Some(Ok(item)) => item,
                Some(Err(err)) => {
                    let pos = match &err {
                        crate::error::PdfError::TokenError { pos, .. } => *pos,
                        _ => self.lexer.tell(),
                    };
                    self.warn(pos, err.to_string());
                    continue;
                }
                None => {
                    if !self.contexts.is_empty() {
                        self.warn(self.lexer.tell(), "unterminated array or dictionary");
                        self.contexts.clear();
                    }
                    if let Some((offset, _)) = self.operands.first() {
                        let offset = *offset;
                        let count = self.operands.len();
                        self.operands.clear();
                        self.warn(offset, format!("{count} trailing operand(s) without operator"));
                    }
                    return None;
                }
            };

            match lexeme {
                Lexeme::Value(value) => self.push_value(pos, value),
                Lexeme::ArrayStart => self.contexts.push(Context::Array(pos, Vec::new())),
                Lexeme::DictStart => self.contexts.push(Context::Dict(pos, Vec::new())),
                Lexeme::ArrayEnd => match self.contexts.pop() {
                    Some(Context::Array(start, items)) => {
                        self.push_value(start, PDFObject::Array(items))
                    }
                    Some(ctx @ Context::Dict(..)) => {
                        self.contexts.push(ctx);
                        self.warn(pos, "']' inside dictionary");
                    }
                    None => self.warn(pos, "unbalanced ']'"),
                },
                Lexeme::DictEnd => match self.contexts.pop() {
                    Some(Context::Dict(start, items)) => {
                        let dict = self.build_dict(start, items);
                        self.push_value(start, PDFObject::Dict(dict));
                    }
                    Some(ctx @ Context::Array(..)) => {
                        self.contexts.push(ctx);
                        self.warn(pos, "'>>' inside array");
                    }
                    None => self.warn(pos, "unbalanced '>>'"),
                },
                Lexeme::Keyword(kw) if !self.contexts.is_empty() => {
                    self.warn(pos, format!("operator {kw} inside array or dictionary"));
                }
                Lexeme::Keyword(kw) if kw == "BI" => {
                    if !self.operands.is_empty() {
                        self.warn(pos, "operands before BI discarded");
                        self.operands.clear();
                    }
                    if let Some(image) = self.parse_inline_image(pos) {
                        return Some(ContentToken::InlineImage(image));
                    }
                }
                Lexeme::Keyword(kw) => {
                    let offset = self.operands.first().map_or(pos, |(p, _)| *p);
                    let operands = self.operands.drain(..).map(|(_, v)| v).collect();
                    return Some(ContentToken::Operation(Operation {
                        operator: kw,
                        operands,
                        offset,
                    }));
                }
            }
        }
    }
}

impl Iterator for ContentParser<'_> {
    type Item = ContentToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a whole buffer, returning tokens and warnings.
pub fn parse_content(data: &[u8]) -> (Vec<ContentToken>, Vec<Warning>) {
    let mut parser = ContentParser::new(data);
    let tokens: Vec<_> = parser.by_ref().collect();
    (tokens, parser.take_warnings())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(data: &[u8]) -> Vec<Operation> {
        parse_content(data)
            .0
            .into_iter()
            .filter_map(|t| match t {
                ContentToken::Operation(op) => Some(op),
                ContentToken::InlineImage(_) => None,
            })
            .collect()
    }

    #[test]
    fn groups_operands_with_operator() {
        let parsed = ops(b"0 0 10 10 re\nf\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].operator, "re");
        assert_eq!(parsed[0].operands.len(), 4);
        assert_eq!(parsed[0].offset, 0);
        assert_eq!(parsed[1].operator, "f");
        assert_eq!(parsed[1].offset, 13);
    }

    #[test]
    fn nested_arrays_and_dicts() {
        let parsed = ops(b"[(a) -120 (b)] TJ /Span <</MCID 3 /A [1 2]>> BDC");
        assert_eq!(parsed[0].operands[0].as_array().unwrap().len(), 3);
        let dict = parsed[1].operands[1].as_dict().unwrap();
        assert_eq!(dict.get("MCID"), Some(&PDFObject::Int(3)));
    }

    #[test]
    fn inline_image_is_one_token() {
        let (tokens, warnings) = parse_content(b"q BI /W 2 /H 1 /CS /G /BPC 8 ID \x00\xff\nEI Q");
        assert!(warnings.is_empty());
        assert_eq!(tokens.len(), 3);
        match &tokens[1] {
            ContentToken::InlineImage(img) => {
                assert_eq!(img.data, vec![0x00, 0xff]);
                assert_eq!(img.dict.get("W"), Some(&PDFObject::Int(2)));
            }
            other => panic!("expected inline image, got {other:?}"),
        }
    }

    #[test]
    fn inline_image_reads_abbreviated_filter_keys() {
        let (tokens, _) =
            parse_content(b"BI /W 1 /H 1 /F [/AHx] /DP << /Predictor 1 >> ID 00>\nEI");
        let ContentToken::InlineImage(img) = &tokens[0] else {
            panic!("expected inline image, got {:?}", tokens[0]);
        };
        assert_eq!(img.filters().unwrap(), vec!["AHx"]);
        assert!(matches!(img.decode_parms(), Some(PDFObject::Dict(_))));
    }

    #[test]
    fn malformed_lexeme_is_skipped_with_warning() {
        let (tokens, warnings) = parse_content(b"1 0 0 RG ) 0.5 w");
        assert_eq!(tokens.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MalformedToken);
        assert_eq!(warnings[0].offset, Some(9));
    }
}
