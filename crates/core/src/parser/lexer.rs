//! Content stream lexer.
//!
//! Splits decoded content into lexemes: operand values, operator keywords and
//! the bracket tokens that delimit arrays and dictionaries. Comments and
//! whitespace are skipped.

use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    /// Number, name, string, boolean or null.
    Value(PDFObject),
    /// Bare word: an operator mnemonic, or `BI`/`ID`/`EI`.
    Keyword(String),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
}

/// Check if byte is PDF whitespace.
pub const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

pub const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

const fn is_keyword_end(b: u8) -> bool {
    is_whitespace(b) || is_delimiter(b)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Lexer over a decoded content buffer.
pub struct ContentLexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ContentLexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn advance_one(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Next lexeme with its starting offset.
    ///
    /// On error the lexer has already moved past the offending input, so the
    /// caller may keep pulling lexemes.
    pub fn next_lexeme(&mut self) -> Option<Result<(usize, Lexeme)>> {
        self.skip_whitespace();
        let start = self.pos;
        let b = self.peek()?;

        let result = match b {
            b'/' => self.parse_name(),
            b'(' => self.parse_string(),
            b'<' => {
                if self.peek_at(1) == Some(b'<') {
                    self.pos += 2;
                    Ok(Lexeme::DictStart)
                } else {
                    self.parse_hex_string()
                }
            }
            b'>' => {
                if self.peek_at(1) == Some(b'>') {
                    self.pos += 2;
                    Ok(Lexeme::DictEnd)
                } else {
                    self.pos += 1;
                    Err(self.error(start, "unexpected '>'"))
                }
            }
            b'[' => {
                self.pos += 1;
                Ok(Lexeme::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                Ok(Lexeme::ArrayEnd)
            }
            b')' | b'{' | b'}' => {
                self.pos += 1;
                Err(self.error(start, format!("unexpected '{}'", b as char)))
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.parse_number(start),
            _ => Ok(self.parse_keyword()),
        };

        Some(result.map(|lexeme| (start, lexeme)))
    }

    fn error(&self, pos: usize, msg: impl Into<String>) -> PdfError {
        PdfError::TokenError {
            pos,
            msg: msg.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'%' {
                while let Some(c) = self.advance_one() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if is_whitespace(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn parse_name(&mut self) -> Result<Lexeme> {
        self.pos += 1; // skip '/'
        let mut name = Vec::with_capacity(16);

        while let Some(b) = self.peek() {
            if is_keyword_end(b) {
                break;
            }
            if b == b'#' {
                let h1 = self.peek_at(1).and_then(hex_value);
                let h2 = self.peek_at(2).and_then(hex_value);
                if let (Some(h1), Some(h2)) = (h1, h2) {
                    self.pos += 3;
                    name.push((h1 << 4) | h2);
                    continue;
                }
            }
            name.push(b);
            self.pos += 1;
        }

        let name = match String::from_utf8(name) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(Lexeme::Value(PDFObject::Name(name)))
    }

    fn parse_number(&mut self, start: usize) -> Result<Lexeme> {
        let mut negative = false;
        match self.peek() {
            Some(b'-') => {
                negative = true;
                self.pos += 1;
            }
            Some(b'+') => self.pos += 1,
            _ => {}
        }
        // Tolerate doubled signs such as "--5".
        while matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }

        let mut int_part: i64 = 0;
        let mut int_overflow = false;
        let mut digits = 0usize;
        let mut value = 0f64;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            digits += 1;
            match int_part
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
            {
                Some(v) => int_part = v,
                None => int_overflow = true,
            }
            value = value * 10.0 + f64::from(b - b'0');
            self.pos += 1;
        }

        let mut has_dot = false;
        if self.peek() == Some(b'.') {
            has_dot = true;
            self.pos += 1;
            let mut scale = 0.1;
            while let Some(b @ b'0'..=b'9') = self.peek() {
                digits += 1;
                value += f64::from(b - b'0') * scale;
                scale /= 10.0;
                self.pos += 1;
            }
        }

        if digits == 0 {
            self.skip_to_keyword_end();
            return Err(self.error(start, "invalid number"));
        }
        if matches!(self.peek(), Some(b) if !is_keyword_end(b)) {
            self.skip_to_keyword_end();
            return Err(self.error(start, "invalid number"));
        }

        if has_dot || int_overflow {
            Ok(Lexeme::Value(PDFObject::Real(if negative {
                -value
            } else {
                value
            })))
        } else {
            Ok(Lexeme::Value(PDFObject::Int(if negative {
                -int_part
            } else {
                int_part
            })))
        }
    }

    fn skip_to_keyword_end(&mut self) {
        while matches!(self.peek(), Some(b) if !is_keyword_end(b)) {
            self.pos += 1;
        }
    }

    fn parse_string(&mut self) -> Result<Lexeme> {
        self.pos += 1; // skip '('
        let mut result = Vec::with_capacity(32);
        let mut depth = 1;

        while depth > 0 {
            match self.advance_one() {
                Some(b'(') => {
                    depth += 1;
                    result.push(b'(');
                }
                Some(b')') => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                Some(b'\\') => match self.advance_one() {
                    Some(b'n') => result.push(b'\n'),
                    Some(b'r') => result.push(b'\r'),
                    Some(b't') => result.push(b'\t'),
                    Some(b'b') => result.push(0x08),
                    Some(b'f') => result.push(0x0c),
                    Some(b'\r') => {
                        if self.peek() == Some(b'\n') {
                            self.pos += 1;
                        }
                    }
                    Some(b'\n') => {}
                    Some(c @ b'0'..=b'7') => {
                        let mut octal = u32::from(c - b'0');
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d @ b'0'..=b'7') => {
                                    self.pos += 1;
                                    octal = octal * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }
                        result.push((octal & 0xFF) as u8);
                    }
                    Some(c) => result.push(c),
                    None => return Err(PdfError::UnexpectedEof),
                },
                Some(c) => result.push(c),
                None => return Err(PdfError::UnexpectedEof),
            }
        }

        Ok(Lexeme::Value(PDFObject::String(result)))
    }

    fn parse_hex_string(&mut self) -> Result<Lexeme> {
        let start = self.pos;
        self.pos += 1; // skip '<'
        let mut result = Vec::new();
        let mut pending: Option<u8> = None;

        loop {
            match self.advance_one() {
                Some(b'>') => break,
                Some(c) if is_whitespace(c) => {}
                Some(c) => {
                    let nibble = hex_value(c).ok_or_else(|| {
                        self.error(start, format!("invalid hex digit {:?}", c as char))
                    })?;
                    match pending.take() {
                        Some(high) => result.push((high << 4) | nibble),
                        None => pending = Some(nibble),
                    }
                }
                None => return Err(PdfError::UnexpectedEof),
            }
        }

        if let Some(high) = pending {
            result.push(high << 4);
        }

        Ok(Lexeme::Value(PDFObject::String(result)))
    }

    fn parse_keyword(&mut self) -> Lexeme {
        let start = self.pos;
        self.skip_to_keyword_end();
        match &self.data[start..self.pos] {
            b"true" => Lexeme::Value(PDFObject::Bool(true)),
            b"false" => Lexeme::Value(PDFObject::Bool(false)),
            b"null" => Lexeme::Value(PDFObject::Null),
            word => Lexeme::Keyword(String::from_utf8_lossy(word).into_owned()),
        }
    }

    /// Read inline image data following `ID`.
    ///
    /// Skips the single whitespace byte after `ID`. With a known `length` the
    /// data is taken verbatim; otherwise it runs up to a whitespace-delimited
    /// `EI`. The `EI` keyword itself is consumed.
    pub fn read_inline_data(&mut self, length: Option<usize>) -> Vec<u8> {
        if matches!(self.peek(), Some(b) if is_whitespace(b)) {
            self.pos += 1;
        }
        let start = self.pos;
        let data = self.data;

        if let Some(length) = length {
            let end = (start + length).min(data.len());
            self.pos = end;
            self.skip_whitespace();
            if data[self.pos..].starts_with(b"EI") {
                self.pos += 2;
                return data[start..end].to_vec();
            }
            self.pos = start;
        }

        let mut i = start;
        while i + 2 <= data.len() {
            let preceded = i == start || is_whitespace(data[i - 1]);
            let followed = data.get(i + 2).is_none_or(|&b| is_keyword_end(b));
            if preceded && followed && &data[i..i + 2] == b"EI" {
                let end = if i > start { i - 1 } else { i };
                self.pos = i + 2;
                return data[start..end].to_vec();
            }
            i += 1;
        }

        self.pos = data.len();
        data[start..].to_vec()
    }
}

impl Iterator for ContentLexer<'_> {
    type Item = Result<(usize, Lexeme)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_lexeme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(data: &[u8]) -> Vec<Lexeme> {
        ContentLexer::new(data)
            .filter_map(|r| r.ok().map(|(_, l)| l))
            .collect()
    }

    #[test]
    fn numbers_names_and_keywords() {
        assert_eq!(
            lex(b"1 -2.5 .5 /F#201 Tf % comment\nBT"),
            vec![
                Lexeme::Value(PDFObject::Int(1)),
                Lexeme::Value(PDFObject::Real(-2.5)),
                Lexeme::Value(PDFObject::Real(0.5)),
                Lexeme::Value(PDFObject::name("F 1")),
                Lexeme::Keyword("Tf".into()),
                Lexeme::Keyword("BT".into()),
            ]
        );
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            lex(b"(a\\(b\\)c\\101) <48 65 6>"),
            vec![
                Lexeme::Value(PDFObject::String(b"a(b)cA".to_vec())),
                Lexeme::Value(PDFObject::String(vec![0x48, 0x65, 0x60])),
            ]
        );
    }

    #[test]
    fn bad_lexeme_reports_position_and_recovers() {
        let mut lexer = ContentLexer::new(b"1 2x 3");
        assert!(matches!(lexer.next_lexeme(), Some(Ok((0, _)))));
        assert!(matches!(
            lexer.next_lexeme(),
            Some(Err(PdfError::TokenError { pos: 2, .. }))
        ));
        assert!(matches!(
            lexer.next_lexeme(),
            Some(Ok((5, Lexeme::Value(PDFObject::Int(3)))))
        ));
    }

    #[test]
    fn inline_data_stops_at_delimited_ei() {
        let mut lexer = ContentLexer::new(b" abEIcd\nEI Q");
        assert_eq!(lexer.read_inline_data(None), b"abEIcd");
        assert!(matches!(
            lexer.next_lexeme(),
            Some(Ok((_, Lexeme::Keyword(k)))) if k == "Q"
        ));
    }
}
