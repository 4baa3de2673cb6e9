//! Content stream tokenizer.
//!
//! Splits raw content stream bytes into [`Operator`]s, each carrying the
//! [`Operand`]s that preceded it. Only what text positioning needs is kept:
//! inline images (`BI … ID … EI`) are skipped whole.

use crate::error::DecodeError;

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`.
    Name(String),
    /// Literal `( … )` or hex `< … >` string, as raw bytes.
    String(Vec<u8>),
    Array(Vec<Operand>),
    Dictionary(Vec<(String, Operand)>),
    Boolean(bool),
    Null,
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::String(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// Operand `i` as a number.
    pub fn f64_at(&self, i: usize) -> Option<f64> {
        self.operands.get(i).and_then(Operand::as_f64)
    }

    /// The first six operands as a matrix `[a b c d e f]`.
    pub fn matrix(&self) -> Option<[f64; 6]> {
        let mut m = [0.0; 6];
        for (i, slot) in m.iter_mut().enumerate() {
            *slot = self.f64_at(i)?;
        }
        Some(m)
    }
}

/// Tokenize a content stream.
///
/// # Errors
///
/// Returns [`DecodeError::Interpreter`] for unterminated strings, arrays or
/// dictionaries and for stray closing delimiters.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, DecodeError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut ops = Vec::new();
    let mut stack = Vec::new();

    loop {
        lexer.skip_whitespace_and_comments();
        let Some(b) = lexer.peek() else { break };

        if is_regular(b) && !is_number_start(b) {
            let keyword = lexer.keyword();
            match keyword.as_str() {
                "true" => stack.push(Operand::Boolean(true)),
                "false" => stack.push(Operand::Boolean(false)),
                "null" => stack.push(Operand::Null),
                "BI" => {
                    lexer.skip_inline_image();
                    stack.clear();
                }
                _ => ops.push(Operator {
                    name: keyword,
                    operands: std::mem::take(&mut stack),
                }),
            }
            continue;
        }

        match b {
            b']' | b')' | b'}' => {
                return Err(DecodeError::Interpreter(format!(
                    "unexpected '{}' at offset {}",
                    b as char, lexer.pos
                )));
            }
            b'>' => {
                return Err(DecodeError::Interpreter(format!(
                    "unexpected '>' at offset {}",
                    lexer.pos
                )));
            }
            b'{' => {
                // PostScript procedure braces only occur in Type 4 functions.
                lexer.pos += 1;
            }
            _ => stack.push(lexer.object()?),
        }
    }

    Ok(ops)
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn is_number_start(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.')
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.peek().is_some_and(|c| c != b'\n' && c != b'\r') {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_regular) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Parse one operand starting at the current position.
    fn object(&mut self) -> Result<Operand, DecodeError> {
        match self.peek() {
            Some(b'(') => self.literal_string().map(Operand::String),
            Some(b'<') if self.peek_at(1) == Some(b'<') => {
                self.dictionary().map(Operand::Dictionary)
            }
            Some(b'<') => self.hex_string().map(Operand::String),
            Some(b'[') => self.array().map(Operand::Array),
            Some(b'/') => Ok(Operand::Name(self.name())),
            Some(b) if is_number_start(b) => Ok(self.number()),
            Some(b) if is_regular(b) => Ok(match self.keyword().as_str() {
                "true" => Operand::Boolean(true),
                "false" => Operand::Boolean(false),
                "null" => Operand::Null,
                // Bare keywords inside arrays or dictionaries are malformed; keep them as names.
                other => Operand::Name(other.to_string()),
            }),
            Some(b) => Err(DecodeError::Interpreter(format!(
                "unexpected byte 0x{b:02X} at offset {}",
                self.pos
            ))),
            None => Err(DecodeError::Interpreter(
                "unexpected end of content stream".to_string(),
            )),
        }
    }

    fn name(&mut self) -> String {
        self.pos += 1; // '/'
        let mut out = Vec::new();
        while let Some(b) = self.peek() {
            if !is_regular(b) {
                break;
            }
            if b == b'#' {
                let hi = self.peek_at(1).and_then(hex_value);
                let lo = self.peek_at(2).and_then(hex_value);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    out.push((hi << 4) | lo);
                    self.pos += 3;
                    continue;
                }
            }
            out.push(b);
            self.pos += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    fn number(&mut self) -> Operand {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.'))
        {
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        if let Ok(i) = text.parse::<i64>() {
            return Operand::Integer(i);
        }
        // Producers emit forms like "-.5", "5." and even "--3"; be lenient.
        let cleaned = text.trim_start_matches('+');
        let cleaned = if cleaned.starts_with("--") {
            &cleaned[1..]
        } else {
            cleaned
        };
        Operand::Real(cleaned.parse::<f64>().unwrap_or(0.0))
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        self.pos += 1; // '('
        let mut out = Vec::new();
        let mut depth = 1u32;
        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.peek() else { break };
                    self.pos += 1;
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                _ => out.push(b),
            }
        }
        Err(DecodeError::Interpreter(
            "unterminated literal string".to_string(),
        ))
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        self.pos += 1; // '<'
        let mut nibbles = Vec::new();
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if is_whitespace(b) => self.pos += 1,
                Some(b) => {
                    let v = hex_value(b).ok_or_else(|| {
                        DecodeError::Interpreter(format!("invalid hex digit {:?}", b as char))
                    })?;
                    nibbles.push(v);
                    self.pos += 1;
                }
                None => {
                    return Err(DecodeError::Interpreter(
                        "unterminated hex string".to_string(),
                    ));
                }
            }
        }
        if nibbles.len() % 2 == 1 {
            nibbles.push(0);
        }
        Ok(nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, DecodeError> {
        self.pos += 1; // '['
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => items.push(self.object()?),
                None => return Err(DecodeError::Interpreter("unterminated array".to_string())),
            }
        }
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, DecodeError> {
        self.pos += 2; // '<<'
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match (self.peek(), self.peek_at(1)) {
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(entries);
                }
                (Some(b'/'), _) => {
                    let key = self.name();
                    self.skip_whitespace_and_comments();
                    let value = self.object()?;
                    entries.push((key, value));
                }
                (Some(b), _) => {
                    return Err(DecodeError::Interpreter(format!(
                        "expected name key in dictionary, found 0x{b:02X}"
                    )));
                }
                (None, _) => {
                    return Err(DecodeError::Interpreter(
                        "unterminated dictionary".to_string(),
                    ));
                }
            }
        }
    }

    /// Skip from just after `BI` to just after the matching `EI`.
    fn skip_inline_image(&mut self) {
        // Header entries up to the ID keyword.
        loop {
            self.skip_whitespace_and_comments();
            if self.peek().is_none() {
                return;
            }
            if self.input[self.pos..].starts_with(b"ID")
                && self.peek_at(2).is_none_or(is_whitespace)
            {
                self.pos += 3;
                break;
            }
            if self.object().is_err() {
                self.pos += 1;
            }
        }
        // Binary data ends at whitespace + "EI" + whitespace/end.
        while self.pos < self.input.len() {
            let at_ei = self.input[self.pos..].starts_with(b"EI")
                && self.pos > 0
                && is_whitespace(self.input[self.pos - 1])
                && self.peek_at(2).is_none_or(|b| is_whitespace(b) || is_delimiter(b));
            if at_ei {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
