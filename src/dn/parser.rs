//! The RFC 4514 text parser. A hand-driven scanner rather than a
//! combinator grammar: escape handling spans token boundaries and the
//! error positions must be exact.

use crate::error::DnError;
use crate::octets::hex_pair;
use crate::value::Value;

use super::{Ava, Rdn};

/// Parses a full DN. The empty string is the root DSE.
pub(super) fn parse_dn(input: &str) -> Result<Vec<Rdn>, DnError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let mut scanner = Scanner::new(input);
    let mut rdns = Vec::new();
    loop {
        rdns.push(scanner.rdn()?);
        match scanner.peek() {
            None => break,
            Some(b',' | b';') => {
                scanner.advance();
            }
            Some(other) => {
                return Err(DnError::BadChar {
                    character: other as char,
                    position: scanner.pos,
                })
            }
        }
    }
    Ok(rdns)
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.advance();
        }
    }

    fn rdn(&mut self) -> Result<Rdn, DnError> {
        let mut avas = vec![self.ava()?];
        while self.peek() == Some(b'+') {
            self.advance();
            avas.push(self.ava()?);
        }
        Ok(Rdn::from_avas(avas))
    }

    fn ava(&mut self) -> Result<Ava, DnError> {
        self.skip_spaces();
        let attribute_type = self.attribute_type()?;
        self.skip_spaces();

        match self.peek() {
            Some(b'=') => self.advance(),
            None => return Err(DnError::EmptyComponent { position: self.pos }),
            Some(_) => return Err(DnError::MissingEqual { position: self.pos }),
        }

        self.skip_spaces();
        let value = self.value()?;
        Ok(Ava::from_value(attribute_type, value))
    }

    fn attribute_type(&mut self) -> Result<String, DnError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(DnError::EmptyComponent { position: start });
        }
        let text = &self.input[start..self.pos];
        let first = text.as_bytes()[0];
        if !(first.is_ascii_alphabetic() || first.is_ascii_digit()) {
            return Err(DnError::BadChar {
                character: first as char,
                position: start,
            });
        }
        Ok(text.to_owned())
    }

    fn value(&mut self) -> Result<Value, DnError> {
        match self.peek() {
            Some(b'#') => self.hex_value(),
            Some(b'"') => self.quoted_value(),
            _ => self.string_value(),
        }
    }

    /// `#` followed by the hex of the value's BER encoding.
    fn hex_value(&mut self) -> Result<Value, DnError> {
        self.advance();
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b',' | b';' | b'+') {
                break;
            }
            self.advance();
        }
        let digits = &self.bytes[start..self.pos];
        if digits.is_empty() || digits.len() % 2 != 0 {
            return Err(DnError::BadHex { position: start });
        }
        let mut out = Vec::with_capacity(digits.len() / 2);
        for (i, pair) in digits.chunks_exact(2).enumerate() {
            out.push(hex_pair(pair[0], pair[1]).ok_or(DnError::BadHex {
                position: start + i * 2,
            })?);
        }
        Ok(Value::from_bytes(out))
    }

    /// The legacy RFC 2253 quoted form; specials inside need no escape.
    fn quoted_value(&mut self) -> Result<Value, DnError> {
        let open = self.pos;
        self.advance();
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => return Err(DnError::UnbalancedQuotes { position: open }),
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    out.push(self.escape()?);
                }
                Some(_) => {
                    out.push(self.bytes[self.pos]);
                    self.advance();
                }
            }
        }
        self.skip_spaces();
        if !matches!(self.peek(), None | Some(b',' | b';' | b'+')) {
            return Err(DnError::BadChar {
                character: self.bytes[self.pos] as char,
                position: self.pos,
            });
        }
        Ok(build_value(out))
    }

    fn string_value(&mut self) -> Result<Value, DnError> {
        let mut out = Vec::new();
        // bytes in `out` that are significant: trailing unescaped spaces
        // beyond this are trimmed
        let mut significant = 0;
        loop {
            match self.peek() {
                None | Some(b',' | b';' | b'+') => break,
                Some(0) => {
                    return Err(DnError::BadChar {
                        character: '\0',
                        position: self.pos,
                    })
                }
                Some(b'\\') => {
                    self.advance();
                    out.push(self.escape()?);
                    significant = out.len();
                }
                Some(b' ') => {
                    out.push(b' ');
                    self.advance();
                }
                Some(byte) => {
                    out.push(byte);
                    self.advance();
                    significant = out.len();
                }
            }
        }
        out.truncate(significant);
        Ok(build_value(out))
    }

    /// One escape, after the backslash: a special character or a hex
    /// pair.
    fn escape(&mut self) -> Result<u8, DnError> {
        let position = self.pos;
        let Some(byte) = self.peek() else {
            return Err(DnError::BadEscape { position });
        };
        match byte {
            b'\\' | b'"' | b'#' | b'+' | b',' | b';' | b'<' | b'>' | b'=' | b' ' => {
                self.advance();
                Ok(byte)
            }
            _ if byte.is_ascii_hexdigit() => {
                self.advance();
                let Some(low) = self.peek() else {
                    return Err(DnError::BadHex { position });
                };
                self.advance();
                hex_pair(byte, low).ok_or(DnError::BadHex { position })
            }
            _ => Err(DnError::BadEscape { position }),
        }
    }
}

/// UTF-8 bytes become a human-readable value; anything else stays binary.
fn build_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => Value::from_string(text),
        Err(error) => Value::from_bytes(error.into_bytes()),
    }
}
