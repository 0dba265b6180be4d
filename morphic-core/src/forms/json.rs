// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! JSON-like text.
//!
//! The reader is lenient: member names may be unquoted, a trailing comma
//! is accepted, and a bare token that is not a literal or a number reads
//! as a string. Numbers read as `i32` below ten characters, as `i64`
//! otherwise, as `f64` with a decimal point, and as text when they carry
//! more than 17 integer digits or any other character.

use crate::entry::{
    ConsumerFactory, EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput,
    EntryProvider, EntryValue, ProviderFactory,
};
use crate::error::Error;
use std::borrow::Cow;
use std::fmt::Write;

/// Integer digits beyond this count no longer read as a number.
const MAX_INTEGER_DIGITS: usize = 17;

pub struct JsonProvider<'a> {
    text: &'a str,
    pos: usize,
    closers: Vec<u8>,
    started: bool,
}

impl<'a> JsonProvider<'a> {
    pub fn new(text: &'a str) -> Self {
        JsonProvider {
            text,
            pos: 0,
            closers: Vec::new(),
            started: false,
        }
    }

    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Skips spaces and at most one comma after an item.
    fn skip_separator(&mut self) {
        self.skip_spaces();
        if self.peek() == Some(b',') {
            self.pos += 1;
        }
    }

    fn fail(&self, what: &str) -> Error {
        match self.peek() {
            Some(c) => Error::protocol(format!(
                "{} at position {} (found '{}')",
                what, self.pos, c as char
            )),
            None => Error::protocol(format!("{} at end of input", what)),
        }
    }

    fn read_string(&mut self) -> Result<Cow<'a, str>, Error> {
        let text = self.text;
        let start = self.pos + 1;
        let bytes = text.as_bytes();
        let mut end = start;
        while let Some(&c) = bytes.get(end) {
            match c {
                b'"' => {
                    self.pos = end + 1;
                    return Ok(Cow::Borrowed(&text[start..end]));
                }
                b'\\' => break,
                _ => end += 1,
            }
        }
        let mut out = String::from(&text[start..end]);
        let mut chars = text[end..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = end + offset + 1;
                    return Ok(Cow::Owned(out));
                }
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'u' => {
                            let high =
                                hex4(&mut chars).ok_or_else(|| self.fail("bad \\u escape"))?;
                            let mut code = high;
                            if (0xD800..0xDC00).contains(&high) {
                                let mut ahead = chars.clone();
                                let low = match (ahead.next(), ahead.next()) {
                                    (Some((_, '\\')), Some((_, 'u'))) => hex4(&mut ahead)
                                        .filter(|low| (0xDC00..0xE000).contains(low)),
                                    _ => None,
                                };
                                if let Some(low) = low {
                                    chars = ahead;
                                    code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                                }
                            }
                            // a lone surrogate half becomes U+FFFD
                            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        self.pos = text.len();
        Err(self.fail("unterminated string"))
    }

    fn read_name(&mut self) -> Result<Cow<'a, str>, Error> {
        let name = if self.peek() == Some(b'"') {
            self.read_string()?
        } else {
            let start = self.pos;
            while !matches!(
                self.peek(),
                None | Some(b':' | b' ' | b'\t' | b'\n' | b'\r')
            ) {
                self.pos += 1;
            }
            if start == self.pos {
                return Err(self.fail("expected a member name"));
            }
            Cow::Borrowed(&self.text[start..self.pos])
        };
        self.skip_spaces();
        if self.peek() != Some(b':') {
            return Err(self.fail("expected ':'"));
        }
        self.pos += 1;
        self.skip_spaces();
        Ok(name)
    }

    fn read_token(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while !matches!(
            self.peek(),
            None | Some(b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r')
        ) {
            self.pos += 1;
        }
        &text[start..self.pos]
    }

    fn read_value(
        &mut self,
        name: Option<&str>,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        match self.peek() {
            Some(b'{') => {
                self.pos += 1;
                self.closers.push(b'}');
                builder.start_container(name, true, None)
            }
            Some(b'[') => {
                self.pos += 1;
                self.closers.push(b']');
                builder.start_container(name, false, None)
            }
            Some(b'"') => {
                let text = self.read_string()?;
                self.skip_separator();
                builder.entry(name, EntryValue::Str(&text))
            }
            Some(b',' | b']' | b'}') | None => Err(self.fail("expected a value")),
            Some(_) => {
                let token = self.read_token();
                self.skip_separator();
                match token {
                    "null" => builder.null_entry(name),
                    "true" => builder.entry(name, EntryValue::Bool(true)),
                    "false" => builder.entry(name, EntryValue::Bool(false)),
                    _ if token.starts_with(|c: char| c == '-' || c.is_ascii_digit()) => {
                        builder.entry(name, read_number(token))
                    }
                    _ => builder.entry(name, EntryValue::Str(token)),
                }
            }
        }
    }
}

fn read_number(token: &str) -> EntryValue<'_> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let mut fraction = false;
    for c in digits.bytes() {
        match c {
            b'0'..=b'9' => {}
            b'.' if !fraction => fraction = true,
            _ => return EntryValue::Str(token),
        }
    }
    if digits.is_empty() {
        return EntryValue::I32(0);
    }
    if fraction {
        return token.parse().map_or(EntryValue::Str(token), EntryValue::F64);
    }
    if digits.len() > MAX_INTEGER_DIGITS {
        return EntryValue::Str(token);
    }
    if digits.len() < 10 {
        return token.parse().map_or(EntryValue::Str(token), EntryValue::I32);
    }
    token.parse().map_or(EntryValue::Str(token), EntryValue::I64)
}

impl<'a> EntryProvider<'a> for JsonProvider<'a> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        self.skip_spaces();
        if !self.started {
            self.started = true;
            if self.peek().is_none() {
                return Err(Error::protocol("empty input"));
            }
            return self.read_value(None, builder);
        }
        let Some(&closer) = self.closers.last() else {
            if self.peek().is_some() {
                return Err(self.fail("unexpected text after the top-level value"));
            }
            return builder.end_container();
        };
        match self.peek() {
            None => Err(self.fail(&format!("unterminated container, expected '{}'", closer as char))),
            Some(c @ (b'}' | b']')) => {
                if c != closer {
                    return Err(self.fail(&format!("mismatched bracket, expected '{}'", closer as char)));
                }
                self.pos += 1;
                self.closers.pop();
                self.skip_separator();
                builder.end_container()
            }
            Some(_) if closer == b'}' => {
                let name = self.read_name()?;
                self.read_value(Some(&name), builder)
            }
            Some(_) => self.read_value(None, builder),
        }
    }
}

/// Writes entries as compact JSON text. An empty pass writes `{}`.
pub struct JsonConsumer {
    buf: String,
    begin: bool,
}

impl Default for JsonConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonConsumer {
    pub fn new() -> Self {
        JsonConsumer {
            buf: String::new(),
            begin: true,
        }
    }

    fn open_item(&mut self, name: Option<&str>) {
        if self.begin {
            self.begin = false;
        } else {
            self.buf.push(',');
        }
        if let Some(name) = name {
            write_quoted(&mut self.buf, name);
            self.buf.push(':');
        }
    }
}

fn write_quoted(buf: &mut String, text: &str) {
    buf.push('"');
    for c in text.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            '\u{8}' => buf.push_str("\\b"),
            '\u{c}' => buf.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

impl EntryConsumer for JsonConsumer {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.open_item(name);
        let buf = &mut self.buf;
        let _ = match value {
            EntryValue::Str(v) => {
                write_quoted(buf, v);
                Ok(())
            }
            EntryValue::I64(v) => write!(buf, "{}", v),
            EntryValue::I32(v) => write!(buf, "{}", v),
            EntryValue::I16(v) => write!(buf, "{}", v),
            EntryValue::I8(v) => write!(buf, "{}", v),
            EntryValue::F64(v) if v.is_finite() => write!(buf, "{:?}", v),
            EntryValue::F32(v) if v.is_finite() => write!(buf, "{:?}", v),
            EntryValue::F64(_) | EntryValue::F32(_) => write!(buf, "null"),
            EntryValue::Bool(v) => write!(buf, "{}", v),
            EntryValue::Bytes(v) => {
                buf.push('[');
                for (ix, byte) in v.iter().enumerate() {
                    if ix > 0 {
                        buf.push(',');
                    }
                    let _ = write!(buf, "{}", byte);
                }
                buf.push(']');
                Ok(())
            }
        };
        Ok(())
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.open_item(name);
        self.buf.push_str("null");
        Ok(())
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        named: bool,
    ) -> Result<(), Error> {
        self.open_item(name);
        self.buf.push(if named { '{' } else { '[' });
        self.begin = true;
        entries.consume(self)?;
        self.buf.push(if named { '}' } else { ']' });
        self.begin = false;
        Ok(())
    }
}

impl EntryOutput for JsonConsumer {
    type Output = String;

    fn output(self) -> Result<String, Error> {
        if self.buf.is_empty() {
            Ok("{}".to_string())
        } else {
            Ok(self.buf)
        }
    }
}

/// Reads and writes JSON-like text.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFactory;

impl ProviderFactory<str> for JsonFactory {
    fn make<'a>(&self, input: &'a str) -> Box<dyn EntryProvider<'a> + 'a> {
        Box::new(JsonProvider::new(input))
    }
}

impl ProviderFactory<String> for JsonFactory {
    fn make<'a>(&self, input: &'a String) -> Box<dyn EntryProvider<'a> + 'a> {
        Box::new(JsonProvider::new(input))
    }
}

impl ConsumerFactory for JsonFactory {
    type Consumer = JsonConsumer;

    fn make(&self) -> JsonConsumer {
        JsonConsumer::new()
    }
}

fn hex4(chars: &mut std::str::CharIndices<'_>) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..4 {
        code = code * 16 + chars.next()?.1.to_digit(16)?;
    }
    Some(code)
}
