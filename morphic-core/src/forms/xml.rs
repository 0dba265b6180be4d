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

//! XML-like text.
//!
//! Every entry is an element named after the entry; unnamed entries are
//! `<i>` elements. `<a/>` is null and `<a></a>` the empty string. All
//! scalars read back as text and rely on the converters' coercions.
//!
//! Names that are not plain element names, and the reserved `i`, are
//! written as `<e k="name">`.
//!
//! An element with child elements is a container. It is positional when
//! all children are `<i>`, or when there are at least two children, none
//! of them keyed, and they all share one name; otherwise it is named.
//! Other attributes, the prolog, comments and the doctype are skipped.

use crate::entry::{
    ConsumerFactory, EnclosedEntries, Entry, EntryBuilder, EntryConsumer, EntryOutput,
    EntryProvider, EntryValue, ProviderFactory,
};
use crate::error::Error;
use std::fmt::Write;

const ITEM: &str = "i";
const KEYED: &str = "e";
const KEY: &str = "k";

#[derive(Debug, Default)]
struct Element {
    /// Tag as written.
    name: String,
    /// Entry name carried by a `<e k="...">` element.
    key: Option<String>,
    children: Vec<Element>,
    text: String,
    self_closed: bool,
}

impl Element {
    fn label(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    fn is_item(&self) -> bool {
        self.key.is_none() && self.name == ITEM
    }

    fn is_object(&self) -> bool {
        let Some(first) = self.children.first() else {
            return false;
        };
        if self.children.iter().all(Element::is_item) {
            return false;
        }
        if self.children.iter().any(|c| c.key.is_some()) {
            return true;
        }
        self.children.len() < 2 || self.children.iter().any(|c| c.name != first.name)
    }
}

impl Drop for Element {
    // drops the subtree iteratively
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Value of attribute `wanted` in the text between a tag name and `>`.
fn attribute<'s>(attrs: &'s str, wanted: &str) -> Option<&'s str> {
    let mut rest = attrs;
    loop {
        let eq = rest.find('=')?;
        let name = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let body = &after[1..];
        let end = body.find(quote)?;
        if name == wanted {
            return Some(&body[..end]);
        }
        rest = &body[end + 1..];
    }
}

/// Whether `name` can be written as a tag and read back unchanged.
fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    name != ITEM
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

struct Parser<'t> {
    text: &'t str,
    pos: usize,
    max_depth: u32,
}

impl<'t> Parser<'t> {
    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn fail(&self, what: &str) -> Error {
        Error::protocol(format!("{} at position {}", what, self.pos))
    }

    fn skip_spaces(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Moves past the next `marker`.
    fn skip_past(&mut self, marker: &str) -> Result<(), Error> {
        match self.rest().find(marker) {
            Some(at) => {
                self.pos += at + marker.len();
                Ok(())
            }
            None => Err(self.fail(&format!("missing '{}'", marker))),
        }
    }

    /// Skips the prolog, comments and the doctype.
    fn skip_misc(&mut self) -> Result<(), Error> {
        loop {
            self.skip_spaces();
            let rest = self.rest();
            if rest.starts_with("<?") {
                self.skip_past("?>")?;
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if rest.starts_with("<!") && !rest.starts_with("<![CDATA[") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<String, Error> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.fail("expected an element name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    /// Reads `<name attrs>` or `<name attrs/>` with the cursor on `<`.
    fn read_open_tag(&mut self) -> Result<Element, Error> {
        self.pos += 1;
        let name = self.read_name()?;
        let mut quote: Option<char> = None;
        for (offset, c) in self.rest().char_indices() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '>') => {
                    let attrs = &self.rest()[..offset];
                    let self_closed = attrs.trim_end().ends_with('/');
                    let key = if name == KEYED {
                        attribute(attrs, KEY).map(unescape)
                    } else {
                        None
                    };
                    self.pos += offset + 1;
                    return Ok(Element {
                        name,
                        key,
                        children: Vec::new(),
                        text: String::new(),
                        self_closed,
                    });
                }
                (None, _) => {}
            }
        }
        Err(self.fail(&format!("unterminated tag <{}>", name)))
    }

    fn parse(mut self) -> Result<Element, Error> {
        self.skip_misc()?;
        if !self.rest().starts_with('<') {
            return Err(if self.rest().is_empty() {
                Error::protocol("empty input")
            } else {
                self.fail("expected an element")
            });
        }
        let root = self.read_open_tag()?;
        let root = if root.self_closed {
            root
        } else {
            self.read_content(root)?
        };
        self.skip_misc()?;
        if !self.rest().is_empty() {
            return Err(self.fail("unexpected text after the root element"));
        }
        Ok(root)
    }

    /// Reads the content of `open` up to its closing tag. Nesting is
    /// tracked on an explicit stack, at most `max_depth` containers deep.
    fn read_content(&mut self, open: Element) -> Result<Element, Error> {
        let mut stack = vec![open];
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                let name = stack.last().map_or("", |e| e.name.as_str());
                return Err(self.fail(&format!("unterminated element <{}>", name)));
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let name = self.read_name()?;
                self.skip_past(">")?;
                let Some(done) = stack.pop() else {
                    return Err(self.fail("unbalanced closing tag"));
                };
                if done.name != name {
                    return Err(self.fail(&format!(
                        "closing tag </{}> does not match <{}>",
                        name, done.name
                    )));
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            } else if rest.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if let Some(cdata) = rest.strip_prefix("<![CDATA[") {
                let Some(end) = cdata.find("]]>") else {
                    return Err(self.fail("unterminated CDATA section"));
                };
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&cdata[..end]);
                }
                self.pos += "<![CDATA[".len() + end + "]]>".len();
            } else if rest.starts_with('<') {
                let child = self.read_open_tag()?;
                if child.self_closed {
                    if let Some(current) = stack.last_mut() {
                        current.children.push(child);
                    }
                } else {
                    stack.push(child);
                    if stack.len() > self.max_depth as usize + 1 {
                        return Err(Error::depth_exceed(format!(
                            "element nesting exceeds the limit of {} at position {}",
                            self.max_depth, self.pos
                        )));
                    }
                }
            } else {
                let len = rest.find('<').unwrap_or(rest.len());
                let text = unescape(&rest[..len]);
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
                self.pos += len;
            }
        }
    }
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let Some(end) = rest.find(';') else {
            break;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Reads XML-like text. The document is parsed on the first step, so
/// malformed input fails the pass that reads it.
pub struct XmlProvider<'a> {
    text: &'a str,
    root: Option<Element>,
    open: Vec<std::vec::IntoIter<Element>>,
    started: bool,
}

impl<'a> XmlProvider<'a> {
    pub fn new(text: &'a str) -> Self {
        XmlProvider {
            text,
            root: None,
            open: Vec::new(),
            started: false,
        }
    }

    fn emit(
        &mut self,
        mut element: Element,
        builder: &mut dyn EntryBuilder<'a>,
    ) -> Result<Entry, Error> {
        let name = Some(element.label());
        if element.self_closed {
            return builder.null_entry(name);
        }
        if element.children.is_empty() {
            return builder.entry(name, EntryValue::Str(&element.text));
        }
        let named = element.is_object();
        let entry = builder.start_container(name, named, None)?;
        self.open.push(std::mem::take(&mut element.children).into_iter());
        Ok(entry)
    }
}

impl<'a> EntryProvider<'a> for XmlProvider<'a> {
    fn next_entry(
        &mut self,
        builder: &mut dyn EntryBuilder<'a>,
        _want_name: bool,
    ) -> Result<Entry, Error> {
        if !self.started {
            self.started = true;
            let parser = Parser {
                text: self.text,
                pos: 0,
                max_depth: builder.context().max_depth,
            };
            self.root = Some(parser.parse()?);
        }
        if let Some(root) = self.root.take() {
            return self.emit(root, builder);
        }
        let next = match self.open.last_mut() {
            Some(children) => children.next(),
            None => return builder.end_container(),
        };
        match next {
            Some(child) => self.emit(child, builder),
            None => {
                self.open.pop();
                builder.end_container()
            }
        }
    }
}

/// Writes entries as XML-like text.
#[derive(Default)]
pub struct XmlConsumer {
    buf: String,
}

impl XmlConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    fn tag(name: Option<&str>) -> &str {
        match name {
            None => ITEM,
            Some(name) if is_plain_name(name) => name,
            Some(_) => KEYED,
        }
    }

    /// Writes `<tag` and the key attribute, leaving the tag open.
    fn start_tag(&mut self, name: Option<&str>) {
        self.buf.push('<');
        self.buf.push_str(Self::tag(name));
        if let Some(name) = name.filter(|n| !is_plain_name(n)) {
            self.buf.push(' ');
            self.buf.push_str(KEY);
            self.buf.push_str("=\"");
            self.push_text(name);
            self.buf.push('"');
        }
    }

    fn open(&mut self, name: Option<&str>) {
        self.start_tag(name);
        self.buf.push('>');
    }

    fn close(&mut self, name: Option<&str>) {
        self.buf.push_str("</");
        self.buf.push_str(Self::tag(name));
        self.buf.push('>');
    }

    fn push_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '&' => self.buf.push_str("&amp;"),
                '<' => self.buf.push_str("&lt;"),
                '>' => self.buf.push_str("&gt;"),
                '"' => self.buf.push_str("&quot;"),
                c => self.buf.push(c),
            }
        }
    }
}

impl EntryConsumer for XmlConsumer {
    fn consume_entry(&mut self, name: Option<&str>, value: EntryValue<'_>) -> Result<(), Error> {
        self.open(name);
        match value {
            EntryValue::Str(v) => self.push_text(v),
            EntryValue::F64(v) => {
                let _ = write!(self.buf, "{:?}", v);
            }
            EntryValue::F32(v) => {
                let _ = write!(self.buf, "{:?}", v);
            }
            EntryValue::Bytes(v) => {
                for byte in v {
                    let _ = write!(self.buf, "<{0}>{1}</{0}>", ITEM, byte);
                }
            }
            other => {
                let _ = write!(self.buf, "{}", other);
            }
        }
        self.close(name);
        Ok(())
    }

    fn consume_null(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.start_tag(name);
        self.buf.push_str("/>");
        Ok(())
    }

    fn consume_container(
        &mut self,
        name: Option<&str>,
        entries: &mut dyn EnclosedEntries,
        _named: bool,
    ) -> Result<(), Error> {
        self.open(name);
        entries.consume(self)?;
        self.close(name);
        Ok(())
    }
}

impl EntryOutput for XmlConsumer {
    type Output = String;

    fn output(self) -> Result<String, Error> {
        Ok(self.buf)
    }
}

/// Reads and writes XML-like text.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlFactory;

impl ProviderFactory<str> for XmlFactory {
    fn make<'a>(&self, input: &'a str) -> Box<dyn EntryProvider<'a> + 'a> {
        Box::new(XmlProvider::new(input))
    }
}

impl ProviderFactory<String> for XmlFactory {
    fn make<'a>(&self, input: &'a String) -> Box<dyn EntryProvider<'a> + 'a> {
        Box::new(XmlProvider::new(input))
    }
}

impl ConsumerFactory for XmlFactory {
    type Consumer = XmlConsumer;

    fn make(&self) -> XmlConsumer {
        XmlConsumer::new()
    }
}
