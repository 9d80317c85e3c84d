//! PDF text extraction with `lopdf`.
//!
//! Walks each page's content stream, tracking the text font (`Tf`), the
//! text position (`Tm`, `Td`, `TD`, `T*`, `TL`) and the text-showing
//! operators (`Tj`, `TJ`, `'`, `"`). Runs that share a baseline and a
//! font become one fragment per line. This is not a layout engine: glyph
//! widths are ignored and CID-keyed fonts come out as whatever bytes the
//! stream holds.

use std::collections::HashMap;
use std::path::Path;

use docsage_core::{Error, Fragment, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::loader::{DocumentLoader, LoadedDocument};

/// Kerning adjustments in a `TJ` array beyond this many thousandths of an
/// em are read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Resource dictionaries are inherited through at most this many `Parent` links.
const MAX_PARENT_DEPTH: usize = 16;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let doc = Document::load(path)
            .map_err(|e| Error::DocumentLoad(format!("{}: {}", path.display(), e)))?;

        let title = document_title(&doc);
        let mut fragments = Vec::new();

        for (page_no, page_id) in doc.get_pages() {
            let fonts = page_fonts(&doc, page_id);
            let content = match doc
                .get_page_content(page_id)
                .and_then(|data| Content::decode(&data))
            {
                Ok(content) => content,
                Err(e) => {
                    warn!("{}: skipping page {}: {}", path.display(), page_no, e);
                    continue;
                }
            };
            let page_fragments = PageWalker::new(page_no, &fonts).walk(&content.operations);
            debug!(
                "{}: page {} yielded {} fragments",
                path.display(),
                page_no,
                page_fragments.len()
            );
            fragments.extend(page_fragments);
        }

        Ok(LoadedDocument { title, fragments })
    }
}

/// Tracks the text state of one page and collects line fragments.
struct PageWalker<'a> {
    page: u32,
    fonts: &'a HashMap<Vec<u8>, bool>,
    font_size: f32,
    bold: bool,
    leading: f32,
    line_x: f32,
    line_y: f32,
    scale: f32,
    current: Option<Fragment>,
    done: Vec<Fragment>,
}

impl<'a> PageWalker<'a> {
    fn new(page: u32, fonts: &'a HashMap<Vec<u8>, bool>) -> Self {
        Self {
            page,
            fonts,
            font_size: 0.0,
            bold: false,
            leading: 0.0,
            line_x: 0.0,
            line_y: 0.0,
            scale: 1.0,
            current: None,
            done: Vec::new(),
        }
    }

    fn walk(mut self, operations: &[Operation]) -> Vec<Fragment> {
        for op in operations {
            self.apply(op);
        }
        self.flush();
        self.done
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                self.line_x = 0.0;
                self.line_y = 0.0;
                self.scale = 1.0;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.bold = self
                        .fonts
                        .get(name)
                        .copied()
                        .unwrap_or_else(|| is_bold_font_name(&String::from_utf8_lossy(name)));
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    self.line_x += tx * self.scale;
                    self.line_y += ty * self.scale;
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                }
            }
            "Tm" => {
                let m: Vec<f32> = operands.iter().filter_map(number).collect();
                if m.len() == 6 {
                    self.line_x = m[4];
                    self.line_y = m[5];
                    self.scale = if m[3] != 0.0 {
                        m[3].abs()
                    } else if m[0] != 0.0 {
                        m[0].abs()
                    } else {
                        1.0
                    };
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(string_operand) {
                    self.show(&text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(text) = operands.first().and_then(string_operand) {
                    self.show(&text);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(text) = operands.get(2).and_then(string_operand) {
                    self.show(&text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut text = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                            other => {
                                if number(other).is_some_and(|n| n < -TJ_SPACE_THRESHOLD) {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                    self.show(&text);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading * self.scale;
    }

    fn show(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let size = self.font_size * self.scale;
        if let Some(current) = self.current.as_mut() {
            let same_line = (current.position.y - self.line_y).abs() <= (size * 0.5).max(1.0);
            let same_font = current.is_bold == self.bold && (current.font_size - size).abs() < 0.5;
            if same_line && same_font {
                if !current.text.ends_with(' ') && !text.starts_with(' ') {
                    current.text.push(' ');
                }
                current.text.push_str(text);
                return;
            }
        }
        self.flush();
        if text.trim().is_empty() {
            return;
        }
        self.current =
            Some(Fragment::new(text, self.page, size, self.bold).at(self.line_x, self.line_y));
    }

    fn flush(&mut self) {
        if let Some(mut fragment) = self.current.take() {
            fragment.text = fragment.text.split_whitespace().collect::<Vec<_>>().join(" ");
            if fragment.is_well_formed() {
                self.done.push(fragment);
            }
        }
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn string_operand(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

/// UTF-16BE when the string carries a byte-order mark, Windows-1252 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (text, _) = encoding_rs::UTF_16BE.decode_without_bom_handling(rest);
        text.into_owned()
    } else {
        let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

/// Heuristic weight detection from a PostScript font name.
pub fn is_bold_font_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|w| lower.contains(w))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).and_then(|o| o.as_dict().ok())
}

/// Font resource name → bold flag, walking up inherited resources.
fn page_fonts(doc: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, bool> {
    let mut fonts = HashMap::new();
    let mut node = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = node {
        let font_dict = dict
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve_dict(doc, r))
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|f| resolve_dict(doc, f));
        if let Some(font_dict) = font_dict {
            for (name, font) in font_dict.iter() {
                let bold = resolve_dict(doc, font)
                    .and_then(|fd| fd.get(b"BaseFont").ok())
                    .and_then(|base| match base {
                        Object::Name(n) => Some(is_bold_font_name(&String::from_utf8_lossy(n))),
                        _ => None,
                    })
                    .unwrap_or(false);
                fonts.entry(name.clone()).or_insert(bold);
            }
        }

        depth += 1;
        if depth >= MAX_PARENT_DEPTH {
            break;
        }
        node = dict.get(b"Parent").ok().and_then(|p| resolve_dict(doc, p));
    }

    fonts
}

fn document_title(doc: &Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok().and_then(|o| resolve_dict(doc, o))?;
    match info.get(b"Title").ok().and_then(|t| resolve(doc, t))? {
        Object::String(bytes, _) => {
            let title = decode_pdf_string(bytes).trim().to_string();
            (!title.is_empty()).then_some(title)
        }
        _ => None,
    }
}
