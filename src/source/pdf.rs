//! Token extraction from PDF content streams using lopdf.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::{Color, PageSource, SourceLoader, Token};
use crate::error::{Error, Result};

/// Approximate glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Ascender height as a fraction of the font size.
const ASCENT_RATIO: f32 = 0.8;

/// Descender depth as a fraction of the font size.
const DESCENT_RATIO: f32 = 0.2;

/// TJ adjustments (thousandths of text space) beyond this insert a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Page height used when no MediaBox can be resolved (US Letter).
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// A PDF document opened for token extraction.
///
/// The file is parsed once on open; the handle is released on drop.
pub struct PdfSource {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(page_index + 1, self.pages.len()))
    }

    /// Height of the page's MediaBox, inherited from the page tree if needed.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut dict = match self.doc.get_dictionary(page_id) {
            Ok(dict) => dict,
            Err(_) => return DEFAULT_PAGE_HEIGHT,
        };

        loop {
            if let Ok(media_box) = dict.get(b"MediaBox") {
                let media_box = match media_box {
                    Object::Reference(id) => self.doc.get_object(*id).ok(),
                    other => Some(other),
                };
                if let Some(Ok(values)) = media_box.map(|o| o.as_array()) {
                    let nums: Vec<f32> = values.iter().filter_map(get_number).collect();
                    if nums.len() >= 4 {
                        return nums[3] - nums[1];
                    }
                }
            }

            let parent = dict
                .get(b"Parent")
                .and_then(|p| p.as_reference())
                .and_then(|id| self.doc.get_dictionary(id));
            match parent {
                Ok(parent) => dict = parent,
                Err(_) => return DEFAULT_PAGE_HEIGHT,
            }
        }
    }

    /// Get the decompressed page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without a content stream is blank.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    let data = s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        content
    }

    /// Run the content stream of a page and collect word tokens.
    fn interpret(
        &self,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        page_height: f32,
    ) -> Result<Vec<Token>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut tokens = Vec::new();
        let mut state = TextState::default();
        let mut color_stack: Vec<Option<Color>> = Vec::new();
        let mut in_text_block = false;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => color_stack.push(state.color.clone()),
                "Q" => {
                    if let Some(color) = color_stack.pop() {
                        state.color = color;
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => {
                    let components: Vec<f32> = operands.iter().filter_map(get_number).collect();
                    state.color = if components.is_empty() {
                        None
                    } else {
                        Some(Color(components))
                    };
                }
                "BT" => {
                    in_text_block = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(key) = &operands[0] {
                            state.font_key = key.clone();
                            state.font_name = fonts
                                .get(key.as_slice())
                                .and_then(|f| f.get(b"BaseFont").ok())
                                .and_then(|o| o.as_name().ok())
                                .map(|n| String::from_utf8_lossy(n).to_string())
                                .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        }
                        state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        state.matrix.translate(tx, ty);
                    }
                }
                "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        state.leading = -ty;
                        state.matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if operands.len() >= 6 {
                        state.matrix.set(
                            get_number(&operands[0]).unwrap_or(1.0),
                            get_number(&operands[1]).unwrap_or(0.0),
                            get_number(&operands[2]).unwrap_or(0.0),
                            get_number(&operands[3]).unwrap_or(1.0),
                            get_number(&operands[4]).unwrap_or(0.0),
                            get_number(&operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => state.matrix.translate(0.0, -state.leading),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        state.matrix.translate(0.0, -state.leading);
                    }
                    if !in_text_block {
                        continue;
                    }

                    let run = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(items)) => self.decode_array(items, fonts, &state),
                            _ => Run::default(),
                        },
                        "\"" => self.decode_operand(operands.get(2), fonts, &state),
                        _ => self.decode_operand(operands.first(), fonts, &state),
                    };

                    state.emit(&run.text, page_height, &mut tokens);
                    state
                        .matrix
                        .advance(-run.adjustment / 1000.0 * state.font_size);
                }
                _ => {}
            }
        }

        Ok(tokens)
    }

    fn decode_operand(
        &self,
        operand: Option<&Object>,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
    ) -> Run {
        match operand {
            Some(Object::String(bytes, _)) => Run {
                text: self.decode_text(fonts, &state.font_key, bytes),
                adjustment: 0.0,
            },
            _ => Run::default(),
        }
    }

    /// Join the strings of a TJ array into one run. Large negative
    /// adjustments become word breaks; the rest only move the pen.
    fn decode_array(
        &self,
        items: &[Object],
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        state: &TextState,
    ) -> Run {
        let mut run = Run::default();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    run.text
                        .push_str(&self.decode_text(fonts, &state.font_key, bytes));
                }
                other => {
                    if let Some(n) = get_number(other) {
                        if -n > TJ_SPACE_THRESHOLD {
                            run.text.push(' ');
                        } else {
                            run.adjustment += n;
                        }
                    }
                }
            }
        }
        run
    }

    fn decode_text(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font_key: &[u8],
        bytes: &[u8],
    ) -> String {
        if let Some(font) = fonts.get(font_key) {
            if let Ok(encoding) = font.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>> {
        let page_id = self.page_id(page_index)?;
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        self.interpret(&content, &fonts, self.page_height(page_id))
    }
}

/// Opens documents as [`PdfSource`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl SourceLoader for PdfLoader {
    type Source = PdfSource;

    fn open(&self, path: &Path) -> Result<PdfSource> {
        log::debug!("Opening {}", path.display());
        PdfSource::open(path)
    }
}

/// Text shown by one operator, with the sum of its small TJ adjustments
/// (thousandths of text space).
#[derive(Debug, Default)]
struct Run {
    text: String,
    adjustment: f32,
}

/// Text state carried across content-stream operators.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    color: Option<Color>,
    matrix: TextMatrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            color: None,
            matrix: TextMatrix::default(),
        }
    }
}

impl TextState {
    /// Split shown text into whitespace-separated tokens at the current
    /// position, then advance past it.
    fn emit(&mut self, text: &str, page_height: f32, tokens: &mut Vec<Token>) {
        let size = self.font_size * self.matrix.scale();
        let char_advance = self.font_size * APPROX_CHAR_WIDTH_RATIO;
        let (_, y) = self.matrix.position();
        let top = page_height - (y + size * ASCENT_RATIO);
        let bottom = page_height - (y - size * DESCENT_RATIO);

        let mut word = String::new();
        let mut word_start = 0usize;
        let mut offset = 0usize;
        for c in text.chars() {
            if c.is_whitespace() {
                self.flush(&mut word, word_start, char_advance, top, bottom, size, tokens);
            } else {
                if word.is_empty() {
                    word_start = offset;
                }
                word.push(c);
            }
            offset += 1;
        }
        self.flush(&mut word, word_start, char_advance, top, bottom, size, tokens);

        self.matrix.advance(offset as f32 * char_advance);
    }

    #[allow(clippy::too_many_arguments)]
    fn flush(
        &self,
        word: &mut String,
        start: usize,
        char_advance: f32,
        top: f32,
        bottom: f32,
        size: f32,
        tokens: &mut Vec<Token>,
    ) {
        if word.is_empty() {
            return;
        }
        let (x, _) = self.matrix.offset_position(start as f32 * char_advance);
        tokens.push(Token {
            text: std::mem::take(word),
            top,
            bottom,
            x0: x,
            font_size: size,
            font_name: self.font_name.clone(),
            color: self.color.clone(),
        });
    }
}

/// Text and line matrices for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_e = e;
        self.line_f = f;
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Advance along the baseline by `dx` text-space units.
    fn advance(&mut self, dx: f32) {
        self.e += dx * self.a;
        self.f += dx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn offset_position(&self, dx: f32) -> (f32, f32) {
        (self.e + dx * self.a, self.f + dx * self.b)
    }

    /// Vertical scale factor applied to the font size.
    fn scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Text decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
