//! PDF rendering with printpdf built-in fonts

use crate::error::{Result, ScreenError};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::ReportDocument;

const PT_TO_MM: f32 = 0.352_778;

/// Page geometry in millimetres and font sizes in points
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
    pub font_size: f32,
    pub footer_font_size: f32,
    /// Distance of the footer baseline from the bottom edge
    pub footer_offset: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        // A4
        Self {
            width: 210.0,
            height: 297.0,
            margin: 10.0,
            line_height: 10.0,
            font_size: 12.0,
            footer_font_size: 8.0,
            footer_offset: 10.0,
        }
    }
}

impl PageLayout {
    /// Built-in fonts carry no metrics here, so width is estimated at
    /// half an em per character.
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5 * PT_TO_MM
    }

    fn chars_per_line(&self) -> usize {
        let usable = self.width - 2.0 * self.margin;
        ((usable / (self.font_size * 0.5 * PT_TO_MM)) as usize).max(1)
    }

    /// Lowest baseline body text may use before a page break
    fn bottom_limit(&self) -> f32 {
        self.footer_offset + self.line_height + 5.0
    }
}

/// Greedy word wrap to at most `max_chars` per line.
/// Words longer than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct PdfWriter<'a> {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layout: &'a PageLayout,
    title: String,
    layer: PdfLayerReference,
    page_no: usize,
    /// Baseline of the next line, measured from the bottom edge
    y: f32,
}

impl<'a> PdfWriter<'a> {
    fn new(title: &str, layout: &'a PageLayout) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(layout.width), Mm(layout.height), "Layer 1");
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
            italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_error)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        let mut writer = Self {
            doc,
            fonts,
            layout,
            title: title.to_string(),
            layer,
            page_no: 1,
            y: 0.0,
        };
        writer.decorate_page();
        Ok(writer)
    }

    /// Header title, blank line, and the page number footer
    fn decorate_page(&mut self) {
        let layout = self.layout;
        self.y = layout.height - layout.margin - layout.font_size * PT_TO_MM;
        let title = self.title.clone();
        self.centered(&title, layout.font_size, FontStyle::Bold);
        self.y -= 2.0 * layout.line_height;

        let footer = format!("Page {}", self.page_no);
        let x = (layout.width - layout.text_width(&footer, layout.footer_font_size)) / 2.0;
        self.layer.use_text(
            footer,
            layout.footer_font_size,
            Mm(x),
            Mm(layout.footer_offset),
            &self.fonts.italic,
        );
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(self.layout.width),
            Mm(self.layout.height),
            format!("Page {} Layer 1", self.page_no + 1),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_no += 1;
        self.decorate_page();
    }

    fn ensure_space(&mut self) {
        if self.y < self.layout.bottom_limit() {
            self.new_page();
        }
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.fonts.regular,
            FontStyle::Bold => &self.fonts.bold,
        }
    }

    fn centered(&self, text: &str, size: f32, style: FontStyle) {
        let x = ((self.layout.width - self.layout.text_width(text, size)) / 2.0).max(self.layout.margin);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), self.font(style));
    }

    fn line(&mut self, text: &str, style: FontStyle) {
        self.ensure_space();
        self.layer.use_text(
            text,
            self.layout.font_size,
            Mm(self.layout.margin),
            Mm(self.y),
            self.font(style),
        );
        self.y -= self.layout.line_height;
    }

    fn section_title(&mut self, title: &str) {
        self.line(title, FontStyle::Bold);
        self.y -= self.layout.line_height;
    }

    fn paragraph(&mut self, body: &str) {
        for wrapped in wrap_text(body, self.layout.chars_per_line()) {
            self.line(&wrapped, FontStyle::Regular);
        }
        self.y -= self.layout.line_height / 2.0;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

#[derive(Debug, Clone, Copy)]
enum FontStyle {
    Regular,
    Bold,
}

/// Characters the built-in fonts can show: printable ASCII, Latin-1 and the
/// extra glyphs WinAnsiEncoding places at 0x80..0x9F
fn is_winansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

/// Built-in fonts silently drop anything outside WinAnsi, so such text is
/// refused instead of producing a report that misstates it.
fn check_encodable(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_winansi(*c)) {
        Some(character) => Err(ScreenError::UnsupportedText {
            character,
            text: text.to_string(),
        }),
        None => Ok(()),
    }
}

fn pdf_error(err: impl std::fmt::Display) -> ScreenError {
    ScreenError::ReportError(err.to_string())
}

pub(super) fn render(report: &ReportDocument, layout: &PageLayout) -> Result<Vec<u8>> {
    check_encodable(&report.title)?;
    for section in &report.sections {
        check_encodable(&section.title)?;
        section.lines.iter().try_for_each(|line| check_encodable(line))?;
    }

    let mut writer = PdfWriter::new(&report.title, layout)?;
    for (i, section) in report.sections.iter().enumerate() {
        if i > 0 {
            writer.y -= layout.line_height;
        }
        writer.section_title(&section.title);
        for line in &section.lines {
            writer.paragraph(line);
        }
    }
    writer.finish()
}
