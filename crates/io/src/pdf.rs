// Federal budget PDF export
//
// Two passes: `layout_federal` places text on US Letter pages (pagination,
// header repeats, truncation) and `render` serializes the pages as a
// text-only PDF using the standard Helvetica fonts.

use std::fmt::Write as _;
use std::path::Path;

use grantbudget_engine::model::FederalRow;
use grantbudget_engine::money::format_whole_dollars;

pub const INCH: f64 = 72.0;
pub const PAGE_WIDTH: f64 = 8.5 * INCH;
pub const PAGE_HEIGHT: f64 = 11.0 * INCH;
pub const TOP: f64 = PAGE_HEIGHT - INCH;
/// Rows start on a new page once the cursor drops below this.
pub const BOTTOM_MARGIN: f64 = INCH;
pub const ROW_HEIGHT: f64 = 0.22 * INCH;
pub const MAX_CATEGORY_CHARS: usize = 60;

pub const TITLE: &str = "Federal Grant Budget (SF-424A Format)";
pub const DEFAULT_ORGANIZATION: &str = "Sample Nonprofit Organization";
pub const DEFAULT_PROGRAM: &str = "Community Support Program";

const LEFT_X: f64 = INCH;
const FEDERAL_X: f64 = 4.1 * INCH;
const NON_FEDERAL_X: f64 = 5.6 * INCH;
const TOTAL_X: f64 = 7.2 * INCH;
const RULE_END_X: f64 = 7.3 * INCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        font: Font,
        size: f64,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    fn text(&mut self, x: f64, y: f64, font: Font, size: f64, text: impl Into<String>) {
        self.ops.push(DrawOp::Text { x, y, font, size, text: text.into() });
    }

    fn text_right(&mut self, right_x: f64, y: f64, font: Font, size: f64, text: &str) {
        let x = right_x - text_width(text, font, size);
        self.text(x, y, font, size, text);
    }

    /// Text of every op, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Line { .. } => None,
            })
            .collect()
    }
}

/// Header block for the federal PDF.
#[derive(Debug, Clone, Default)]
pub struct FederalPdfHeader<'a> {
    pub organization: &'a str,
    pub program_title: &'a str,
    /// Footer line, e.g. "Generated on 2026-10-19 14:05".
    pub generated_on: Option<&'a str>,
}

/// Lay out the federal table on as many pages as needed.
pub fn layout_federal(header: &FederalPdfHeader<'_>, rows: &[FederalRow]) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = Page::default();
    let mut y = TOP;

    page.text(LEFT_X, y, Font::Bold, 14.0, TITLE);
    y -= 0.4 * INCH;

    let organization = non_blank(header.organization, DEFAULT_ORGANIZATION);
    let program = non_blank(header.program_title, DEFAULT_PROGRAM);
    page.text(LEFT_X, y, Font::Regular, 11.0, format!("Organization: {organization}"));
    y -= 0.25 * INCH;
    page.text(LEFT_X, y, Font::Regular, 11.0, format!("Program: {program}"));
    y -= 0.35 * INCH;

    y = column_header(&mut page, y);

    for row in rows {
        if y < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut page));
            y = column_header(&mut page, TOP);
        }

        page.text(LEFT_X, y, Font::Regular, 10.0, truncate_label(row.category.label()));
        page.text_right(FEDERAL_X, y, Font::Regular, 10.0, &format_whole_dollars(row.federal_cents));
        page.text_right(NON_FEDERAL_X, y, Font::Regular, 10.0, &format_whole_dollars(row.non_federal_cents));
        page.text_right(TOTAL_X, y, Font::Regular, 10.0, &format_whole_dollars(row.total_cents));
        y -= ROW_HEIGHT;
    }

    if let Some(footer) = header.generated_on {
        page.text(LEFT_X, 0.6 * INCH, Font::Regular, 8.0, footer);
    }
    pages.push(page);
    pages
}

/// Bold column titles and a rule beneath them. Returns the cursor for the first row.
fn column_header(page: &mut Page, mut y: f64) -> f64 {
    page.text(LEFT_X, y, Font::Bold, 10.0, "Budget Category");
    page.text_right(FEDERAL_X, y, Font::Bold, 10.0, "Federal Share");
    page.text_right(NON_FEDERAL_X, y, Font::Bold, 10.0, "Non-Federal Share");
    page.text_right(TOTAL_X, y, Font::Bold, 10.0, "Total");
    y -= 0.22 * INCH;
    page.ops.push(DrawOp::Line { x1: LEFT_X, y1: y, x2: RULE_END_X, y2: y });
    y - 0.12 * INCH
}

fn truncate_label(label: &str) -> String {
    label.chars().take(MAX_CATEGORY_CHARS).collect()
}

fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize laid-out pages as PDF bytes.
pub fn render(pages: &[Page]) -> Vec<u8> {
    // Object numbers: 1 catalog, 2 page tree, 3-4 fonts, then (page, content) pairs.
    let page_obj = |i: usize| 5 + 2 * i;
    let mut objects: Vec<String> = Vec::with_capacity(4 + 2 * pages.len());

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_obj(i))).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push(font_object("Helvetica"));
    objects.push(font_object("Helvetica-Bold"));

    for (i, page) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            fmt_num(PAGE_WIDTH),
            fmt_num(PAGE_HEIGHT),
            page_obj(i) + 1
        ));
        let stream = content_stream(page);
        objects.push(format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(trailer, "{:010} 00000 n ", offset);
    }
    let _ = write!(
        trailer,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    );
    out.extend_from_slice(trailer.as_bytes());
    out
}

/// Lay out and render the federal table.
pub fn federal_pdf_bytes(header: &FederalPdfHeader<'_>, rows: &[FederalRow]) -> Vec<u8> {
    render(&layout_federal(header, rows))
}

pub fn export_federal(header: &FederalPdfHeader<'_>, rows: &[FederalRow], path: &Path) -> Result<(), String> {
    let pages = layout_federal(header, rows);
    log::debug!("federal PDF: {} page(s) -> {}", pages.len(), path.display());
    std::fs::write(path, render(&pages)).map_err(|e| format!("cannot write {}: {}", path.display(), e))
}

fn font_object(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for op in &page.ops {
        match op {
            DrawOp::Text { x, y, font, size, text } => {
                let _ = writeln!(
                    s,
                    "BT /{} {} Tf {} {} Td ({}) Tj ET",
                    font.resource(),
                    fmt_num(*size),
                    fmt_num(*x),
                    fmt_num(*y),
                    escape_text(text)
                );
            }
            DrawOp::Line { x1, y1, x2, y2 } => {
                let _ = writeln!(
                    s,
                    "{} {} m {} {} l S",
                    fmt_num(*x1),
                    fmt_num(*y1),
                    fmt_num(*x2),
                    fmt_num(*y2)
                );
            }
        }
    }
    s
}

fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// The WinAnsiEncoding byte for `ch`, if the standard fonts can show it.
fn win_ansi(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return (!ch.is_ascii_control()).then_some(ch as u8);
    }
    if ch.is_control() {
        return None;
    }
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
    match &*bytes {
        [b] if !had_errors => Some(*b),
        _ => None,
    }
}

/// Escape a PDF literal string. Characters outside WinAnsi become '?', the
/// rest of the upper half is written as octal escapes.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match win_ansi(ch) {
            Some(b @ (b'(' | b')' | b'\\')) => {
                out.push('\\');
                out.push(b as char);
            }
            Some(b) if b.is_ascii() => out.push(b as char),
            Some(b) => {
                let _ = write!(out, "\\{b:03o}");
            }
            None => out.push('?'),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Font metrics (Helvetica AFM widths, 1/1000 em, ASCII 32..=126)
//
// Accented Latin-1 letters are as wide as their base letter; the few that
// are not borrow an ASCII glyph of the same width.
// ---------------------------------------------------------------------------

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Stand-ins for WinAnsi 0xC0..=0xFF. 0xC6 is handled separately.
const LATIN1_STAND_INS: &[u8; 64] = b"AAAAAA?CEEEEIIIIDNOOOOO+OUUUUYPTaaaaaa%ceeeeiiiionooooo+Tuuuuypy";

fn glyph_width(table: &[u16; 95], byte: u8) -> u32 {
    match byte {
        32..=126 => u32::from(table[usize::from(byte - 32)]),
        // AE
        0xC6 => 1000,
        0xC0..=0xFF => glyph_width(table, LATIN1_STAND_INS[usize::from(byte - 0xC0)]),
        _ => 556,
    }
}

/// Rendered width of `text` in points, as `escape_text` will encode it.
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let table = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    let units: u32 = text
        .chars()
        .map(|c| glyph_width(table, win_ansi(c).unwrap_or(b'?')))
        .sum();
    units as f64 * size / 1000.0
}
