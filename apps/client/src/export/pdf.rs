//! Minimal PDF writer: wrapped text on A4 pages in a standard-14 font.
//!
//! Text is placed the way a `text(x, y, { maxWidth })` call would: the first
//! baseline sits `margin_top` below the top edge at `margin_left`, lines wrap at
//! `max_width`, and output continues on a new page once the bottom margin is hit.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::errors::ExportError;
use crate::export::font_metrics::{get_metrics, FontFamily};

const FONT_RESOURCE: &[u8] = b"F1";

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Page geometry and typography for the report. All lengths in points.
#[derive(Debug, Clone)]
pub struct PdfLayout {
    pub font: FontFamily,
    pub font_size_pt: f32,
    pub line_height_factor: f32,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    pub max_width_pt: f32,
}

impl Default for PdfLayout {
    /// A4, 12pt Helvetica, text at (10mm, 10mm) wrapped at 180mm.
    fn default() -> Self {
        Self {
            font: FontFamily::Helvetica,
            font_size_pt: 12.0,
            line_height_factor: 1.15,
            page_width_pt: mm_to_pt(210.0),
            page_height_pt: mm_to_pt(297.0),
            margin_left_pt: mm_to_pt(10.0),
            margin_top_pt: mm_to_pt(10.0),
            margin_bottom_pt: mm_to_pt(10.0),
            max_width_pt: mm_to_pt(180.0),
        }
    }
}

impl PdfLayout {
    pub fn leading_pt(&self) -> f32 {
        self.font_size_pt * self.line_height_factor
    }

    /// Baselines that fit between the top and bottom margins; never less than one.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height_pt - self.margin_top_pt - self.margin_bottom_pt;
        if usable <= 0.0 {
            return 1;
        }
        (usable / self.leading_pt()).floor() as usize + 1
    }
}

/// Wraps `text` and splits the result into pages. Always yields at least one page.
pub fn paginate(text: &str, layout: &PdfLayout) -> Vec<Vec<String>> {
    let metrics = get_metrics(layout.font);
    let lines = metrics.wrap_text(text, layout.font_size_pt, layout.max_width_pt);
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(layout.lines_per_page())
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Renders `text` into a complete PDF document and returns its bytes.
pub fn render_pdf(title: &str, text: &str, layout: &PdfLayout) -> Result<Vec<u8>, ExportError> {
    let pages = paginate(text, layout);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => layout.font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content = page_content(lines, layout);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.page_width_pt),
            Object::Real(layout.page_height_pt),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal(concat!("jyotish-client ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn page_content(lines: &[String], layout: &PdfLayout) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.to_vec()),
                Object::Real(layout.font_size_pt),
            ],
        ),
        Operation::new("TL", vec![Object::Real(layout.leading_pt())]),
        Operation::new(
            "Td",
            vec![
                Object::Real(layout.margin_left_pt),
                Object::Real(layout.page_height_pt - layout.margin_top_pt),
            ],
        ),
    ];

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
        }
    }

    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Encodes text for a WinAnsi standard font.
///
/// Common typographic punctuation is folded to ASCII; other characters outside
/// Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push(b'\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push(b'"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push(b'-'),
            '\u{2026}' => out.extend_from_slice(b"..."),
            '\u{00A0}' | '\t' => out.push(b' '),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) < 0x7F || (0xA0..=0xFF).contains(&(c as u32)) => out.push(c as u8),
            _ => out.push(b'?'),
        }
    }
    out
}
