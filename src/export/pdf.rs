use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream, StringFormat,
};

use super::{ExportDocument, RenderError};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Helvetica advance widths (AFM, 1/1000 em) for WinAnsi codes 32..=255.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350,
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Helvetica-Bold advance widths (AFM, 1/1000 em) for WinAnsi codes 32..=255.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 350,
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => REGULAR_FONT,
            Face::Bold => BOLD_FONT,
        }
    }

    fn glyph_width(self, code: u8) -> u16 {
        let widths = match self {
            Face::Regular => &HELVETICA_WIDTHS,
            Face::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        widths[code.saturating_sub(32) as usize]
    }

    /// Width of `text` in points once encoded, at `size`.
    fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_text(text)
            .into_iter()
            .map(|code| u32::from(self.glyph_width(code)))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Page geometry and typography the résumé is laid out with.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub line_spacing: f32,
}

impl Default for PageTemplate {
    /// A4 portrait with 2cm margins.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: 56.0,
            title_size: 22.0,
            heading_size: 14.0,
            body_size: 11.0,
            line_spacing: 1.35,
        }
    }
}

impl PageTemplate {
    fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn font(&self, style: Style) -> (Face, f32) {
        match style {
            Style::Title => (Face::Bold, self.title_size),
            Style::Heading => (Face::Bold, self.heading_size),
            Style::Body => (Face::Regular, self.body_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Title,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Text(Style, String),
    Gap(f32),
}

/// Renders the document to a PDF byte stream.
pub fn render(document: &ExportDocument, template: &PageTemplate) -> Result<Vec<u8>, RenderError> {
    let lines = layout_lines(document, template);
    let pages = paginate(&lines, template);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("content stream: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(template.width),
                Object::Real(template.height),
            ],
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&document.title)),
        "Producer" => Object::string_literal("resume-builder"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Pdf(format!("serialization: {}", e)))?;

    if buffer.is_empty() {
        return Err(RenderError::Pdf("empty output".to_string()));
    }

    tracing::debug!(
        "Rendered PDF '{}' ({} pages, {} bytes)",
        document.title,
        page_count,
        buffer.len()
    );

    Ok(buffer)
}

fn layout_lines(document: &ExportDocument, template: &PageTemplate) -> Vec<Line> {
    let mut lines = Vec::new();
    let push_wrapped = |lines: &mut Vec<Line>, style: Style, text: &str| {
        let (face, size) = template.font(style);
        for line in wrap(text, face, size, template.usable_width()) {
            lines.push(Line::Text(style, line));
        }
    };

    push_wrapped(&mut lines, Style::Title, &document.title);
    lines.push(Line::Gap(template.body_size));

    for section in &document.sections {
        push_wrapped(&mut lines, Style::Heading, &section.title);
        lines.push(Line::Gap(template.body_size * 0.3));
        push_wrapped(&mut lines, Style::Body, &section.content);
        lines.push(Line::Gap(template.body_size));
    }

    lines
}

/// Places lines top to bottom, starting a new page whenever the next line
/// would cross the bottom margin. Returns one operation list per page.
fn paginate(lines: &[Line], template: &PageTemplate) -> Vec<Vec<Operation>> {
    let top = template.height - template.margin;
    let mut pages = Vec::new();
    let mut current: Vec<Operation> = Vec::new();
    let mut y = top;

    for line in lines {
        match line {
            Line::Gap(height) => {
                y -= height;
            }
            Line::Text(style, text) => {
                let (face, size) = template.font(*style);
                let advance = size * template.line_spacing;

                if y - advance < template.margin && !current.is_empty() {
                    pages.push(std::mem::take(&mut current));
                    y = top;
                }
                y -= advance;

                if text.is_empty() {
                    continue;
                }

                current.push(Operation::new("BT", vec![]));
                current.push(Operation::new("Tf", vec![face.resource().into(), Object::Real(size)]));
                current.push(Operation::new(
                    "Td",
                    vec![Object::Real(template.margin), Object::Real(y)],
                ));
                current.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(text), StringFormat::Literal)],
                ));
                current.push(Operation::new("ET", vec![]));
            }
        }
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    pages
}

/// Greedy word wrap by measured glyph widths. Explicit newlines are kept,
/// blank lines survive as empty strings and words wider than a line are split.
fn wrap(text: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let space = face.text_width(" ", size);
    let mut out = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0.0;

        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            let mut word_width = face.text_width(&word, size);

            while word_width > max_width {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                let rest = split_at_width(&mut word, face, size, max_width);
                out.push(std::mem::replace(&mut word, rest));
                word_width = face.text_width(&word, size);
            }
            if word.is_empty() {
                continue;
            }

            if !line.is_empty() && line_width + space + word_width > max_width {
                out.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += space;
            }
            line.push_str(&word);
            line_width += word_width;
        }

        out.push(line);
    }

    if out.is_empty() {
        out.push(String::new());
    }

    out
}

/// Keeps the longest prefix of `word` that fits in `max_width` (at least one
/// character) and returns the remainder.
fn split_at_width(word: &mut String, face: Face, size: f32, max_width: f32) -> String {
    let mut width = 0.0;
    let mut cut = word.len();

    for (index, c) in word.char_indices() {
        let mut buf = [0u8; 4];
        width += face.text_width(c.encode_utf8(&mut buf), size);
        if width > max_width && index > 0 {
            cut = index;
            break;
        }
    }

    word.split_off(cut)
}

/// WinAnsi code for characters outside Latin-1 that the encoding still covers.
fn win_ansi_extra(c: char) -> Option<u8> {
    let code = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Maps text onto the single-byte WinAnsi encoding used by the standard fonts.
/// Characters the encoding lacks become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            c if c.is_control() => b' ',
            c if (0xA0..0x100).contains(&(c as u32)) || (c as u32) < 0x80 => c as u32 as u8,
            c => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}
