//! Plain-text PDF layout: fixed-width Type1 font, word wrapping, and page flow.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::document::RenderError;

const FONT_RESOURCE: &str = "F1";
/// Courier advances every glyph by 600/1000 em.
const GLYPH_WIDTH_PER_MILLE: i64 = 600;

/// Page geometry in PostScript points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub width: i64,
    pub height: i64,
    pub margin: i64,
    pub font_size: i64,
    pub leading: i64,
}

impl Default for PageLayout {
    /// US Letter with one inch margins and 12pt Courier.
    fn default() -> Self {
        Self {
            width: 612,
            height: 792,
            margin: 72,
            font_size: 12,
            leading: 14,
        }
    }
}

impl PageLayout {
    pub fn chars_per_line(&self) -> usize {
        let usable = (self.width - 2 * self.margin).max(0) * 1000;
        let glyph = (self.font_size * GLYPH_WIDTH_PER_MILLE).max(1);
        ((usable / glyph) as usize).max(1)
    }

    pub fn lines_per_page(&self) -> usize {
        let usable = (self.height - 2 * self.margin).max(0);
        ((usable / self.leading.max(1)) as usize).max(1)
    }
}

/// Wrap and split lines into pages. Always yields at least one (possibly blank) page.
pub(crate) fn paginate<'a, I>(lines: I, layout: &PageLayout) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let width = layout.chars_per_line();
    let wrapped: Vec<String> = lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect();

    if wrapped.is_empty() {
        return vec![Vec::new()];
    }

    wrapped
        .chunks(layout.lines_per_page())
        .map(<[String]>::to_vec)
        .collect()
}

/// Break a line at spaces so no piece exceeds `width` characters; words longer than the
/// line are split mid-word.
pub(crate) fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let mut remaining: Vec<char> = word.chars().collect();

        while remaining.len() > width {
            if current_len > 0 {
                wrapped.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let tail = remaining.split_off(width);
            wrapped.push(remaining.into_iter().collect());
            remaining = tail;
        }

        let word_len = remaining.len();
        if word_len == 0 {
            continue;
        }

        if current_len > 0 && current_len + 1 + word_len > width {
            wrapped.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(remaining);
        current_len += word_len;
    }

    if current_len > 0 || wrapped.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

pub(crate) fn encode_pdf(
    pages: &[Vec<String>],
    layout: &PageLayout,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for lines in pages {
        let content = page_content(lines, layout).encode().map_err(encoding_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
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
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(layout.width),
                Object::Integer(layout.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(encoding_error)?;
    Ok(bytes)
}

fn page_content(lines: &[String], layout: &PageLayout) -> Content {
    let first_baseline = layout.height - layout.margin - layout.font_size;
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                Object::Integer(layout.font_size),
            ],
        ),
        Operation::new("TL", vec![Object::Integer(layout.leading)]),
        Operation::new(
            "Td",
            vec![Object::Integer(layout.margin), Object::Integer(first_baseline)],
        ),
    ];

    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi_bytes(line))],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Encode text for the standard WinAnsi font encoding, replacing anything it cannot express.
pub(crate) fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => match c {
                '\u{20AC}' => 0x80,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '\u{2022}' => 0x95,
                '\u{2013}' => 0x96,
                '\u{2014}' => 0x97,
                _ => b'?',
            },
        })
        .collect()
}

fn encoding_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Encoding {
        message: err.to_string(),
    }
}
