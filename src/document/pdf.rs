//! Serialize a [`GeneratedDocument`] to PDF bytes with lopdf.
//!
//! Text uses the built-in Helvetica faces with `WinAnsiEncoding`, so no font
//! program is embedded. Layout coordinates are millimetres from the top-left
//! corner; PDF user space is points from the bottom-left.

use super::layout::{Align, GeneratedDocument, TextBlock};
use super::metrics::{FontWeight, text_width_mm};
use crate::error::LayoutError;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

const MM_TO_PT: f64 = 72.0 / 25.4;

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn pt(mm: f64) -> Object {
    real(mm * MM_TO_PT)
}

/// Encode `text` for a `WinAnsiEncoding` font. Characters outside the code
/// page become `?`.
#[must_use]
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            c if (' '..='~').contains(&c) || ('\u{a0}'..='\u{ff}').contains(&c) => {
                u8::try_from(u32::from(c)).unwrap_or(b'?')
            }
            _ => b'?',
        })
        .collect()
}

fn block_operations(block: &TextBlock, page_height: f64) -> Vec<Operation> {
    let style = block.style;
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![style.weight.resource_name().into(), real(style.size_pt)],
        ),
        Operation::new(
            "rg",
            vec![
                real(f64::from(style.color.0) / 255.0),
                real(f64::from(style.color.1) / 255.0),
                real(f64::from(style.color.2) / 255.0),
            ],
        ),
    ];

    for (index, line) in block.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let x = match block.align {
            Align::Left => block.x,
            Align::Center => block.x - text_width_mm(line, style.weight, style.size_pt) / 2.0,
        };
        #[allow(clippy::cast_precision_loss)]
        let y = block.y + index as f64 * block.line_height;

        ops.push(Operation::new(
            "Tm",
            vec![
                real(1.0),
                real(0.0),
                real(0.0),
                real(1.0),
                pt(x),
                pt(page_height - y),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(line), StringFormat::Literal)],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
    ops
}

fn font_object(weight: FontWeight) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => weight.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Serialize the laid-out pages. Each layout page becomes one PDF page, in
/// order.
pub fn encode(document: &GeneratedDocument) -> Result<Vec<u8>, LayoutError> {
    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let regular_id = pdf.add_object(font_object(FontWeight::Regular));
    let bold_id = pdf.add_object(font_object(FontWeight::Bold));
    let fonts_id = pdf.add_object(dictionary! {
        FontWeight::Regular.resource_name() => regular_id,
        FontWeight::Bold.resource_name() => bold_id,
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => fonts_id,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let operations: Vec<Operation> = page
            .blocks
            .iter()
            .flat_map(|block| block_operations(block, document.page_height))
            .collect();
        let content = Content { operations }
            .encode()
            .map_err(|e| LayoutError::Encode(e.to_string()))?;
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content));

        let page_id: ObjectId = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).map_err(|e| LayoutError::Encode(e.to_string()))?;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            pt(document.page_width),
            pt(document.page_height),
        ],
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|e| LayoutError::Encode(e.to_string()))?;
    Ok(bytes)
}
