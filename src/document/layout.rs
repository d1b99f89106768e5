//! Paginated layout of an [`AnswerSet`] onto A4 pages.
//!
//! Layout is a pure function of the answers and the geometry: the same input
//! always produces the same pages. The vertical cursor is threaded through
//! each step by value while pages accumulate in a sink.

use super::metrics::{FontWeight, wrap};
use crate::form::{AnswerSet, QUESTIONS, Question, QuestionKind, Section};

pub const DOCUMENT_TITLE: &str = "Formulario de Preadopción";
pub const PERSONAL_HEADING: &str = "Datos del Adoptante";
pub const QUESTIONNAIRE_HEADING: &str = "Cuestionario";
/// Printed for any unanswered item.
pub const NO_ANSWER: &str = "Sin respuesta";

/// Page geometry and typography, all lengths in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Space between the two personal-data columns.
    pub column_gap: f64,
    pub title_line_height: f64,
    pub body_line_height: f64,
    /// Extra space under each personal-data row.
    pub row_gutter: f64,
    /// Extra space under each questionnaire item.
    pub item_spacing: f64,
    pub section_gap: f64,
    pub heading_advance: f64,
    pub document_title_y: f64,
    pub first_section_y: f64,
    /// Where content resumes on a continuation page.
    pub page_top: f64,
    /// Minimum room left before a section heading.
    pub section_break_threshold: f64,
    /// Minimum room left before a questionnaire item.
    pub item_break_threshold: f64,
    pub document_title_size: f64,
    pub heading_size: f64,
    pub item_title_size: f64,
    pub item_body_size: f64,
}

impl LayoutGeometry {
    pub const A4: Self = Self {
        page_width: 210.0,
        page_height: 297.0,
        margin: 15.0,
        column_gap: 10.0,
        title_line_height: 4.5,
        body_line_height: 4.0,
        row_gutter: 4.0,
        item_spacing: 5.0,
        section_gap: 5.0,
        heading_advance: 7.0,
        document_title_y: 15.0,
        first_section_y: 25.0,
        page_top: 15.0,
        section_break_threshold: 20.0,
        item_break_threshold: 25.0,
        document_title_size: 16.0,
        heading_size: 12.0,
        item_title_size: 10.0,
        item_body_size: 9.0,
    };

    /// Width of one personal-data column.
    #[must_use]
    pub fn column_width(&self) -> f64 {
        self.page_width / 2.0 - self.margin - self.column_gap / 2.0
    }

    #[must_use]
    pub fn right_column_x(&self) -> f64 {
        self.page_width / 2.0 + self.column_gap / 2.0
    }

    /// Width available to a full-width questionnaire item.
    #[must_use]
    pub fn full_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Current page index and vertical offset from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page: usize,
    pub y: f64,
}

impl LayoutCursor {
    #[must_use]
    pub fn advance(self, dy: f64) -> Self {
        Self {
            page: self.page,
            y: self.y + dy,
        }
    }

    #[must_use]
    pub fn next_page(self, top: f64) -> Self {
        Self {
            page: self.page + 1,
            y: top,
        }
    }

    #[must_use]
    pub fn remaining(self, page_height: f64) -> f64 {
        page_height - self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const ANSWER_GRAY: Self = Self(80, 80, 80);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the horizontal centre of each line.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub weight: FontWeight,
    pub size_pt: f64,
    pub color: Rgb,
}

/// Lines drawn from `y` downward, `line_height` apart. `y` is the baseline of
/// the first line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
    pub line_height: f64,
    pub style: TextStyle,
    pub align: Align,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl GeneratedDocument {
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every line on every page, in drawing order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .flat_map(|b| b.lines.iter().map(String::as_str))
    }

    /// Page index and first block whose lines, rejoined with spaces, read
    /// `text`.
    #[must_use]
    pub fn find_block(&self, text: &str) -> Option<(usize, &TextBlock)> {
        self.pages.iter().enumerate().find_map(|(index, page)| {
            page.blocks
                .iter()
                .find(|b| b.lines.join(" ") == text)
                .map(|b| (index, b))
        })
    }
}

/// Wrapped title and answer of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredItem {
    pub title: Vec<String>,
    pub body: Vec<String>,
    pub height: f64,
}

/// Wrap an item's title and answer to `width` and total their height.
#[must_use]
pub fn measure_item(title: &str, body: &str, width: f64, geometry: &LayoutGeometry) -> MeasuredItem {
    let title = wrap(title, FontWeight::Bold, geometry.item_title_size, width);
    let body = wrap(body, FontWeight::Regular, geometry.item_body_size, width);
    #[allow(clippy::cast_precision_loss)]
    let height = title.len() as f64 * geometry.title_line_height
        + body.len() as f64 * geometry.body_line_height;
    MeasuredItem {
        title,
        body,
        height,
    }
}

/// The text printed as the answer to `question`.
#[must_use]
pub fn answer_text(question: &Question, answers: &AnswerSet) -> String {
    if question.kind == QuestionKind::FileMarker {
        let count = answers.attached_files();
        return if count > 0 {
            format!("{count} archivo(s) adjunto(s)")
        } else {
            NO_ANSWER.to_string()
        };
    }

    let value = answers.get(question.id);
    if value.trim().is_empty() {
        NO_ANSWER.to_string()
    } else {
        value.to_string()
    }
}

struct PageSink<'g> {
    geometry: &'g LayoutGeometry,
    pages: Vec<Page>,
}

impl<'g> PageSink<'g> {
    fn new(geometry: &'g LayoutGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
        }
    }

    fn push(&mut self, page: usize, block: TextBlock) {
        while self.pages.len() <= page {
            self.pages.push(Page::default());
        }
        self.pages[page].blocks.push(block);
    }

    fn heading(&mut self, text: &str, cursor: LayoutCursor) -> LayoutCursor {
        self.push(
            cursor.page,
            TextBlock {
                x: self.geometry.margin,
                y: cursor.y,
                lines: vec![text.to_string()],
                line_height: self.geometry.title_line_height,
                style: TextStyle {
                    weight: FontWeight::Bold,
                    size_pt: self.geometry.heading_size,
                    color: Rgb::BLACK,
                },
                align: Align::Left,
            },
        );
        cursor.advance(self.geometry.heading_advance)
    }

    /// Draw a measured item with its top at `cursor`.
    fn item(&mut self, item: MeasuredItem, x: f64, cursor: LayoutCursor) {
        let g = self.geometry;
        #[allow(clippy::cast_precision_loss)]
        let title_height = item.title.len() as f64 * g.title_line_height;

        self.push(
            cursor.page,
            TextBlock {
                x,
                y: cursor.y,
                lines: item.title,
                line_height: g.title_line_height,
                style: TextStyle {
                    weight: FontWeight::Bold,
                    size_pt: g.item_title_size,
                    color: Rgb::BLACK,
                },
                align: Align::Left,
            },
        );
        self.push(
            cursor.page,
            TextBlock {
                x,
                y: cursor.y + title_height,
                lines: item.body,
                line_height: g.body_line_height,
                style: TextStyle {
                    weight: FontWeight::Regular,
                    size_pt: g.item_body_size,
                    color: Rgb::ANSWER_GRAY,
                },
                align: Align::Left,
            },
        );
    }

    fn finish(self) -> GeneratedDocument {
        GeneratedDocument {
            page_width: self.geometry.page_width,
            page_height: self.geometry.page_height,
            pages: self.pages,
        }
    }
}

fn item_title(question: &Question) -> String {
    format!("{}:", question.label)
}

/// Two-column rows; an odd item out still advances by its own height.
fn personal_rows(
    sink: &mut PageSink<'_>,
    items: &[&Question],
    answers: &AnswerSet,
    cursor: LayoutCursor,
) -> LayoutCursor {
    let g = *sink.geometry;
    let width = g.column_width();

    let mut cursor = cursor;
    for row in items.chunks(2) {
        let measured: Vec<MeasuredItem> = row
            .iter()
            .map(|q| measure_item(&item_title(q), &answer_text(q, answers), width, &g))
            .collect();
        let row_height = measured.iter().map(|m| m.height).fold(0.0, f64::max);

        for (column, item) in measured.into_iter().enumerate() {
            let x = if column == 0 { g.margin } else { g.right_column_x() };
            sink.item(item, x, cursor);
        }
        cursor = cursor.advance(row_height + g.row_gutter);
    }
    cursor
}

fn questionnaire_items(
    sink: &mut PageSink<'_>,
    answers: &AnswerSet,
    cursor: LayoutCursor,
) -> LayoutCursor {
    let g = *sink.geometry;
    let width = g.full_width();

    QUESTIONS
        .iter()
        .filter(|q| q.section == Section::Questionnaire)
        .fold(cursor, |cursor, question| {
            let cursor = if cursor.remaining(g.page_height) < g.item_break_threshold {
                cursor.next_page(g.page_top)
            } else {
                cursor
            };
            let item = measure_item(question.label, &answer_text(question, answers), width, &g);
            let advance = item.height + g.item_spacing;
            sink.item(item, g.margin, cursor);
            cursor.advance(advance)
        })
}

/// Lay out the full questionnaire: title, personal data in two columns, then
/// every questionnaire item at full width, breaking pages as needed.
#[must_use]
pub fn render(answers: &AnswerSet, geometry: &LayoutGeometry) -> GeneratedDocument {
    let g = geometry;
    let mut sink = PageSink::new(g);

    sink.push(
        0,
        TextBlock {
            x: g.page_width / 2.0,
            y: g.document_title_y,
            lines: vec![DOCUMENT_TITLE.to_string()],
            line_height: g.title_line_height,
            style: TextStyle {
                weight: FontWeight::Bold,
                size_pt: g.document_title_size,
                color: Rgb::BLACK,
            },
            align: Align::Center,
        },
    );

    let cursor = LayoutCursor {
        page: 0,
        y: g.first_section_y,
    };
    let cursor = sink.heading(PERSONAL_HEADING, cursor);
    let personal: Vec<&Question> = QUESTIONS
        .iter()
        .filter(|q| q.section == Section::Personal)
        .collect();
    let cursor = personal_rows(&mut sink, &personal, answers, cursor);

    let cursor = cursor.advance(g.section_gap);
    let cursor = if cursor.remaining(g.page_height) < g.section_break_threshold {
        cursor.next_page(g.page_top)
    } else {
        cursor
    };
    let cursor = sink.heading(QUESTIONNAIRE_HEADING, cursor);
    questionnaire_items(&mut sink, answers, cursor);

    sink.finish()
}
