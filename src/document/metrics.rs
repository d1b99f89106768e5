//! Standard-14 Helvetica metrics, enough to measure and wrap Spanish text
//! without embedding a font.

/// Points to millimetres.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// Base font name as written into the PDF font dictionary.
    #[must_use]
    pub fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name the page content refers to.
    #[must_use]
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

// Advance widths (1/1000 em) for code points 32..=126.
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Accented Latin letters share the advance width of their base glyph.
fn fold(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        '\t' | '\u{a0}' => ' ',
        other => other,
    }
}

fn glyph_width(ch: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };

    let ch = fold(ch);
    let code = u32::from(ch);
    if (32..=126).contains(&code) {
        return table[(code - 32) as usize];
    }

    match ch {
        '¿' => 611,
        '¡' => 333,
        'º' => 365,
        'ª' => 370,
        '°' => 400,
        _ => 556,
    }
}

fn units(text: &str, weight: FontWeight) -> u64 {
    text.chars()
        .map(|c| u64::from(glyph_width(c, weight)))
        .sum()
}

#[allow(clippy::cast_precision_loss)]
fn units_to_mm(units: u64, size_pt: f64) -> f64 {
    units as f64 / 1000.0 * size_pt * PT_TO_MM
}

/// Width of `word` in font units, or `None` as soon as it passes `limit`.
fn bounded_units(word: &str, weight: FontWeight, limit: u64) -> Option<u64> {
    let mut total = 0u64;
    for ch in word.chars() {
        total += u64::from(glyph_width(ch, weight));
        if total > limit {
            return None;
        }
    }
    Some(total)
}

/// Rendered width of `text` in millimetres.
#[must_use]
pub fn text_width_mm(text: &str, weight: FontWeight, size_pt: f64) -> f64 {
    units_to_mm(units(text, weight), size_pt)
}

/// Break `text` into lines no wider than `max_width_mm`.
///
/// Explicit newlines always break. Words are packed greedily; a single word
/// wider than the line is split between characters. Always yields at least
/// one line.
#[must_use]
pub fn wrap(text: &str, weight: FontWeight, size_pt: f64, max_width_mm: f64) -> Vec<String> {
    let limit = max_units(size_pt, max_width_mm);
    let space = u64::from(glyph_width(' ', weight));
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();
        let mut current_units = 0u64;

        for word in paragraph.split_whitespace() {
            match bounded_units(word, weight, limit) {
                Some(word_units) if current.is_empty() => {
                    current.push_str(word);
                    current_units = word_units;
                }
                Some(word_units) if current_units + space + word_units <= limit => {
                    current.push(' ');
                    current.push_str(word);
                    current_units += space + word_units;
                }
                Some(word_units) => {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                    current_units = word_units;
                }
                None => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    let mut pieces = split_word(word, weight, limit);
                    let (last, last_units) = pieces.pop().unwrap_or_default();
                    lines.extend(pieces.into_iter().map(|(piece, _)| piece));
                    current = last;
                    current_units = last_units;
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Largest unit count that still fits `max_width_mm`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn max_units(size_pt: f64, max_width_mm: f64) -> u64 {
    let per_unit_mm = size_pt * PT_TO_MM / 1000.0;
    if per_unit_mm <= 0.0 {
        return u64::MAX;
    }
    let mut limit = (max_width_mm / per_unit_mm).max(0.0).floor() as u64;
    // Float rounding can land one unit either side of the boundary.
    while limit > 0 && units_to_mm(limit, size_pt) > max_width_mm {
        limit -= 1;
    }
    while units_to_mm(limit + 1, size_pt) <= max_width_mm {
        limit += 1;
    }
    limit
}

fn split_word(word: &str, weight: FontWeight, limit: u64) -> Vec<(String, u64)> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_units = 0u64;

    for ch in word.chars() {
        let width = u64::from(glyph_width(ch, weight));
        if !current.is_empty() && current_units + width > limit {
            pieces.push((std::mem::take(&mut current), current_units));
            current_units = 0;
        }
        current.push(ch);
        current_units += width;
    }

    if !current.is_empty() {
        pieces.push((current, current_units));
    }
    pieces
}
