//! Page layout for the cover letter (surat pengantar).
//!
//! The layout is a list of draw operations on an A4 portrait page, in
//! millimetres from the top-left corner. Turning it into a PDF is left to a
//! [`DocumentRenderer`]; the bundled [`PlainTextRenderer`] produces the
//! preview text.

use crate::errors::AppResult;
use crate::locale::long_date;
use crate::models::{Letter, Letterhead};
use serde::{Deserialize, Serialize};

pub const PAGE_CENTER_MM: f32 = 105.0;
const MARGIN_LEFT_MM: f32 = 20.0;
const MARGIN_RIGHT_MM: f32 = 190.0;
const BODY_WIDTH_MM: f32 = 170.0;
const QUOTE_WIDTH_MM: f32 = 160.0;
const PT_TO_MM: f32 = 0.3528;
const GLYPH_EM: f32 = 0.5;
const LINE_HEIGHT: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    #[serde(rename_all = "camelCase")]
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        align: Align,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterDocument {
    pub file_stem: String,
    pub ops: Vec<DrawOp>,
}

impl LetterDocument {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem, extension)
    }
}

/// Turns a laid-out letter into bytes of some document format.
pub trait DocumentRenderer: Send + Sync {
    fn extension(&self) -> &'static str;
    fn render(&self, document: &LetterDocument) -> AppResult<Vec<u8>>;
}

struct Cursor {
    ops: Vec<DrawOp>,
    size: f32,
    weight: FontWeight,
}

impl Cursor {
    fn text(&mut self, x: f32, y: f32, align: Align, text: impl Into<String>) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size: self.size,
            weight: self.weight,
            align,
            text: text.into(),
        });
    }

    /// Left-aligned paragraph wrapped to `max_width` millimetres.
    fn paragraph(&mut self, x: f32, y: f32, max_width: f32, text: &str) {
        let step = self.size * LINE_HEIGHT * PT_TO_MM;
        for (index, line) in wrap(text, max_width, self.size).into_iter().enumerate() {
            self.text(x, y + step * index as f32, Align::Left, line);
        }
    }
}

/// Greedy word wrap using an average Helvetica glyph width.
pub fn wrap(text: &str, max_width_mm: f32, size_pt: f32) -> Vec<String> {
    let glyph_mm = size_pt * GLYPH_EM * PT_TO_MM;
    let max_chars = ((max_width_mm / glyph_mm).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
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
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn layout(letter: &Letter, letterhead: &Letterhead) -> LetterDocument {
    let rt = &letterhead.rt_number;
    let rw = &letterhead.rw_number;
    let locality = format!(
        "Kelurahan {}, Kecamatan {}, Kota {}",
        letterhead.village, letterhead.district, letterhead.city
    );
    let mut page = Cursor {
        ops: Vec::new(),
        size: 14.0,
        weight: FontWeight::Normal,
    };

    page.text(
        PAGE_CENTER_MM,
        15.0,
        Align::Center,
        format!("RUKUN TETANGGA {} / RUKUN WARGA {}", rt, rw),
    );
    page.size = 10.0;
    page.text(PAGE_CENTER_MM, 20.0, Align::Center, locality.clone());
    page.ops.push(DrawOp::Line {
        x1: MARGIN_LEFT_MM,
        y1: 25.0,
        x2: MARGIN_RIGHT_MM,
        y2: 25.0,
    });

    page.size = 14.0;
    page.text(PAGE_CENTER_MM, 40.0, Align::Center, "SURAT PENGANTAR");
    page.size = 12.0;
    page.text(PAGE_CENTER_MM, 47.0, Align::Center, format!("Nomor: {}", letter.number));

    page.paragraph(
        MARGIN_LEFT_MM,
        65.0,
        BODY_WIDTH_MM,
        &format!(
            "Yang bertanda tangan di bawah ini, Ketua RT {}/RW {}, {}, dengan ini menerangkan bahwa:",
            rt, rw, locality
        ),
    );

    let applicant = &letter.applicant;
    for (y, label, value) in [
        (80.0, "Nama", applicant.name.as_str()),
        (87.0, "NIK", applicant.nik.as_str()),
        (94.0, "No. KK", applicant.family_card_number.as_str()),
    ] {
        page.text(MARGIN_LEFT_MM, y, Align::Left, label);
        page.text(60.0, y, Align::Left, format!(": {}", or_dash(value)));
    }

    page.paragraph(
        MARGIN_LEFT_MM,
        110.0,
        BODY_WIDTH_MM,
        "Adalah benar warga kami dan yang bersangkutan mengajukan surat pengantar untuk keperluan:",
    );
    page.weight = FontWeight::Bold;
    page.paragraph(25.0, 120.0, QUOTE_WIDTH_MM, &format!("\"{}\"", letter.purpose));
    page.weight = FontWeight::Normal;
    page.paragraph(
        MARGIN_LEFT_MM,
        135.0,
        BODY_WIDTH_MM,
        "Demikian surat pengantar ini dibuat dengan sebenarnya untuk dapat dipergunakan sebagaimana mestinya.",
    );

    page.text(
        140.0,
        160.0,
        Align::Left,
        format!("{}, {}", letterhead.city, long_date(letter.date)),
    );
    page.text(145.0, 170.0, Align::Left, format!("Ketua RT {}/RW {}", rt, rw));
    page.text(145.0, 190.0, Align::Left, letterhead.chair_name.clone());

    let name = applicant.name.trim();
    LetterDocument {
        file_stem: format!("Surat_Pengantar_{}", if name.is_empty() { "Pemohon" } else { name }),
        ops: page.ops,
    }
}

/// Monospace rendering of a layout, one text row per baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

const TEXT_COLUMNS: usize = 68;
const MM_PER_COLUMN: f32 = BODY_WIDTH_MM / TEXT_COLUMNS as f32;

impl PlainTextRenderer {
    pub fn to_text(&self, document: &LetterDocument) -> String {
        let mut rows: Vec<(f32, String)> = Vec::new();
        for op in &document.ops {
            match op {
                DrawOp::Line { y1, .. } => rows.push((*y1, "-".repeat(TEXT_COLUMNS))),
                DrawOp::Text { x, y, align, text, .. } => {
                    let column = match align {
                        Align::Center => TEXT_COLUMNS.saturating_sub(text.chars().count()) / 2,
                        Align::Left => ((x - MARGIN_LEFT_MM).max(0.0) / MM_PER_COLUMN).round() as usize,
                    };
                    let same_row = rows.last().map(|(last_y, _)| (last_y - y).abs() < 0.5).unwrap_or(false);
                    if !same_row {
                        rows.push((*y, String::new()));
                    }
                    if let Some((_, row)) = rows.last_mut() {
                        let filled = row.chars().count();
                        let pad = column.saturating_sub(filled).max(usize::from(filled > 0));
                        row.push_str(&" ".repeat(pad));
                        row.push_str(text);
                    }
                }
            }
        }

        let mut output = String::new();
        let mut previous_y: Option<f32> = None;
        for (y, row) in rows {
            if previous_y.map(|prev| y - prev > 8.0).unwrap_or(false) {
                output.push('\n');
            }
            output.push_str(row.trim_end());
            output.push('\n');
            previous_y = Some(y);
        }
        output
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &LetterDocument) -> AppResult<Vec<u8>> {
        Ok(self.to_text(document).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::{layout, wrap, DrawOp, FontWeight, PlainTextRenderer};
    use crate::models::{Applicant, Letter, LetterKind, Letterhead};
    use chrono::NaiveDate;

    fn letter(name: &str, purpose: &str) -> Letter {
        Letter {
            id: "surat-1".to_string(),
            number: "001/RT01-RW05/8/2024".to_string(),
            kind: LetterKind::IdentityCard,
            date: NaiveDate::from_ymd_opt(2024, 8, 17).expect("date"),
            applicant: Applicant {
                name: name.to_string(),
                nik: String::new(),
                family_card_number: "3201234567890001".to_string(),
            },
            purpose: purpose.to_string(),
        }
    }

    fn texts_at(ops: &[DrawOp], target_y: f32) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, text, .. } if (*y - target_y).abs() < 0.01 => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("satu dua tiga empat lima enam", 10.0, 12.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "satu dua tiga empat lima enam");
        assert!(wrap("", 170.0, 12.0).is_empty());
    }

    #[test]
    fn places_fields_at_fixed_positions() {
        let doc = layout(&letter("Eko Prasetyo", "Membuat KTP"), &Letterhead::default());
        assert_eq!(texts_at(&doc.ops, 15.0), vec!["RUKUN TETANGGA 01 / RUKUN WARGA 05"]);
        assert_eq!(texts_at(&doc.ops, 47.0), vec!["Nomor: 001/RT01-RW05/8/2024"]);
        assert_eq!(texts_at(&doc.ops, 80.0), vec!["Nama", ": Eko Prasetyo"]);
        assert_eq!(texts_at(&doc.ops, 87.0), vec!["NIK", ": -"]);
        assert_eq!(texts_at(&doc.ops, 160.0), vec!["Jakarta, 17 Agustus 2024"]);
        assert_eq!(texts_at(&doc.ops, 190.0), vec!["Budi Santoso"]);
        assert_eq!(doc.file_name("pdf"), "Surat_Pengantar_Eko Prasetyo.pdf");

        let purpose_is_bold = doc.ops.iter().any(|op| {
            matches!(op, DrawOp::Text { text, weight: FontWeight::Bold, .. } if text == "\"Membuat KTP\"")
        });
        assert!(purpose_is_bold);
    }

    #[test]
    fn blank_applicant_name_falls_back() {
        let doc = layout(&letter("", "x"), &Letterhead::default());
        assert_eq!(doc.file_stem, "Surat_Pengantar_Pemohon");
    }

    #[test]
    fn plain_text_keeps_label_and_value_on_one_row() {
        let doc = layout(&letter("Eko Prasetyo", "Membuat KTP"), &Letterhead::default());
        let text = PlainTextRenderer.to_text(&doc);
        assert!(text.contains("SURAT PENGANTAR"));
        let row = text.lines().find(|line| line.starts_with("Nama")).expect("name row");
        assert!(row.ends_with(": Eko Prasetyo"));
        assert!(text.contains("\"Membuat KTP\""));
    }
}
