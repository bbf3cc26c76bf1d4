//! # Font Metrics
//!
//! Glyph advance widths for text measurement. Layout never draws glyphs, it
//! only needs to know how wide a run of text is at a given size, so a font
//! here is nothing more than an advance table.

use std::collections::HashMap;

use crate::error::{LayoutError, Result};
use crate::model::Typeface;

/// Measures text in the same units as the font size it is given.
pub trait TextMeasure {
    /// Advance width of a single character.
    fn char_width(&self, ch: char, font_size: f64) -> f64;

    /// Width of a string on a single line.
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

/// Every printable character advances by the same fraction of the font size.
///
/// A coarse estimate, but stable and font-independent; 0.5 is close to the
/// average advance of proportional Latin faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformAdvance {
    pub ratio: f64,
}

impl Default for UniformAdvance {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

impl TextMeasure for UniformAdvance {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        if ch.is_control() {
            0.0
        } else {
            self.ratio * font_size
        }
    }
}

/// Advance widths parsed from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl TrueTypeMetrics {
    /// Parse metrics from font data.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Walk the BMP to build the width map
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(TrueTypeMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }

    /// Load a font from a data URI, base64 string or file path.
    pub fn load(src: &str) -> Result<Self> {
        let data = crate::image_loader::read_source_bytes(src).map_err(LayoutError::Font)?;
        Self::from_font_data(&data)
            .ok_or_else(|| LayoutError::Font("Not a TrueType/OpenType font".to_string()))
    }
}

impl TextMeasure for TrueTypeMetrics {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        if ch.is_control() {
            return 0.0;
        }
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }
}

/// The measurer a job asked for.
#[derive(Debug, Clone)]
pub enum FontSource {
    Uniform(UniformAdvance),
    TrueType(TrueTypeMetrics),
}

impl FontSource {
    pub fn from_typeface(typeface: &Typeface) -> Result<Self> {
        match typeface {
            Typeface::Uniform { advance_ratio } => {
                if !advance_ratio.is_finite() || *advance_ratio <= 0.0 {
                    return Err(LayoutError::Font(format!(
                        "advance ratio {} must be positive",
                        advance_ratio
                    )));
                }
                Ok(FontSource::Uniform(UniformAdvance {
                    ratio: *advance_ratio,
                }))
            }
            Typeface::TrueType { src } => Ok(FontSource::TrueType(TrueTypeMetrics::load(src)?)),
        }
    }
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::Uniform(UniformAdvance::default())
    }
}

impl TextMeasure for FontSource {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontSource::Uniform(m) => m.char_width(ch, font_size),
            FontSource::TrueType(m) => m.char_width(ch, font_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_advance_scales_with_size() {
        let m = UniformAdvance::default();
        assert!((m.char_width('W', 10.0) - 5.0).abs() < 1e-9);
        assert!((m.measure("abcd", 4.0) - 8.0).abs() < 1e-9);
        assert_eq!(m.char_width('\n', 10.0), 0.0);
    }

    #[test]
    fn truetype_table_lookup() {
        let mut advance_widths = HashMap::new();
        advance_widths.insert('i', 250);
        advance_widths.insert('m', 800);
        let m = TrueTypeMetrics {
            units_per_em: 1000,
            advance_widths,
            default_advance: 500,
        };
        assert!((m.char_width('i', 10.0) - 2.5).abs() < 1e-9);
        assert!((m.char_width('m', 10.0) - 8.0).abs() < 1e-9);
        // Unmapped characters fall back to the default advance
        assert!((m.char_width('x', 10.0) - 5.0).abs() < 1e-9);
    }

    /// A four-glyph TrueType font: `.notdef`, space, `A` and `B` at 1000
    /// units per em, mapped through a format 6 cmap covering U+0020..U+0042.
    fn tiny_font() -> Vec<u8> {
        fn put(buf: &mut Vec<u8>, values: &[u16]) {
            for v in values {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }

        let mut head = vec![0u8; 54];
        head[18..20].copy_from_slice(&1000u16.to_be_bytes());

        let mut hhea = vec![0u8; 36];
        hhea[34..36].copy_from_slice(&4u16.to_be_bytes());

        let mut maxp = Vec::new();
        put(&mut maxp, &[0x0000, 0x5000, 4]);

        let mut hmtx = Vec::new();
        put(&mut hmtx, &[500, 0, 250, 0, 600, 0, 700, 0]);

        let mut glyphs = [0u16; 35];
        glyphs[0] = 1;
        glyphs[(b'A' - b' ') as usize] = 2;
        glyphs[(b'B' - b' ') as usize] = 3;
        let mut cmap = Vec::new();
        put(&mut cmap, &[0, 1, 3, 1, 0, 12]);
        put(&mut cmap, &[6, 10 + 2 * 35, 0, 0x20, 35]);
        put(&mut cmap, &glyphs);

        let tables: [(&[u8; 4], Vec<u8>); 5] = [
            (b"cmap", cmap),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"maxp", maxp),
        ];

        let mut font = Vec::new();
        put(&mut font, &[0x0001, 0x0000, tables.len() as u16, 0, 0, 0]);
        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend_from_slice(*tag);
            font.extend_from_slice(&0u32.to_be_bytes());
            font.extend_from_slice(&(offset as u32).to_be_bytes());
            font.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        font.extend_from_slice(&body);
        font
    }

    #[test]
    fn advances_come_from_the_font() {
        let m = TrueTypeMetrics::from_font_data(&tiny_font()).unwrap();
        assert_eq!(m.units_per_em, 1000);
        assert_eq!(m.default_advance, 250);
        assert!((m.char_width('A', 10.0) - 6.0).abs() < 1e-9);
        assert!((m.char_width('B', 10.0) - 7.0).abs() < 1e-9);
        assert!((m.char_width(' ', 10.0) - 2.5).abs() < 1e-9);
        // Inside the cmap range but unmapped: the .notdef advance
        assert!((m.char_width('!', 10.0) - 5.0).abs() < 1e-9);
        // Outside the cmap range: the space advance
        assert!((m.char_width('Z', 10.0) - 2.5).abs() < 1e-9);
        assert!((m.measure("AB A", 10.0) - 21.5).abs() < 1e-9);
    }

    #[test]
    fn truetype_typeface_loads_from_data_uri() {
        use base64::Engine;
        let src = format!(
            "data:font/ttf;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(tiny_font())
        );
        let source = FontSource::from_typeface(&Typeface::TrueType { src }).unwrap();
        assert!(matches!(source, FontSource::TrueType(_)));
        assert!((source.char_width('B', 20.0) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn garbage_font_data_is_rejected() {
        assert!(TrueTypeMetrics::from_font_data(&[0, 1, 2, 3]).is_none());
        let err = TrueTypeMetrics::load("data:font/ttf;base64,AAECAw==").unwrap_err();
        assert!(matches!(err, LayoutError::Font(_)));
    }

    #[test]
    fn typeface_dispatch() {
        let source = FontSource::from_typeface(&Typeface::Uniform { advance_ratio: 0.6 }).unwrap();
        assert!((source.char_width('a', 10.0) - 6.0).abs() < 1e-9);
        assert!(FontSource::from_typeface(&Typeface::Uniform { advance_ratio: 0.0 }).is_err());
    }
}
