//! # Text Wrapping
//!
//! Breaks strings into lines that fit a width. The grid paginator and the
//! text flow only see the [`TextWrap`] trait, so callers can plug in their
//! own font-aware wrapper; [`LineBreaker`] is the one this crate ships.

use unicode_linebreak::linebreaks;

use crate::font::{FontSource, TextMeasure};
use crate::model::FontMetrics;

/// A text-wrapping service.
pub trait TextWrap {
    /// Break `text` into lines no wider than `max_width`. Always returns at
    /// least one line; an empty string wraps to a single empty line.
    fn wrap(&self, text: &str, max_width: f64, font: &FontMetrics) -> Vec<String>;

    /// Width of `text` on a single line.
    fn measure(&self, text: &str, font: &FontMetrics) -> f64;
}

/// Map a BCP 47 language tag to hyphenation patterns. English when no tag
/// is given, `None` for languages without patterns.
pub fn resolve_hypher_lang(lang: Option<&str>) -> Option<hypher::Lang> {
    let tag = match lang {
        Some(t) => t,
        None => return Some(hypher::Lang::English),
    };
    let primary = tag.split('-').next().unwrap_or(tag).to_lowercase();
    match primary.as_str() {
        "af" => Some(hypher::Lang::Afrikaans),
        "sq" => Some(hypher::Lang::Albanian),
        "be" => Some(hypher::Lang::Belarusian),
        "bg" => Some(hypher::Lang::Bulgarian),
        "ca" => Some(hypher::Lang::Catalan),
        "hr" => Some(hypher::Lang::Croatian),
        "cs" => Some(hypher::Lang::Czech),
        "da" => Some(hypher::Lang::Danish),
        "nl" => Some(hypher::Lang::Dutch),
        "en" => Some(hypher::Lang::English),
        "et" => Some(hypher::Lang::Estonian),
        "fi" => Some(hypher::Lang::Finnish),
        "fr" => Some(hypher::Lang::French),
        "ka" => Some(hypher::Lang::Georgian),
        "de" => Some(hypher::Lang::German),
        "el" => Some(hypher::Lang::Greek),
        "hu" => Some(hypher::Lang::Hungarian),
        "is" => Some(hypher::Lang::Icelandic),
        "it" => Some(hypher::Lang::Italian),
        "ku" => Some(hypher::Lang::Kurmanji),
        "la" => Some(hypher::Lang::Latin),
        "lt" => Some(hypher::Lang::Lithuanian),
        "mn" => Some(hypher::Lang::Mongolian),
        "nb" | "nn" | "no" => Some(hypher::Lang::Norwegian),
        "pl" => Some(hypher::Lang::Polish),
        "pt" => Some(hypher::Lang::Portuguese),
        "ru" => Some(hypher::Lang::Russian),
        "sr" => Some(hypher::Lang::Serbian),
        "sk" => Some(hypher::Lang::Slovak),
        "sl" => Some(hypher::Lang::Slovenian),
        "es" => Some(hypher::Lang::Spanish),
        "sv" => Some(hypher::Lang::Swedish),
        "tr" => Some(hypher::Lang::Turkish),
        "tk" => Some(hypher::Lang::Turkmen),
        "uk" => Some(hypher::Lang::Ukrainian),
        _ => None,
    }
}

/// Greedy line breaker over UAX #14 break opportunities.
///
/// Words that do not fit on a line of their own are split at syllable
/// boundaries when hyphenation is enabled, and by character otherwise.
#[derive(Debug, Clone, Default)]
pub struct LineBreaker<M = FontSource> {
    measure: M,
    hyphenation: Option<hypher::Lang>,
}

impl<M: TextMeasure> LineBreaker<M> {
    pub fn new(measure: M) -> Self {
        Self {
            measure,
            hyphenation: None,
        }
    }

    pub fn with_hyphenation(mut self, lang: Option<hypher::Lang>) -> Self {
        self.hyphenation = lang;
        self
    }

    pub fn measurer(&self) -> &M {
        &self.measure
    }

    /// Break a string into lines that fit within `max_width`.
    pub fn break_into_lines(&self, text: &str, max_width: f64, font_size: f64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            self.break_paragraph(paragraph, max_width, font_size, &mut lines);
        }
        lines
    }

    fn break_paragraph(
        &self,
        paragraph: &str,
        max_width: f64,
        font_size: f64,
        lines: &mut Vec<String>,
    ) {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            return;
        }

        let mut current = String::new();
        let mut line_width = 0.0;
        let mut seg_start = 0;

        // Each segment is a word plus the whitespace that trails it; the
        // trailing whitespace never counts toward whether the word fits.
        for (seg_end, _) in linebreaks(paragraph) {
            let segment = &paragraph[seg_start..seg_end];
            seg_start = seg_end;
            let word = segment.trim_end();
            let trailing = &segment[word.len()..];
            let word_width = self.measure.measure(word, font_size);

            if !current.is_empty() && line_width + word_width > max_width {
                // Leading indentation alone is dropped rather than emitted
                // as a blank line.
                if !current.trim_end().is_empty() {
                    lines.push(current.trim_end().to_string());
                }
                current.clear();
                line_width = 0.0;
            }

            if current.is_empty() && word_width > max_width {
                let mut pieces = self.break_word(word, max_width, font_size);
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                line_width = self.measure.measure(&last, font_size);
                current = last;
            } else {
                current.push_str(word);
                line_width += word_width;
            }
            current.push_str(trailing);
            line_width += self.measure.measure(trailing, font_size);
        }

        lines.push(current.trim_end().to_string());
    }

    /// Split a word that is wider than a whole line.
    fn break_word(&self, word: &str, max_width: f64, font_size: f64) -> Vec<String> {
        let units: Vec<&str> = match self.hyphenation {
            Some(lang) => hypher::hyphenate(word, lang).collect(),
            None => vec![word],
        };
        let hyphen_width = self.measure.char_width('-', font_size);

        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut width = 0.0;

        for (i, unit) in units.iter().enumerate() {
            let unit_width = self.measure.measure(unit, font_size);
            let is_last = i + 1 == units.len();
            let needed = if is_last {
                unit_width
            } else {
                unit_width + hyphen_width
            };

            if !current.is_empty() && width + needed > max_width {
                // A character-split remainder may already fill the line.
                if width + hyphen_width <= max_width {
                    current.push('-');
                }
                pieces.push(std::mem::take(&mut current));
                width = 0.0;
            }

            if current.is_empty() && needed > max_width {
                // Not even one syllable fits: fall back to characters.
                for ch in unit.chars() {
                    let cw = self.measure.char_width(ch, font_size);
                    if !current.is_empty() && width + cw > max_width {
                        pieces.push(std::mem::take(&mut current));
                        width = 0.0;
                    }
                    current.push(ch);
                    width += cw;
                }
                continue;
            }

            current.push_str(unit);
            width += unit_width;
        }

        if !current.is_empty() || pieces.is_empty() {
            pieces.push(current);
        }
        pieces
    }
}

impl<M: TextMeasure> TextWrap for LineBreaker<M> {
    fn wrap(&self, text: &str, max_width: f64, font: &FontMetrics) -> Vec<String> {
        self.break_into_lines(text, max_width, font.font_size)
    }

    fn measure(&self, text: &str, font: &FontMetrics) -> f64 {
        self.measure.measure(text, font.font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::UniformAdvance;

    /// Every character is exactly one unit wide at font size 2.
    fn breaker() -> LineBreaker<UniformAdvance> {
        LineBreaker::new(UniformAdvance { ratio: 0.5 })
    }

    #[test]
    fn fits_on_one_line() {
        assert_eq!(breaker().break_into_lines("hello world", 11.0, 2.0), vec!["hello world"]);
    }

    #[test]
    fn breaks_at_spaces() {
        assert_eq!(
            breaker().break_into_lines("hello world", 5.0, 2.0),
            vec!["hello", "world"]
        );
    }

    #[test]
    fn trailing_space_does_not_count() {
        assert_eq!(breaker().break_into_lines("aa bb", 2.0, 2.0), vec!["aa", "bb"]);
    }

    #[test]
    fn newlines_are_mandatory() {
        assert_eq!(breaker().break_into_lines("a\nb", 10.0, 2.0), vec!["a", "b"]);
        assert_eq!(
            breaker().break_into_lines("a\r\n\r\nb", 10.0, 2.0),
            vec!["a", "", "b"]
        );
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(breaker().break_into_lines("", 10.0, 2.0), vec![""]);
    }

    #[test]
    fn overlong_word_splits_by_character() {
        assert_eq!(
            breaker().break_into_lines("abcdefgh", 3.0, 2.0),
            vec!["abc", "def", "gh"]
        );
    }

    #[test]
    fn overlong_word_after_short_word() {
        assert_eq!(
            breaker().break_into_lines("a bcdefg h", 3.0, 2.0),
            vec!["a", "bcd", "efg", "h"]
        );
    }

    #[test]
    fn zero_width_still_makes_progress() {
        assert_eq!(breaker().break_into_lines("ab", 0.0, 2.0), vec!["a", "b"]);
    }

    fn rejoin(lines: &[String]) -> String {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| {
                if i + 1 < lines.len() {
                    l.strip_suffix('-').unwrap_or(l)
                } else {
                    l.as_str()
                }
            })
            .collect()
    }

    #[test]
    fn hyphenates_at_syllables() {
        let breaker = breaker().with_hyphenation(resolve_hypher_lang(Some("en-US")));
        let lines = breaker.break_into_lines("hyphenation", 6.0, 2.0);
        assert!(lines.len() >= 2);
        assert!(lines.iter().any(|l| l.ends_with('-')));
        assert_eq!(rejoin(&lines), "hyphenation");
    }

    #[test]
    fn hyphenated_lines_never_exceed_width() {
        let breaker = breaker().with_hyphenation(resolve_hypher_lang(Some("en")));
        for word in ["hyphenation", "internationalization", "extraordinarily"] {
            for width in 2..=12 {
                let lines = breaker.break_into_lines(word, width as f64, 2.0);
                for line in &lines {
                    assert!(
                        line.chars().count() <= width,
                        "{word} at {width}: line {line:?} too wide"
                    );
                }
                assert_eq!(rejoin(&lines), word, "{word} at {width}");
            }
        }
    }

    #[test]
    fn leading_whitespace_does_not_add_a_blank_line() {
        assert_eq!(breaker().break_into_lines("  hello", 5.0, 2.0), vec!["hello"]);
        assert_eq!(
            breaker().break_into_lines(" abcdefgh", 3.0, 2.0),
            vec!["abc", "def", "gh"]
        );
        assert_eq!(breaker().break_into_lines(" ab", 5.0, 2.0), vec![" ab"]);
    }

    #[test]
    fn regional_tags_resolve_to_patterns() {
        for tag in ["hu", "el-GR", "sk", "hr", "nn", "pt-BR"] {
            assert!(resolve_hypher_lang(Some(tag)).is_some(), "{tag}");
        }
    }

    #[test]
    fn unknown_language_has_no_patterns() {
        assert!(resolve_hypher_lang(Some("xx")).is_none());
        assert!(resolve_hypher_lang(None).is_some());
    }

    #[test]
    fn wrap_trait_uses_font_size() {
        let font = FontMetrics::new(2.0, 1.0);
        let b = breaker();
        assert_eq!(TextWrap::wrap(&b, "ab cd", 2.0, &font), vec!["ab", "cd"]);
        assert!((TextWrap::measure(&b, "abc", &font) - 3.0).abs() < 1e-9);
    }
}
