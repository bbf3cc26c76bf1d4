//! # Text Flow
//!
//! Free text (extracted from a document) wrapped to the usable width and
//! stacked one line height at a time, breaking pages when the next line
//! would cross the bottom margin.

use serde::Serialize;

use super::page_break::stack_items;
use crate::error::Result;
use crate::model::{FontMetrics, PageGeometry};
use crate::text::TextWrap;

/// A line of text at its final position. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFlow {
    pub pages: Vec<Vec<PlacedLine>>,
}

impl TextFlow {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flatten()
    }
}

/// Wrap and paginate `text`. Empty text still yields one (empty) page.
pub fn flow_text<W: TextWrap + ?Sized>(
    text: &str,
    page: &PageGeometry,
    font: &FontMetrics,
    wrap: &W,
) -> Result<TextFlow> {
    font.validate()?;

    if text.is_empty() {
        return Ok(TextFlow {
            pages: vec![Vec::new()],
        });
    }

    let lines = wrap.wrap(text, page.usable_width(), font);
    let line_height = font.line_height();
    let slots = stack_items(lines.iter().map(|_| line_height), page, 0.0);

    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    for (slot, text) in slots.into_iter().zip(lines) {
        while pages.len() <= slot.page {
            pages.push(Vec::new());
        }
        pages[slot.page].push(PlacedLine {
            x: page.margin(),
            y: slot.y,
            text,
        });
    }

    log::debug!("text flowed onto {} page(s)", pages.len());
    Ok(TextFlow { pages })
}
