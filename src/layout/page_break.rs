//! # Page Break Decisions
//!
//! The greedy, single-pass rule for stacking fixed-height items (grid rows,
//! text lines) into pages. No lookahead and no splitting: an item either
//! goes on the current page, starts the next one, or, when it is taller
//! than a whole page, is placed anyway and flagged.

use crate::model::PageGeometry;

/// Tolerance for accumulated floating-point error in cursor arithmetic.
const EPSILON: f64 = 1e-9;

/// What to do with the next item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The item fits in the remaining height.
    Place,
    /// Close the current page and retry on a fresh one.
    NewPage,
    /// The item is taller than a full page and the page holds nothing yet:
    /// place it here and let it run past the bottom.
    Overflow,
}

/// Decide where an item of `item_height` goes.
///
/// `page_is_empty` means no item has been placed on the current page yet
/// (a title or header may still be there).
pub fn decide_break(
    remaining_height: f64,
    item_height: f64,
    full_page_height: f64,
    page_is_empty: bool,
) -> BreakDecision {
    if item_height <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    if item_height > full_page_height + EPSILON && page_is_empty {
        return BreakDecision::Overflow;
    }

    BreakDecision::NewPage
}

/// Where an item ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Index of the item in the input sequence.
    pub index: usize,
    /// Page number relative to the first page of this sequence.
    pub page: usize,
    /// Top edge of the item in page coordinates.
    pub y: f64,
    pub height: f64,
    /// The item is taller than the usable page height.
    pub overflow: bool,
}

/// Stack items top to bottom, breaking pages greedily.
///
/// The first page starts `first_page_offset` below the top margin (room for
/// a title); later pages start at the top margin.
pub fn stack_items<I>(heights: I, page: &PageGeometry, first_page_offset: f64) -> Vec<Slot>
where
    I: IntoIterator<Item = f64>,
{
    let top = page.margin();
    let bottom = page.bottom();
    let full = page.usable_height();

    let mut slots = Vec::new();
    let mut page_no = 0;
    let mut y = top + first_page_offset;
    let mut page_is_empty = true;

    for (index, height) in heights.into_iter().enumerate() {
        let mut decision = decide_break(bottom - y, height, full, page_is_empty);
        if decision == BreakDecision::NewPage {
            log::debug!(
                "page break before item {} (needs {:.2}, {:.2} left)",
                index,
                height,
                bottom - y
            );
            page_no += 1;
            y = top;
            page_is_empty = true;
            decision = decide_break(bottom - y, height, full, page_is_empty);
        }

        let overflow = decision == BreakDecision::Overflow;
        slots.push(Slot {
            index,
            page: page_no,
            y,
            height,
            overflow,
        });
        y += height;
        page_is_empty = false;
    }

    slots
}
