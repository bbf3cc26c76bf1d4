//! # Grid Pagination
//!
//! Lays a 2-D grid of cell strings (one spreadsheet sheet) onto pages:
//! - column widths from the column policy
//! - row heights from the wrapped line count of the tallest cell
//! - greedy page breaks at row boundaries, rows are never split
//!
//! Several grids are laid out one after another, each starting on a fresh
//! page with its own column widths.

use serde::Serialize;

use super::page_break::stack_items;
use crate::error::{LayoutError, Result};
use crate::model::{
    ColumnPolicy, FontMetrics, GridOptions, OverflowPolicy, PageGeometry, Sheet,
};
use crate::text::TextWrap;

/// Resolved column widths. They always sum to the usable page width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub widths: Vec<f64>,
}

impl ColumnLayout {
    pub fn equal(count: usize, available_width: f64) -> Self {
        let count = count.max(1);
        Self {
            widths: vec![available_width / count as f64; count],
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Horizontal offset of a column from the left edge of the grid.
    pub fn x_offset(&self, col: usize) -> f64 {
        self.widths.iter().take(col).sum()
    }

    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }
}

/// One placed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    pub row_index: usize,
    /// Top edge in page coordinates.
    pub y: f64,
    pub height: f64,
    /// Wrapped lines for every column, ragged rows padded with empty cells.
    pub cells: Vec<Vec<String>>,
}

impl RowLayout {
    pub fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A contiguous run of rows that share one page.
///
/// Only one segment can be empty: the first segment of a titled grid whose
/// first row is too tall to sit below the title. It holds the title alone,
/// and its `start_row` is the row that opens the next segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSegment {
    pub start_row: usize,
    /// Where the first row starts (below the title on the first page).
    pub start_y: f64,
    /// Set on the first segment of a titled grid.
    pub title: Option<String>,
    pub rows: Vec<RowLayout>,
}

impl PageSegment {
    pub fn used_height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }
}

/// A row taller than the whole usable page height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowRow {
    pub row_index: usize,
    pub height: f64,
    pub available: f64,
}

/// The full layout of one grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub columns: ColumnLayout,
    pub segments: Vec<PageSegment>,
    pub overflow: Vec<OverflowRow>,
}

impl GridLayout {
    pub fn page_count(&self) -> usize {
        self.segments.len()
    }

    /// All placed rows in order, across segments.
    pub fn rows(&self) -> impl Iterator<Item = &RowLayout> {
        self.segments.iter().flat_map(|s| s.rows.iter())
    }
}

/// Layout result for one sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SheetLayout {
    Table {
        name: Option<String>,
        layout: GridLayout,
    },
    /// The sheet had no rows; render a placeholder note instead.
    Empty { name: Option<String> },
}

/// Number of columns in a ragged grid. Never zero.
pub fn column_count(grid: &[Vec<String>]) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0).max(1)
}

/// Paginate a grid with default options and no title.
pub fn paginate<W: TextWrap + ?Sized>(
    grid: &[Vec<String>],
    page: &PageGeometry,
    font: &FontMetrics,
    wrap: &W,
) -> Result<GridLayout> {
    GridPaginator::new(wrap, *font).paginate(grid, page, None)
}

/// Grid paginator bound to a wrapping service and font.
pub struct GridPaginator<'a, W: TextWrap + ?Sized> {
    wrap: &'a W,
    font: FontMetrics,
    options: GridOptions,
}

impl<'a, W: TextWrap + ?Sized> GridPaginator<'a, W> {
    pub fn new(wrap: &'a W, font: FontMetrics) -> Self {
        Self {
            wrap,
            font,
            options: GridOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Vertical space reserved for a grid title: the title line plus one
    /// blank line.
    pub fn title_height(&self) -> f64 {
        2.0 * self.font.line_height()
    }

    /// Lay out a single grid. The title, if any, sits at the top of the
    /// first page and pushes the first row down. A first row that fits a
    /// page but not the room below the title moves to the next page and
    /// leaves the title on a segment of its own.
    pub fn paginate(
        &self,
        grid: &[Vec<String>],
        page: &PageGeometry,
        title: Option<&str>,
    ) -> Result<GridLayout> {
        self.font.validate()?;
        self.options.validate()?;
        if grid.is_empty() {
            return Err(LayoutError::EmptyGrid);
        }

        let columns = self.resolve_columns(grid, page.usable_width());
        let line_height = self.font.line_height();

        let wrapped: Vec<Vec<Vec<String>>> = grid
            .iter()
            .map(|row| self.wrap_row(row, &columns))
            .collect();
        let heights: Vec<f64> = wrapped
            .iter()
            .map(|cells| {
                let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
                (lines as f64 * line_height).max(line_height)
            })
            .collect();

        let offset = if title.is_some() {
            self.title_height()
        } else {
            0.0
        };
        let slots = stack_items(heights.iter().copied(), page, offset);

        let mut overflow = Vec::new();
        let mut segments: Vec<PageSegment> = Vec::new();

        for (slot, cells) in slots.into_iter().zip(wrapped) {
            if slot.overflow {
                let available = page.usable_height();
                if self.options.overflow == OverflowPolicy::Reject {
                    return Err(LayoutError::OverflowRow {
                        row: slot.index,
                        height: slot.height,
                        available,
                    });
                }
                log::warn!(
                    "row {} is {:.2} tall, taller than the {:.2} usable page height; placing it anyway",
                    slot.index,
                    slot.height,
                    available
                );
                overflow.push(OverflowRow {
                    row_index: slot.index,
                    height: slot.height,
                    available,
                });
            }

            while segments.len() <= slot.page {
                let first = segments.is_empty();
                segments.push(PageSegment {
                    start_row: slot.index,
                    start_y: if first {
                        page.margin() + offset
                    } else {
                        page.margin()
                    },
                    title: if first {
                        title.map(str::to_string)
                    } else {
                        None
                    },
                    rows: Vec::new(),
                });
            }

            segments[slot.page].rows.push(RowLayout {
                row_index: slot.index,
                y: slot.y,
                height: slot.height,
                cells,
            });
        }

        log::debug!(
            "grid of {} rows x {} columns laid out on {} page(s)",
            grid.len(),
            columns.len(),
            segments.len()
        );

        Ok(GridLayout {
            columns,
            segments,
            overflow,
        })
    }

    /// Lay out several grids, each from a fresh page. Empty sheets become
    /// [`SheetLayout::Empty`] instead of failing the workbook.
    pub fn paginate_sheets(&self, sheets: &[Sheet], page: &PageGeometry) -> Result<Vec<SheetLayout>> {
        if sheets.is_empty() {
            return Err(LayoutError::EmptyInput { what: "sheet" });
        }

        let mut result = Vec::with_capacity(sheets.len());
        for (i, sheet) in sheets.iter().enumerate() {
            match self.paginate(&sheet.rows, page, sheet.name.as_deref()) {
                Ok(layout) => result.push(SheetLayout::Table {
                    name: sheet.name.clone(),
                    layout,
                }),
                Err(LayoutError::EmptyGrid) => {
                    log::warn!(
                        "sheet {} ({}) has no rows",
                        i,
                        sheet.name.as_deref().unwrap_or("unnamed")
                    );
                    result.push(SheetLayout::Empty {
                        name: sheet.name.clone(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(result)
    }

    fn wrap_row(&self, row: &[String], columns: &ColumnLayout) -> Vec<Vec<String>> {
        columns
            .widths
            .iter()
            .enumerate()
            .map(|(col, width)| {
                let text = row.get(col).map(String::as_str).unwrap_or("");
                let inner = (width - 2.0 * self.options.cell_padding).max(0.0);
                let lines = self.wrap.wrap(text, inner, &self.font);
                if lines.is_empty() {
                    vec![String::new()]
                } else {
                    lines
                }
            })
            .collect()
    }

    /// Resolve column widths according to the column policy.
    ///
    /// Content sizing: each column's natural width is its widest unwrapped
    /// line plus cell padding, floored at the minimum width; the naturals are
    /// then scaled to fill the available width exactly.
    fn resolve_columns(&self, grid: &[Vec<String>], available_width: f64) -> ColumnLayout {
        let count = column_count(grid);
        let min_width = match self.options.columns {
            ColumnPolicy::Equal => return ColumnLayout::equal(count, available_width),
            ColumnPolicy::Content { min_width } => min_width.max(0.0),
        };

        let natural: Vec<f64> = (0..count)
            .map(|col| {
                grid.iter()
                    .filter_map(|row| row.get(col))
                    .flat_map(|cell| cell.lines())
                    .map(|line| self.wrap.measure(line, &self.font))
                    .fold(0.0_f64, f64::max)
            })
            .collect();

        if natural.iter().all(|w| *w <= 0.0) {
            return ColumnLayout::equal(count, available_width);
        }

        let padding = 2.0 * self.options.cell_padding;
        let floored: Vec<f64> = natural
            .iter()
            .map(|w| (w + padding).max(min_width))
            .collect();
        let total: f64 = floored.iter().sum();
        if total <= 0.0 {
            return ColumnLayout::equal(count, available_width);
        }

        let scale = available_width / total;
        log::debug!(
            "content-sized {} columns, natural total {:.2}, scale {:.3}",
            count,
            total,
            scale
        );
        ColumnLayout {
            widths: floored.iter().map(|w| w * scale).collect(),
        }
    }
}
