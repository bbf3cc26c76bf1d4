//! # Page Layout Engine
//!
//! Turns fitted images, paginated grids and flowed text into pages of draw
//! commands. A renderer (PDF writer, canvas, the SVG preview in
//! [`crate::sink`]) executes the commands in order and needs no layout
//! knowledge of its own.
//!
//! Nothing here sees the full document as one tall canvas that gets sliced
//! afterwards. Every page is opened with known dimensions, each item asks
//! whether it fits the space left, and items that do not fit start a new
//! page. Rows and images are never split.
//!
//! ```text
//!   images ──► fit ──► layout_sequence ─┐
//!   sheets ──► GridPaginator ───────────┼──► PageCursor ──► LayoutPage
//!   text   ──► flow_text ───────────────┘
//! ```

pub mod fit;
pub mod flow;
pub mod grid;
pub mod page_break;

use serde::Serialize;

use crate::error::Result;
use crate::model::{
    BorderSpec, BorderStyle, Color, FontMetrics, GridOptions, ImageSpec, PageGeometry, Placement,
    Sheet,
};
use crate::text::{LineBreaker, TextWrap};

use self::fit::{border_rect, layout_sequence};
use self::flow::flow_text;
use self::grid::{GridLayout, GridPaginator, SheetLayout};

/// One drawing operation, in page units with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawCommand {
    /// Draw an image scaled into the box.
    Image {
        /// Where the pixels come from, when the job said.
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Stroke a rectangle outline.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: BorderStyle,
        color: Color,
        #[serde(rename = "strokeWidth")]
        stroke_width: f64,
    },
    /// Draw one line of text. `y` is the top of the line box.
    Text {
        x: f64,
        y: f64,
        #[serde(rename = "fontSize")]
        font_size: f64,
        text: String,
    },
}

impl DrawCommand {
    fn stroke(rect: Placement, border: &BorderSpec) -> Self {
        DrawCommand::Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            style: border.style,
            color: border.color,
            stroke_width: border.stroke_width,
        }
    }
}

/// A fully laid-out page ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

/// Something the caller should know about that did not stop the layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutNotice {
    /// A row taller than the usable page height was placed anyway and runs
    /// past the bottom margin.
    #[serde(rename_all = "camelCase")]
    OverflowRow {
        sheet: usize,
        row_index: usize,
        height: f64,
        available: f64,
    },
    /// A sheet without rows; a placeholder page was emitted for it.
    EmptySheet { sheet: usize },
}

/// The result of laying out one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub pages: Vec<LayoutPage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<LayoutNotice>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// An image with its pixel size already known.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub spec: ImageSpec,
    pub source: Option<String>,
}

impl From<ImageSpec> for ResolvedImage {
    fn from(spec: ImageSpec) -> Self {
        Self { spec, source: None }
    }
}

/// Collects the commands of the page being built.
#[derive(Debug)]
struct PageCursor {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl PageCursor {
    fn new(page: &PageGeometry) -> Self {
        Self {
            width: page.width(),
            height: page.height(),
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn text(&mut self, x: f64, y: f64, font_size: f64, text: impl Into<String>) {
        self.push(DrawCommand::Text {
            x,
            y,
            font_size,
            text: text.into(),
        });
    }

    fn finalize(self) -> LayoutPage {
        LayoutPage {
            width: self.width,
            height: self.height,
            commands: self.commands,
        }
    }
}

/// The main layout engine.
pub struct LayoutEngine<W: TextWrap = LineBreaker> {
    wrap: W,
    font: FontMetrics,
}

impl Default for LayoutEngine<LineBreaker> {
    fn default() -> Self {
        Self::new(LineBreaker::default(), FontMetrics::default())
    }
}

impl<W: TextWrap> LayoutEngine<W> {
    pub fn new(wrap: W, font: FontMetrics) -> Self {
        Self { wrap, font }
    }

    pub fn font(&self) -> &FontMetrics {
        &self.font
    }

    pub fn wrap(&self) -> &W {
        &self.wrap
    }

    /// One page per image. The border, when there is one, is stroked before
    /// the image is drawn.
    pub fn layout_images(
        &self,
        images: &[ImageSpec],
        page: &PageGeometry,
        border: Option<&BorderSpec>,
    ) -> Result<Layout> {
        let resolved: Vec<ResolvedImage> = images.iter().copied().map(ResolvedImage::from).collect();
        self.layout_resolved_images(&resolved, page, border)
    }

    /// Like [`layout_images`](Self::layout_images), keeping each image's
    /// source on its draw command.
    pub fn layout_resolved_images(
        &self,
        images: &[ResolvedImage],
        page: &PageGeometry,
        border: Option<&BorderSpec>,
    ) -> Result<Layout> {
        if let Some(border) = border {
            border.validate()?;
        }
        let specs: Vec<ImageSpec> = images.iter().map(|i| i.spec).collect();
        let sequence = layout_sequence(&specs, page)?;

        let pages = sequence
            .iter()
            .zip(images)
            .map(|(entry, image)| {
                let mut cursor = PageCursor::new(page);
                if let Some(border) = border {
                    if let Some(rect) = border_rect(&entry.placement, border) {
                        cursor.push(DrawCommand::stroke(rect, border));
                    }
                }
                let p = entry.placement;
                cursor.push(DrawCommand::Image {
                    source: image.source.clone(),
                    x: p.x,
                    y: p.y,
                    width: p.width,
                    height: p.height,
                });
                cursor.finalize()
            })
            .collect();

        Ok(Layout {
            pages,
            notices: Vec::new(),
        })
    }

    /// Render every sheet as a table, each starting on a fresh page.
    pub fn layout_workbook(
        &self,
        sheets: &[Sheet],
        page: &PageGeometry,
        options: &GridOptions,
    ) -> Result<Layout> {
        let paginator = GridPaginator::new(&self.wrap, self.font).with_options(options.clone());
        let sheet_layouts = paginator.paginate_sheets(sheets, page)?;

        let mut layout = Layout::default();
        for (sheet, sheet_layout) in sheet_layouts.iter().enumerate() {
            match sheet_layout {
                SheetLayout::Table { layout: grid, .. } => {
                    layout
                        .notices
                        .extend(grid.overflow.iter().map(|o| LayoutNotice::OverflowRow {
                            sheet,
                            row_index: o.row_index,
                            height: o.height,
                            available: o.available,
                        }));
                    self.draw_grid(grid, page, options, &mut layout.pages);
                }
                SheetLayout::Empty { name } => {
                    layout.notices.push(LayoutNotice::EmptySheet { sheet });
                    let mut cursor = PageCursor::new(page);
                    let note = match name {
                        Some(name) => format!("Sheet \"{name}\" is empty"),
                        None => "This sheet is empty".to_string(),
                    };
                    cursor.text(page.margin(), page.margin(), self.font.font_size, note);
                    layout.pages.push(cursor.finalize());
                }
            }
        }
        Ok(layout)
    }

    fn draw_grid(
        &self,
        grid: &GridLayout,
        page: &PageGeometry,
        options: &GridOptions,
        pages: &mut Vec<LayoutPage>,
    ) {
        let line_height = self.font.line_height();
        let border = options
            .cell_border
            .as_ref()
            .filter(|b| b.style != BorderStyle::None);

        for segment in &grid.segments {
            let mut cursor = PageCursor::new(page);
            if let Some(title) = &segment.title {
                cursor.text(page.margin(), page.margin(), self.font.font_size, title.as_str());
            }

            for row in &segment.rows {
                for (col, lines) in row.cells.iter().enumerate() {
                    let x = page.margin() + grid.columns.x_offset(col);
                    let width = grid.columns.widths.get(col).copied().unwrap_or(0.0);
                    if let Some(border) = border {
                        let cell = Placement {
                            x,
                            y: row.y,
                            width,
                            height: row.height,
                        };
                        cursor.push(DrawCommand::stroke(cell, border));
                    }
                    for (i, line) in lines.iter().enumerate() {
                        if line.is_empty() {
                            continue;
                        }
                        cursor.text(
                            x + options.cell_padding,
                            row.y + i as f64 * line_height,
                            self.font.font_size,
                            line.as_str(),
                        );
                    }
                }
            }
            pages.push(cursor.finalize());
        }
    }

    /// Flow free text onto pages, one text command per line.
    pub fn layout_text(&self, text: &str, page: &PageGeometry) -> Result<Layout> {
        let flow = flow_text(text, page, &self.font, &self.wrap)?;
        let pages = flow
            .pages
            .into_iter()
            .map(|lines| {
                let mut cursor = PageCursor::new(page);
                for line in lines {
                    cursor.text(line.x, line.y, self.font.font_size, line.text);
                }
                cursor.finalize()
            })
            .collect();
        Ok(Layout {
            pages,
            notices: Vec::new(),
        })
    }
}
