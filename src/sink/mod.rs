//! # Render Sinks
//!
//! Replays laid-out pages into a renderer. A sink gets the draw commands
//! of each page in order and never has to make a layout decision; a PDF
//! writer, a canvas binding or the bundled [`SvgPreview`] all look the same
//! from here.

use std::fmt::Write as FmtWrite; // for write! on String

use crate::layout::{DrawCommand, LayoutPage};
use crate::model::{BorderSpec, Placement};

/// Receives draw operations page by page.
pub trait RenderSink {
    fn begin_page(&mut self, index: usize, width: f64, height: f64);

    /// Stroke the outline of `rect`.
    fn rect(&mut self, rect: Placement, stroke: &BorderSpec);

    /// Draw an image into `placement`. `source` is `None` when the layout
    /// only knew the pixel size.
    fn image(&mut self, source: Option<&str>, placement: Placement);

    /// Draw one line of text; `y` is the top of the line box.
    fn text(&mut self, x: f64, y: f64, font_size: f64, text: &str);

    fn end_page(&mut self);
}

/// Execute every command of every page, in order.
pub fn replay<S: RenderSink + ?Sized>(pages: &[LayoutPage], sink: &mut S) {
    for (index, page) in pages.iter().enumerate() {
        sink.begin_page(index, page.width, page.height);
        for command in &page.commands {
            match command {
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    style,
                    color,
                    stroke_width,
                } => sink.rect(
                    Placement {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                    },
                    &BorderSpec {
                        style: *style,
                        color: *color,
                        stroke_width: *stroke_width,
                    },
                ),
                DrawCommand::Image {
                    source,
                    x,
                    y,
                    width,
                    height,
                } => sink.image(
                    source.as_deref(),
                    Placement {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                    },
                ),
                DrawCommand::Text {
                    x,
                    y,
                    font_size,
                    text,
                } => sink.text(*x, *y, *font_size, text),
            }
        }
        sink.end_page();
    }
}

/// Renders each page to a standalone SVG document, in page units
/// (millimetres for the built-in page sizes).
#[derive(Debug, Default)]
pub struct SvgPreview {
    pages: Vec<String>,
    current: String,
}

impl SvgPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a whole layout in one go.
    pub fn render(pages: &[LayoutPage]) -> Vec<String> {
        let mut preview = Self::new();
        replay(pages, &mut preview);
        preview.into_pages()
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }

    /// Sources an SVG viewer can resolve on its own. Raw base64 and file
    /// paths are not among them.
    fn is_href(source: &str) -> bool {
        source.starts_with("data:") || source.starts_with("https://") || source.starts_with("http://")
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

impl RenderSink for SvgPreview {
    fn begin_page(&mut self, _index: usize, width: f64, height: f64) {
        self.current.clear();
        let _ = write!(
            self.current,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n\
             <rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"#ffffff\"/>\n",
            w = width,
            h = height
        );
    }

    fn rect(&mut self, rect: Placement, stroke: &BorderSpec) {
        let _ = write!(
            self.current,
            "<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.3}\"",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            stroke.color.to_hex(),
            stroke.stroke_width
        );
        let dash = stroke.style.dash_pattern();
        if !dash.is_empty() {
            let pattern: Vec<String> = dash.iter().map(|d| d.to_string()).collect();
            let _ = write!(self.current, " stroke-dasharray=\"{}\"", pattern.join(" "));
        }
        self.current.push_str("/>\n");
    }

    fn image(&mut self, source: Option<&str>, placement: Placement) {
        match source.filter(|s| Self::is_href(s)) {
            Some(href) => {
                let _ = writeln!(
                    self.current,
                    "<image x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
                    placement.x,
                    placement.y,
                    placement.width,
                    placement.height,
                    Self::escape_xml(href)
                );
            }
            None => {
                // Grey placeholder where the pixels would go
                let _ = writeln!(
                    self.current,
                    "<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"#e0e0e0\"/>",
                    placement.x, placement.y, placement.width, placement.height
                );
            }
        }
    }

    fn text(&mut self, x: f64, y: f64, font_size: f64, text: &str) {
        let _ = writeln!(
            self.current,
            "<text x=\"{:.3}\" y=\"{:.3}\" font-size=\"{:.3}\" dominant-baseline=\"hanging\" xml:space=\"preserve\">{}</text>",
            x,
            y,
            font_size,
            Self::escape_xml(text)
        );
    }

    fn end_page(&mut self) {
        self.current.push_str("</svg>\n");
        self.pages.push(std::mem::take(&mut self.current));
    }
}
