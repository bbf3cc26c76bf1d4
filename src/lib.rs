//! # pagefit
//!
//! A page-fitting layout engine for document conversion.
//!
//! Converting images, spreadsheets or extracted text to a paged document
//! comes down to two questions: how big is each thing once it is scaled to
//! the page, and where do the page breaks go. pagefit answers both and
//! emits a list of draw commands per page. It never writes PDF bytes itself;
//! a renderer replays the commands.
//!
//! ## Architecture
//!
//! ```text
//! Job (JSON/API)
//!       ↓
//!   [model]         Page config, images, sheets, typography
//!       ↓
//!   [image_loader]  Decode pixel sizes (the only I/O, done up front)
//!   [font] [text]   Measure and wrap text
//!       ↓
//!   [layout]        Fit images, paginate grids, flow text
//!       ↓
//!   [sink]          Replay draw commands (SVG preview included)
//! ```

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod sink;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use error::Result;
use font::FontSource;
use layout::{Layout, LayoutEngine, ResolvedImage};
use model::{ImageSource, Job, Typography};
use text::{resolve_hypher_lang, LineBreaker};

pub use error::LayoutError;

/// Lay out one job.
///
/// Images without a known pixel size are decoded first, then the
/// synchronous layout runs on the resolved input.
pub fn layout_job(job: &Job) -> Result<Layout> {
    let page = job.page().geometry()?;

    let layout = match job {
        Job::Images(job) => {
            let images = job
                .images
                .iter()
                .map(resolve_image)
                .collect::<Result<Vec<_>>>()?;
            let engine = LayoutEngine::<LineBreaker>::default();
            engine.layout_resolved_images(&images, &page, job.border.as_ref())?
        }
        Job::Workbook(job) => {
            engine_for(&job.typography)?.layout_workbook(&job.sheets, &page, &job.grid)?
        }
        Job::Text(job) => engine_for(&job.typography)?.layout_text(&job.text, &page)?,
    };

    log::info!(
        "laid out {} page(s) with {} notice(s)",
        layout.page_count(),
        layout.notices.len()
    );
    Ok(layout)
}

/// Parse a job from JSON and lay it out.
pub fn layout_job_json(json: &str) -> Result<Layout> {
    let job: Job = serde_json::from_str(json)?;
    layout_job(&job)
}

fn engine_for(typography: &Typography) -> Result<LayoutEngine> {
    let measure = FontSource::from_typeface(&typography.typeface)?;
    let hyphenation = if typography.hyphenate {
        resolve_hypher_lang(typography.lang.as_deref())
    } else {
        None
    };
    let wrap = LineBreaker::new(measure).with_hyphenation(hyphenation);
    Ok(LayoutEngine::new(wrap, typography.font))
}

fn resolve_image(source: &ImageSource) -> Result<ResolvedImage> {
    if let Some(spec) = source.known_spec() {
        return Ok(ResolvedImage {
            spec,
            source: source.src.clone(),
        });
    }
    match &source.src {
        Some(src) => {
            let loaded = image_loader::load_image(src)?;
            Ok(ResolvedImage {
                spec: loaded.spec,
                source: Some(src.clone()),
            })
        }
        None => Err(LayoutError::Image(
            "image needs either a src or both widthPx and heightPx".to_string(),
        )),
    }
}
