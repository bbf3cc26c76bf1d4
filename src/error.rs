//! Structured error types for the layout engine.
//!
//! Geometry and input errors come from the engine itself; parse, image and
//! font errors come from the collaborators the job layer drives before
//! layout starts.

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// The unified error type returned by all public pagefit functions.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Zero, negative or non-finite geometry (page, margin, image pixels).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Nothing to lay out.
    #[error("Empty input: at least one {what} is required")]
    EmptyInput { what: &'static str },

    /// A grid with zero rows. Callers usually render a placeholder instead.
    #[error("Grid has no rows")]
    EmptyGrid,

    /// A single row is taller than the usable page height. Only raised when
    /// the overflow policy rejects such rows; otherwise it is a notice.
    #[error("Row {row} needs {height:.2} units but the page only has {available:.2}")]
    OverflowRow {
        row: usize,
        height: f64,
        available: f64,
    },

    /// A colour string that is not `#rgb` or `#rrggbb`.
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// An image could not be read or its dimensions decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// A font could not be read or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// JSON input failed to parse as a valid job.
    #[error("Failed to parse job: {source}\n  Hint: {hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't describe a job. Check the \"type\" tag and field names."
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?",
            serde_json::error::Category::Io => "The input could not be read.",
        };
        LayoutError::Parse {
            source: e,
            hint: hint.to_string(),
        }
    }
}
