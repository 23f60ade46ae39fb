//! Artifact rendering: price chart image and PDF report document

pub mod chart;
pub mod pdf;

pub use chart::ChartRenderer;
pub use pdf::PdfRenderer;

use thiserror::Error;

/// Error types for artifact rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Document rendering failed: {0}")]
    Document(#[from] genpdf::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
