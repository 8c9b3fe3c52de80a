//! Errors surfaced by the engine context.

use thiserror::Error;

use cubebox_render::RenderError;
use cubebox_text::TextError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Text error: {0}")]
    Text(#[from] TextError),
}
