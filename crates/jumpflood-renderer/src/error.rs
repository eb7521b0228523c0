use std::io;

use thiserror::Error;

use crate::program::ProgramKind;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to compile {program:?} program:\n\n{log}")]
    Compile { program: ProgramKind, log: String },

    #[error("Render target {width}x{height} is incomplete: {reason}")]
    Resource {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Expected a {expected:?} program, got {found:?}")]
    ProgramMismatch {
        expected: ProgramKind,
        found: ProgramKind,
    },

    #[error("Expected a blit program, got {found:?}")]
    NotABlit { found: ProgramKind },

    #[error("No render targets are allocated")]
    Unavailable,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}
