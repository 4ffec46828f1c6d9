use std::path::PathBuf;

use clap::Parser;

use gl_wrapper::{ProgramBuilder, SourceError};

const BUILTIN_VERT: &str = include_str!("gl_shaders/triangle_vert.glsl");
const BUILTIN_FRAG: &str = include_str!("gl_shaders/triangle_frag.glsl");

#[derive(Debug, Parser)]
pub struct ArgsInteractive {
    /// Vertex shader to load instead of the built-in one
    #[arg(long, requires = "fragment")]
    pub vertex: Option<PathBuf>,
    /// Fragment shader to load instead of the built-in one
    #[arg(long, requires = "vertex")]
    pub fragment: Option<PathBuf>,
    /// Width of the window
    #[arg(long, default_value_t = 800)]
    pub width: u32,
    /// Height of the window
    #[arg(long, default_value_t = 600)]
    pub height: u32,
    /// Log filter in `env_logger` syntax, overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,
}

impl ArgsInteractive {
    pub fn program_builder(&self) -> Result<ProgramBuilder, SourceError> {
        match (&self.vertex, &self.fragment) {
            (Some(vert), Some(frag)) => ProgramBuilder::from_files(vert, frag),
            _ => Ok(ProgramBuilder::new(BUILTIN_VERT, BUILTIN_FRAG)),
        }
    }
}
