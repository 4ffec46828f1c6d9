pub mod api;
pub mod logging;
pub mod program;
pub mod renderer;
pub mod source;
pub mod uniform;

#[cfg(test)]
mod mock;

pub use api::{Gl, NativeGl, Stage};
pub use program::{Program, ProgramBuilder, ProgramError};
pub use source::SourceError;
pub use uniform::Uniform;
