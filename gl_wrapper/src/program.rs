use std::ffi::{CStr, CString};
use std::path::Path;

use gl::types::{GLint, GLuint};
use thiserror::Error;

use crate::api::{Gl, NativeGl, Stage};
use crate::source::{read_source, to_c_source, SourceError};
use crate::uniform::Uniform;

pub struct ProgramBuilder {
    vert: String,
    frag: String,
}

impl ProgramBuilder {
    pub fn new(vert_src: &str, frag_src: &str) -> Self {
        Self {
            vert: vert_src.to_owned(),
            frag: frag_src.to_owned(),
        }
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        vert_path: P,
        frag_path: Q,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            vert: read_source(vert_path)?,
            frag: read_source(frag_path)?,
        })
    }

    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first; a failure there returns before the
    /// fragment stage is touched. Shader objects are released on every path,
    /// and the program object is released when linking fails.
    pub fn build<G: Gl>(self, gl: G) -> Result<Program<G>, ProgramError> {
        let vert_src = to_c_source(Stage::Vertex, &self.vert)?;
        let frag_src = to_c_source(Stage::Fragment, &self.frag)?;

        let vert = compile_stage(&gl, Stage::Vertex, &vert_src)?;

        let frag = match compile_stage(&gl, Stage::Fragment, &frag_src) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let linked = link_stages(&gl, vert, frag);

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        let id = linked?;
        log::debug!("linked program {id}");

        Ok(Program { id, gl })
    }
}

fn compile_stage<G: Gl>(gl: &G, stage: Stage, source: &CStr) -> Result<GLuint, ProgramError> {
    let shader = gl.create_shader(stage);
    if shader == 0 {
        return Err(ProgramError::Compilation {
            stage,
            log: "driver returned no shader object".into(),
        });
    }

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);

        return Err(ProgramError::Compilation { stage, log });
    }

    Ok(shader)
}

fn link_stages<G: Gl>(gl: &G, vert: GLuint, frag: GLuint) -> Result<GLuint, ProgramError> {
    let program = gl.create_program();
    if program == 0 {
        return Err(ProgramError::Linking("driver returned no program object".into()));
    }

    gl.attach_shader(program, vert);
    gl.attach_shader(program, frag);
    gl.link_program(program);

    let linked = gl.link_status(program);
    let log = if linked {
        None
    } else {
        Some(gl.program_info_log(program))
    };

    gl.detach_shader(program, vert);
    gl.detach_shader(program, frag);

    match log {
        None => Ok(program),
        Some(log) => {
            gl.delete_program(program);
            Err(ProgramError::Linking(log))
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),
    #[error("{stage} shader failed to compile: {log}")]
    Compilation { stage: Stage, log: String },
    #[error("program failed to link: {0}")]
    Linking(String),
}

/// A linked GPU program.
///
/// Uniform setters act on whichever program is currently bound, so call
/// [`Program::activate`] first.
pub struct Program<G: Gl = NativeGl> {
    id: GLuint,
    gl: G,
}

impl<G: Gl> Program<G> {
    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn activate(&self) {
        self.gl.use_program(self.id);
    }

    /// Uploads `value` to the uniform called `name`.
    ///
    /// Names that are not active in the program are ignored.
    pub fn set_uniform<U: Uniform>(&self, name: &str, value: U) {
        if let Some(location) = self.location(name) {
            value.upload(&self.gl, location);
        }
    }

    /// Reads back the current value of the uniform called `name`.
    pub fn uniform<U: Uniform>(&self, name: &str) -> Option<U> {
        self.location(name)
            .map(|location| U::read_back(&self.gl, self.id, location))
    }

    pub fn destroy(self) {
        log::debug!("destroying program {}", self.id);
    }

    fn location(&self, name: &str) -> Option<GLint> {
        let c_name = CString::new(name).ok()?;
        let location = self.gl.uniform_location(self.id, &c_name);

        if location < 0 {
            log::trace!("program {} has no active uniform {name:?}", self.id);
            None
        } else {
            Some(location)
        }
    }
}

impl<G: Gl> Drop for Program<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id)
    }
}
