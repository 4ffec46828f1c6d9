use gl::types::GLuint;

use crate::api::Gl;
use crate::program::Program;

/// Vertices of the attribute-less triangle that covers the whole viewport.
/// The vertex stage derives positions from `gl_VertexID`.
pub const FULLSCREEN_VERTICES: i32 = 3;

/// Draw helper that remembers which program it last bound.
///
/// The remembered id is only updated by [`GlRenderer::use_program`]. Binding a
/// program with [`Program::activate`] directly, or destroying the bound program
/// so the driver can hand its name out again, leaves it stale: call
/// [`GlRenderer::forget`] or [`GlRenderer::invalidate`] in those cases.
pub struct GlRenderer<G: Gl> {
    gl: G,
    current_program: GLuint,
    empty_vao: GLuint,
}

impl<G: Gl> GlRenderer<G> {
    pub fn new(gl: G) -> Self {
        let empty_vao = gl.create_vertex_array();

        Self {
            gl,
            current_program: 0,
            empty_vao,
        }
    }

    /// Binds `program` unless it is already the bound one.
    pub fn use_program<P: Gl>(&mut self, program: &Program<P>) {
        let p_id = program.get_id();
        if self.current_program != p_id {
            program.activate();
            self.current_program = p_id;
        }
    }

    /// Drops the remembered binding if it refers to `program`. Call before
    /// destroying a program that was bound through this renderer.
    pub fn forget<P: Gl>(&mut self, program: &Program<P>) {
        if self.current_program == program.get_id() {
            self.current_program = 0;
        }
    }

    /// Forces the next [`GlRenderer::use_program`] to bind.
    pub fn invalidate(&mut self) {
        self.current_program = 0;
    }

    pub fn draw_fullscreen<P: Gl>(&mut self, program: &Program<P>) {
        self.use_program(program);
        self.gl.draw_triangles(self.empty_vao, FULLSCREEN_VERTICES);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.gl.viewport(width as i32, height as i32);
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32) {
        self.gl.clear_color(r, g, b);
    }
}

impl<G: Gl> Drop for GlRenderer<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.empty_vao);
    }
}
