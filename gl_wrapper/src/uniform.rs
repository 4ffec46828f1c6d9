use cgmath::{Matrix4, Vector3};
use gl::types::{GLint, GLuint};

use crate::api::Gl;

/// A value that can be stored in a uniform variable of a linked program.
pub trait Uniform: Sized {
    /// Writes the value to `location` of the currently bound program.
    fn upload<G: Gl>(&self, gl: &G, location: GLint);

    /// Reads the current value of `location` from `program`.
    ///
    /// Reading a uniform as a type with fewer components than it was declared
    /// with yields the leading components.
    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self;
}

impl Uniform for bool {
    fn upload<G: Gl>(&self, gl: &G, location: GLint) {
        gl.uniform_1i(location, *self as GLint);
    }

    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self {
        i32::read_back(gl, program, location) != 0
    }
}

impl Uniform for i32 {
    fn upload<G: Gl>(&self, gl: &G, location: GLint) {
        gl.uniform_1i(location, *self);
    }

    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self {
        gl.get_uniform_iv(program, location)[0]
    }
}

impl Uniform for f32 {
    fn upload<G: Gl>(&self, gl: &G, location: GLint) {
        gl.uniform_1f(location, *self);
    }

    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self {
        gl.get_uniform_fv(program, location)[0]
    }
}

impl Uniform for Vector3<f32> {
    fn upload<G: Gl>(&self, gl: &G, location: GLint) {
        gl.uniform_3f(location, self.x, self.y, self.z);
    }

    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self {
        let out = gl.get_uniform_fv(program, location);
        Vector3::new(out[0], out[1], out[2])
    }
}

impl Uniform for Matrix4<f32> {
    fn upload<G: Gl>(&self, gl: &G, location: GLint) {
        let columns: [[f32; 4]; 4] = (*self).into();
        let mut data = [0.0; 16];

        for (chunk, column) in data.chunks_exact_mut(4).zip(columns.iter()) {
            chunk.copy_from_slice(column);
        }

        gl.uniform_matrix_4fv(location, &data);
    }

    fn read_back<G: Gl>(gl: &G, program: GLuint, location: GLint) -> Self {
        let data = gl.get_uniform_fv(program, location);

        let mut columns = [[0.0; 4]; 4];
        for (column, chunk) in columns.iter_mut().zip(data.chunks_exact(4)) {
            column.copy_from_slice(chunk);
        }

        Matrix4::from(columns)
    }
}
