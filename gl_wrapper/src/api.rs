use std::ffi::{c_char, c_void, CStr};
use std::fmt::{Display, Formatter};

use gl::types::{GLenum, GLint, GLuint};

/// Capacity of the buffer driver diagnostics are read into, terminator included.
pub const INFO_LOG_CAPACITY: usize = 512;

/// Components of the largest uniform type read back (`mat4`).
pub const MAX_UNIFORM_COMPONENTS: usize = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn gl_enum(&self) -> GLenum {
        match self {
            Stage::Vertex => gl::VERTEX_SHADER,
            Stage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Vertex => write!(f, "vertex"),
            Stage::Fragment => write!(f, "fragment"),
        }
    }
}

/// The subset of OpenGL the wrappers in this crate issue.
///
/// Object names follow GL conventions: `0` means the driver could not
/// create the object, and a uniform location of `-1` means the name is not
/// an active uniform of the program.
pub trait Gl {
    fn create_shader(&self, stage: Stage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&self, program: GLuint);
    fn use_program(&self, program: GLuint);

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: f32);
    fn uniform_3f(&self, location: GLint, x: f32, y: f32, z: f32);
    fn uniform_matrix_4fv(&self, location: GLint, value: &[f32; 16]);
    /// Reads the uniform at `location`. Components past the declared type's
    /// size are left at zero.
    fn get_uniform_iv(&self, program: GLuint, location: GLint) -> [GLint; MAX_UNIFORM_COMPONENTS];
    fn get_uniform_fv(&self, program: GLuint, location: GLint) -> [f32; MAX_UNIFORM_COMPONENTS];

    fn create_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, vao: GLuint);
    fn draw_triangles(&self, vao: GLuint, vertices: i32);
    fn viewport(&self, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32);
}

/// [`Gl`] backed by the function pointers of the `gl` crate.
///
/// Only obtainable through [`NativeGl::load_with`], so every call goes to a
/// loaded context.
#[derive(Debug, Copy, Clone)]
pub struct NativeGl {
    _loaded: (),
}

impl NativeGl {
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        Self { _loaded: () }
    }
}

fn read_info_log(buf: &[u8]) -> String {
    let data = match buf.iter().position(|b| *b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    };

    String::from_utf8_lossy(data).trim_end().to_string()
}

impl Gl for NativeGl {
    fn create_shader(&self, stage: Stage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(
                shader,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            );
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut buf = [0_u8; INFO_LOG_CAPACITY];

        unsafe {
            gl::GetShaderInfoLog(
                shader,
                INFO_LOG_CAPACITY as i32,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        read_info_log(&buf)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut buf = [0_u8; INFO_LOG_CAPACITY];

        unsafe {
            gl::GetProgramInfoLog(
                program,
                INFO_LOG_CAPACITY as i32,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        read_info_log(&buf)
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { gl::Uniform1i(location, value) }
    }

    fn uniform_1f(&self, location: GLint, value: f32) {
        unsafe { gl::Uniform1f(location, value) }
    }

    fn uniform_3f(&self, location: GLint, x: f32, y: f32, z: f32) {
        unsafe { gl::Uniform3f(location, x, y, z) }
    }

    fn uniform_matrix_4fv(&self, location: GLint, value: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr()) }
    }

    // GL writes as many components as the uniform's declared type has, which
    // is never more than the buffer holds.
    fn get_uniform_iv(&self, program: GLuint, location: GLint) -> [GLint; MAX_UNIFORM_COMPONENTS] {
        let mut out = [0; MAX_UNIFORM_COMPONENTS];
        unsafe { gl::GetUniformiv(program, location, out.as_mut_ptr()) };
        out
    }

    fn get_uniform_fv(&self, program: GLuint, location: GLint) -> [f32; MAX_UNIFORM_COMPONENTS] {
        let mut out = [0.0; MAX_UNIFORM_COMPONENTS];
        unsafe { gl::GetUniformfv(program, location, out.as_mut_ptr()) };
        out
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, (&mut vao) as *mut u32) };
        vao
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, (&vao) as *const u32) }
    }

    fn draw_triangles(&self, vao: GLuint, vertices: i32) {
        unsafe {
            gl::BindVertexArray(vao);
            gl::DrawArrays(gl::TRIANGLES, 0, vertices);
        }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { gl::Viewport(0, 0, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32) {
        unsafe {
            gl::ClearColor(r, g, b, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }
}
