//! In-memory stand-in for a GL context, used by the unit tests.
//!
//! The GLSL model is deliberately tiny: a stage compiles when it defines
//! `main` and its brackets balance, `in`/`out`/`uniform` declarations are
//! collected line by line, and linking matches fragment inputs against vertex
//! outputs by name and type. Every uniform that a stage declares is active.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::rc::Rc;

use gl::types::{GLint, GLuint};

use crate::api::{Gl, Stage, INFO_LOG_CAPACITY, MAX_UNIFORM_COMPONENTS};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(Stage, GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    DeleteProgram(GLuint),
    UseProgram(GLuint),
    UniformLocation(String),
    Upload(GLint),
    DeleteVertexArray(GLuint),
    Draw(GLuint, i32),
    Viewport(i32, i32),
    Clear,
}

#[derive(Debug, Default, Clone)]
struct Declarations {
    inputs: Vec<(String, String)>,
    outputs: Vec<(String, String)>,
    uniforms: Vec<(String, String)>,
}

struct ShaderObject {
    stage: Stage,
    compiled: bool,
    log: String,
    declarations: Declarations,
    source: String,
}

#[derive(Debug, Clone)]
enum Stored {
    Ints(Vec<GLint>),
    Floats(Vec<f32>),
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: HashMap<GLint, Stored>,
}

#[derive(Default)]
struct MockState {
    next_name: GLuint,
    shaders: HashMap<GLuint, ShaderObject>,
    programs: HashMap<GLuint, ProgramObject>,
    vertex_arrays: Vec<GLuint>,
    current: GLuint,
    calls: Vec<Call>,
    refuse_programs: bool,
}

impl MockState {
    fn gen_name(&mut self) -> GLuint {
        self.next_name += 1;
        self.next_name
    }

    fn store(&mut self, location: GLint, value: Stored) {
        self.calls.push(Call::Upload(location));

        if location < 0 {
            return;
        }

        let current = self.current;
        if let Some(program) = self.programs.get_mut(&current) {
            if (location as usize) < program.uniforms.len() {
                program.values.insert(location, value);
            }
        }
    }

    fn stored(&self, program: GLuint, location: GLint) -> Option<&Stored> {
        self.programs.get(&program)?.values.get(&location)
    }
}

#[derive(Clone, Default)]
pub struct MockGl {
    state: Rc<RefCell<MockState>>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `create_program` return `0`.
    pub fn refuse_programs(&self) {
        self.state.borrow_mut().refuse_programs = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current
    }
}

fn truncate_log(mut log: String) -> String {
    if log.len() >= INFO_LOG_CAPACITY {
        let mut end = INFO_LOG_CAPACITY - 1;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

fn brackets_balance(source: &str) -> bool {
    let mut stack = Vec::new();

    for c in source.chars() {
        match c {
            '(' | '{' | '[' => stack.push(c),
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            _ => {}
        }
    }

    stack.is_empty()
}

fn parse_declarations(source: &str) -> Declarations {
    let mut declarations = Declarations::default();

    for line in source.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();

        let line = match line.strip_prefix("layout") {
            Some(rest) => match rest.find(')') {
                Some(end) => &rest[end + 1..],
                None => continue,
            },
            None => line,
        };

        let statement = line.split(';').next().unwrap_or_default();
        let tokens: Vec<&str> = statement.split_whitespace().collect();

        if tokens.len() < 3 {
            continue;
        }

        let name = tokens[2].split('[').next().unwrap_or_default().to_string();
        let entry = (tokens[1].to_string(), name);

        match tokens[0] {
            "in" => declarations.inputs.push(entry),
            "out" => declarations.outputs.push(entry),
            "uniform" => declarations.uniforms.push(entry),
            _ => {}
        }
    }

    declarations
}

fn compile(source: &str) -> Result<Declarations, String> {
    if !brackets_balance(source) {
        return Err("0:1(1): error: syntax error, unbalanced brackets".into());
    }

    if !source.contains("void main") {
        return Err("0:1(1): error: function `main' is not defined".into());
    }

    Ok(parse_declarations(source))
}

fn link(vertex: &Declarations, fragment: &Declarations) -> Result<Vec<String>, String> {
    for (ty, name) in &fragment.inputs {
        match vertex.outputs.iter().find(|(_, n)| n == name) {
            Some((out_ty, _)) if out_ty == ty => {}
            Some((out_ty, _)) => {
                return Err(format!(
                    "error: `{name}' declared as type `{out_ty}' in vertex shader and `{ty}' in fragment shader"
                ))
            }
            None => {
                return Err(format!(
                    "error: fragment shader input `{name}' has no matching output in the previous stage"
                ))
            }
        }
    }

    let mut active: Vec<(String, String)> = Vec::new();
    for (ty, name) in vertex.uniforms.iter().chain(fragment.uniforms.iter()) {
        match active.iter().find(|(_, n)| n == name) {
            Some((other, _)) if other != ty => {
                return Err(format!(
                    "error: uniform `{name}' declared as type `{other}' and `{ty}'"
                ))
            }
            Some(_) => {}
            None => active.push((ty.clone(), name.clone())),
        }
    }

    Ok(active.into_iter().map(|(_, name)| name).collect())
}

impl Gl for MockGl {
    fn create_shader(&self, stage: Stage) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.gen_name();

        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                compiled: false,
                log: String::new(),
                declarations: Declarations::default(),
                source: String::new(),
            },
        );
        state.calls.push(Call::CreateShader(stage, id));

        id
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(&shader) {
            object.source = source.to_string_lossy().to_string();
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CompileShader(shader));

        if let Some(object) = state.shaders.get_mut(&shader) {
            match compile(&object.source) {
                Ok(declarations) => {
                    object.compiled = true;
                    object.declarations = declarations;
                    object.log.clear();
                }
                Err(log) => {
                    object.compiled = false;
                    object.log = truncate_log(log);
                }
            }
        }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DeleteShader(shader));
        state.shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();

        if state.refuse_programs {
            state.calls.push(Call::CreateProgram(0));
            return 0;
        }

        let id = state.gen_name();
        state.programs.insert(id, ProgramObject::default());
        state.calls.push(Call::CreateProgram(id));

        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::AttachShader(program, shader));

        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DetachShader(program, shader));

        if let Some(object) = state.programs.get_mut(&program) {
            object.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::LinkProgram(program));

        let attached = match state.programs.get(&program) {
            Some(object) => object.attached.clone(),
            None => return,
        };

        let stage_declarations = |stage: Stage| {
            attached
                .iter()
                .filter_map(|id| state.shaders.get(id))
                .find(|s| s.stage == stage && s.compiled)
                .map(|s| s.declarations.clone())
        };

        let result = match (
            stage_declarations(Stage::Vertex),
            stage_declarations(Stage::Fragment),
        ) {
            (Some(vertex), Some(fragment)) => link(&vertex, &fragment),
            _ => Err("error: program lacks a compiled vertex or fragment stage".to_string()),
        };

        if let Some(object) = state.programs.get_mut(&program) {
            match result {
                Ok(uniforms) => {
                    object.linked = true;
                    object.uniforms = uniforms;
                    object.values.clear();
                    object.log.clear();
                }
                Err(log) => {
                    object.linked = false;
                    object.uniforms.clear();
                    object.log = truncate_log(log);
                }
            }
        }
    }

    fn link_status(&self, program: GLuint) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DeleteProgram(program));
        state.programs.remove(&program);

        if state.current == program {
            state.current = 0;
        }
    }

    fn use_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::UseProgram(program));
        state.current = program;
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        let mut state = self.state.borrow_mut();
        let name = name.to_string_lossy().to_string();
        state.calls.push(Call::UniformLocation(name.clone()));

        state
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.iter().position(|u| *u == name))
            .map(|l| l as GLint)
            .unwrap_or(-1)
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        self.state
            .borrow_mut()
            .store(location, Stored::Ints(vec![value]));
    }

    fn uniform_1f(&self, location: GLint, value: f32) {
        self.state
            .borrow_mut()
            .store(location, Stored::Floats(vec![value]));
    }

    fn uniform_3f(&self, location: GLint, x: f32, y: f32, z: f32) {
        self.state
            .borrow_mut()
            .store(location, Stored::Floats(vec![x, y, z]));
    }

    fn uniform_matrix_4fv(&self, location: GLint, value: &[f32; 16]) {
        self.state
            .borrow_mut()
            .store(location, Stored::Floats(value.to_vec()));
    }

    // Like a driver, every stored component is written regardless of the
    // type the caller expects.
    fn get_uniform_iv(&self, program: GLuint, location: GLint) -> [GLint; MAX_UNIFORM_COMPONENTS] {
        let mut out = [0; MAX_UNIFORM_COMPONENTS];
        match self.state.borrow().stored(program, location) {
            Some(Stored::Ints(v)) => v.iter().enumerate().for_each(|(i, v)| out[i] = *v),
            Some(Stored::Floats(v)) => v.iter().enumerate().for_each(|(i, v)| out[i] = *v as GLint),
            None => {}
        }
        out
    }

    fn get_uniform_fv(&self, program: GLuint, location: GLint) -> [f32; MAX_UNIFORM_COMPONENTS] {
        let mut out = [0.0; MAX_UNIFORM_COMPONENTS];
        match self.state.borrow().stored(program, location) {
            Some(Stored::Floats(v)) => v.iter().enumerate().for_each(|(i, v)| out[i] = *v),
            Some(Stored::Ints(v)) => v.iter().enumerate().for_each(|(i, v)| out[i] = *v as f32),
            None => {}
        }
        out
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.gen_name();
        state.vertex_arrays.push(id);
        id
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::DeleteVertexArray(vao));
        state.vertex_arrays.retain(|v| *v != vao);
    }

    fn draw_triangles(&self, vao: GLuint, vertices: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Draw(vao, vertices));
    }

    fn viewport(&self, width: i32, height: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Viewport(width, height));
    }

    fn clear_color(&self, _r: f32, _g: f32, _b: f32) {
        self.state.borrow_mut().calls.push(Call::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_declarations() {
        let decl = parse_declarations(
            "layout (location = 0) in vec3 aPos;\n\
             out vec2 TexCoord; // to fragment\n\
             uniform mat4 model;\n\
             uniform sampler2D textures[2];\n",
        );

        assert_eq!(decl.inputs, vec![("vec3".into(), "aPos".into())]);
        assert_eq!(decl.outputs, vec![("vec2".into(), "TexCoord".into())]);
        assert_eq!(
            decl.uniforms,
            vec![
                ("mat4".into(), "model".into()),
                ("sampler2D".into(), "textures".into())
            ]
        );
    }

    #[test]
    fn long_logs_are_bounded() {
        let log = truncate_log("e".repeat(2000));
        assert_eq!(log.len(), INFO_LOG_CAPACITY - 1);
    }

    #[test]
    fn bracket_check() {
        assert!(brackets_balance("void main() { a[0] = (1); }"));
        assert!(!brackets_balance("void main() { "));
        assert!(!brackets_balance("void main() )"));
    }
}
