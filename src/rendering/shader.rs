//! # 着色器构建
//!
//! 编译 + 链接，显式查询状态。失败不 panic：错误日志写 stderr 并弹
//! 阻塞式错误对话框，调用方把 program 记为 `None`，后续照常渲染
//! （只是对应内容不可见）。

use std::error::Error;
use std::fmt::{Display, Formatter};

use glow::HasContext as _;

#[derive(Debug)]
pub enum ShaderError {
    Compile(String),
    Link(String),
}

impl Display for ShaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compile(log) => write!(f, "着色器编译失败:\n{log}"),
            Self::Link(log) => write!(f, "着色器链接失败:\n{log}"),
        }
    }
}

impl Error for ShaderError {}

/// 编译并链接一个 program。`attribs` 在链接前绑定固定的属性槽位，
/// 这样 VAO 布局不依赖链接是否成功。
pub fn create_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
    attribs: &[(u32, &str)],
) -> Result<glow::Program, ShaderError> {
    unsafe {
        let vert = compile(gl, glow::VERTEX_SHADER, vertex_src)?;
        let frag = match compile(gl, glow::FRAGMENT_SHADER, fragment_src) {
            Ok(frag) => frag,
            Err(err) => {
                gl.delete_shader(vert);
                return Err(err);
            }
        };

        let program = gl.create_program().expect("GL: 创建程序失败");
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        for (index, name) in attribs {
            gl.bind_attrib_location(program, *index, name);
        }
        gl.link_program(program);

        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(ShaderError::Link(log));
        }
        Ok(program)
    }
}

fn compile(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader, ShaderError> {
    unsafe {
        let shader = gl.create_shader(kind).expect("GL: 创建着色器失败");
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(ShaderError::Compile(log));
        }
        Ok(shader)
    }
}

/// 统一的失败上报：stderr 一行 + 阻塞对话框，然后继续运行。
pub fn report_build_failure(what: &str, err: &ShaderError) {
    eprintln!("[render] {what}: {err}");
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("着色器构建失败")
        .set_description(format!("{what}\n\n{err}"))
        .show();
}
