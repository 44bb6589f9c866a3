//! # 网格缓存
//!
//! 4 套静态线网格，物理刻度分别为 1x / 10x / 100x / 1000x，进程内
//! 只构建一次。缩放改变时换着画哪一套（mesh 选择），从不重建顶点。
//! 级别 3 同时兼任正交视口的"原点参考线"，永远叠加在最上层。
//!
//! GL 资源在第一次绘制回调里惰性初始化（此时才有当前上下文），
//! 用显式的 `Option<GridResources>` 持有，而不是藏在静态标志后面。

use glow::HasContext as _;

use super::shader::{self, ShaderError};

pub const GRID_LEVELS: usize = 4;
/// 每级网格的原点参考线级别（最粗一套）
pub const GRID_GUIDE_LEVEL: usize = 3;

/// 一套网格横跨 101 步（±50 格），每步一组十字线
const GRID_SPAN: usize = 101;

/// 4 档颜色渐变：细线用本级颜色，每 10 步的粗线借用下一级
const GRID_COLORS: [[f32; 4]; 4] = [
    [0.1, 0.15, 0.2, 1.0],
    [0.2, 0.3, 0.4, 1.0],
    [0.3, 0.45, 0.6, 1.0],
    [0.8, 0.8, 0.8, 1.0],
];

const GRID_VERT_2D: &str = r#"#version 140

uniform mat4 u_world;
uniform mat4 u_proj;
in vec2 a_pos;
in vec4 a_color;
out vec4 v_color;

void main() {
    v_color = a_color;
    gl_Position = u_proj * (u_world * vec4(a_pos.xy, 0.0, 1.0));
}
"#;

const GRID_VERT_3D: &str = r#"#version 140

uniform mat4 u_proj;
in vec2 a_pos;
in vec4 a_color;
out vec4 v_color;

void main() {
    v_color = a_color;
    gl_Position = u_proj * vec4(a_pos.xy, 0.0, 1.0);
}
"#;

const GRID_FRAG: &str = r#"#version 140

in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;

/// 按缩放档位选网格级别。0 档什么都不画（参考线除外）。
pub fn grid_level_for_zoom(zoom_level: i32) -> Option<usize> {
    if zoom_level >= 13 {
        Some(0)
    } else if zoom_level >= 7 {
        Some(1)
    } else if zoom_level >= 1 {
        Some(2)
    } else {
        None
    }
}

pub struct Grid2dProgram {
    pub program: glow::Program,
    pub u_world: Option<glow::UniformLocation>,
    pub u_proj: Option<glow::UniformLocation>,
}

pub struct Grid3dProgram {
    pub program: glow::Program,
    pub u_proj: Option<glow::UniformLocation>,
}

pub struct GridMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

impl GridMesh {
    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.draw_arrays(glow::LINES, 0, self.vertex_count);
        }
    }
}

pub struct GridResources {
    pub program_2d: Option<Grid2dProgram>,
    pub program_3d: Option<Grid3dProgram>,
    pub meshes: [GridMesh; GRID_LEVELS],
}

pub struct GridCache {
    resources: Option<GridResources>,
}

impl GridCache {
    pub fn new() -> Self {
        Self { resources: None }
    }

    /// 幂等：首次调用构建着色器 + 4 套顶点缓冲，之后直接复用。
    pub fn ensure_initialized(&mut self, gl: &glow::Context) -> &GridResources {
        if self.resources.is_none() {
            self.resources = Some(init_resources(gl));
        }
        self.resources.as_ref().unwrap()
    }

    /// 释放 GL 资源。必须在持有当前上下文时调用。
    pub fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            unsafe {
                if let Some(p) = res.program_2d {
                    gl.delete_program(p.program);
                }
                if let Some(p) = res.program_3d {
                    gl.delete_program(p.program);
                }
                for mesh in res.meshes {
                    gl.delete_vertex_array(mesh.vao);
                    gl.delete_buffer(mesh.vbo);
                }
            }
        }
    }
}

fn init_resources(gl: &glow::Context) -> GridResources {
    let attribs: &[(u32, &str)] = &[(0, "a_pos"), (1, "a_color")];

    let program_2d = match shader::create_program(gl, GRID_VERT_2D, GRID_FRAG, attribs) {
        Ok(program) => unsafe {
            Some(Grid2dProgram {
                u_world: gl.get_uniform_location(program, "u_world"),
                u_proj: gl.get_uniform_location(program, "u_proj"),
                program,
            })
        },
        Err(err) => {
            report(&err, "2D 网格");
            None
        }
    };

    let program_3d = match shader::create_program(gl, GRID_VERT_3D, GRID_FRAG, attribs) {
        Ok(program) => unsafe {
            Some(Grid3dProgram {
                u_proj: gl.get_uniform_location(program, "u_proj"),
                program,
            })
        },
        Err(err) => {
            report(&err, "3D 网格");
            None
        }
    };

    let meshes = std::array::from_fn(|level| build_mesh(gl, level));

    GridResources {
        program_2d,
        program_3d,
        meshes,
    }
}

fn report(err: &ShaderError, what: &str) {
    shader::report_build_failure(&format!("{what}着色器"), err);
}

fn build_mesh(gl: &glow::Context, level: usize) -> GridMesh {
    let vertices = build_level_vertices(level);
    let vertex_count = (vertices.len() / 6) as i32;

    unsafe {
        let vao = gl.create_vertex_array().expect("GL: 创建 VAO 失败");
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().expect("GL: 创建 VBO 失败");
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        let bytes: &[u8] = core::slice::from_raw_parts(
            vertices.as_ptr() as *const u8,
            vertices.len() * core::mem::size_of::<f32>(),
        );
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytes, glow::STATIC_DRAW);

        // 槽位 0 = a_pos (vec2)，槽位 1 = a_color (vec4)，交错 24 字节
        gl.enable_vertex_attrib_array(0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 24, 0);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, 24, 8);

        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        GridMesh {
            vao,
            vbo,
            vertex_count,
        }
    }
}

/// 级别 `level` 的顶点数据：位置 vec2 + 颜色 vec4 交错。
///
/// 每个整数步放一组十字线（竖线 + 横线各 2 个端点）；非 10 倍数的
/// 步用本级颜色，10 倍数的步用下一级颜色。这样四套网格在数值上
/// 自相似：级别 g 的粗线正好落在级别 g+1 的细线上。
fn build_level_vertices(level: usize) -> Vec<f32> {
    let scale = 10.0f32.powi(level as i32);
    let half = 50.0 * scale;
    let minor = GRID_COLORS[level];
    let major = GRID_COLORS[(level + 1).min(GRID_LEVELS - 1)];

    let mut vertices = Vec::with_capacity(GRID_SPAN * 4 * 6);
    for i in 0..GRID_SPAN {
        if i % 10 == 0 {
            continue;
        }
        push_cross(&mut vertices, i as f32 * scale - half, half, &minor);
    }
    for i in (0..GRID_SPAN).step_by(10) {
        push_cross(&mut vertices, i as f32 * scale - half, half, &major);
    }
    vertices
}

fn push_cross(out: &mut Vec<f32>, offset: f32, half: f32, color: &[f32; 4]) {
    for (x, y) in [(offset, -half), (offset, half), (-half, offset), (half, offset)] {
        out.push(x);
        out.push(y);
        out.extend_from_slice(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_selection_matches_zoom_thresholds() {
        assert_eq!(grid_level_for_zoom(0), None);
        assert_eq!(grid_level_for_zoom(1), Some(2));
        assert_eq!(grid_level_for_zoom(6), Some(2));
        assert_eq!(grid_level_for_zoom(7), Some(1));
        assert_eq!(grid_level_for_zoom(12), Some(1));
        assert_eq!(grid_level_for_zoom(13), Some(0));
        assert_eq!(grid_level_for_zoom(24), Some(0));
    }

    #[test]
    fn level_vertices_cover_full_span() {
        // 90 个细步 + 11 个粗步，每步 4 个顶点，每顶点 6 个浮点
        let vertices = build_level_vertices(0);
        assert_eq!(vertices.len(), (90 + 11) * 4 * 6);
    }

    #[test]
    fn major_lines_use_next_ramp_color() {
        let vertices = build_level_vertices(1);
        // 细线在前：第一个顶点颜色 = 本级
        assert_eq!(&vertices[2..6], &GRID_COLORS[1][..]);
        // 粗线在后：最后一个顶点颜色 = 下一级
        let last = vertices.len() - 6;
        assert_eq!(&vertices[last + 2..], &GRID_COLORS[2][..]);
    }

    #[test]
    fn level_scale_grows_by_ten() {
        let l0 = build_level_vertices(0);
        let l2 = build_level_vertices(2);
        // 第一条细线的 x 坐标按 10^level 放大
        assert!((l0[0] * 100.0 - l2[0]).abs() < 1e-3);
        // 顶层级别的粗线颜色被钳到渐变末档
        let l3 = build_level_vertices(3);
        let last = l3.len() - 6;
        assert_eq!(&l3[last + 2..], &GRID_COLORS[3][..]);
    }
}
