//! # 模型库
//!
//! 文档打开时一次性把 `library` 数组加载成 GPU 资源：OBJ 网格上传
//! 为 vao/vbo/ibo，diffuse 贴图解码成 egui 纹理给右侧面板当缩略图。
//! 渲染回调只通过 [`Library::get`] 取不透明的网格句柄。
//!
//! 单个条目失败（文件缺失、空网格）弹错误框并跳过，整个加载流程
//! 不中断——打不开一个模型不应该毁掉整张地图。

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

use glow::HasContext as _;

use crate::document::Document;
use crate::rendering::shader;

const MESH_VERT: &str = r#"#version 140

uniform mat4 u_world;
uniform mat4 u_proj;
in vec3 a_pos;
in vec3 a_normal;
in vec4 a_color;
in vec2 a_uv;
out vec3 v_normal;
out vec4 v_color;
out vec2 v_uv;

void main() {
    v_normal = normalize((u_world * vec4(a_normal, 0.0)).xyz);
    v_color = a_color;
    v_uv = a_uv;
    gl_Position = u_proj * (u_world * vec4(a_pos, 1.0));
}
"#;

const MESH_FRAG: &str = r#"#version 140

in vec3 v_normal;
in vec4 v_color;
in vec2 v_uv;
out vec4 frag_color;

void main() {
    frag_color = v_color
        * mix(0.7, 1.0, v_normal.z * 0.5 + 0.5)
        * mix(0.8, 1.0, abs(v_normal.x));
}
"#;

/// 顶点布局：位置 3 + 法线 3 + 颜色 4 + UV 2，交错 48 字节
const VERTEX_FLOATS: usize = 12;

#[derive(Debug)]
pub enum LibraryError {
    Import(String),
    EmptyMesh,
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import(message) => write!(f, "模型导入失败: {message}"),
            Self::EmptyMesh => write!(f, "模型里有空网格"),
        }
    }
}

impl Error for LibraryError {}

pub struct MeshShader {
    pub program: glow::Program,
    pub u_world: Option<glow::UniformLocation>,
    pub u_proj: Option<glow::UniformLocation>,
}

/// 一个子网格的 GPU 句柄
pub struct GpuMesh {
    pub vao: glow::VertexArray,
    pub vbo: glow::Buffer,
    pub ibo: glow::Buffer,
    pub element_count: i32,
    /// `UNSIGNED_SHORT` 或 `UNSIGNED_INT`，由顶点数决定
    pub element_type: u32,
}

pub struct Model {
    pub meshes: Vec<GpuMesh>,
}

/// 右侧面板展示用的缩略图
pub struct Thumbnail {
    pub name: String,
    pub texture: egui::TextureHandle,
}

pub struct Library {
    shader: Option<MeshShader>,
    shader_failed: bool,
    models: HashMap<u64, Model>,
    thumbnails: Vec<Thumbnail>,
}

impl Library {
    pub fn new() -> Self {
        Self {
            shader: None,
            shader_failed: false,
            models: HashMap::new(),
            thumbnails: Vec::new(),
        }
    }

    pub fn mesh_shader(&self) -> Option<&MeshShader> {
        self.shader.as_ref()
    }

    pub fn get(&self, id: u64) -> Option<&Model> {
        self.models.get(&id)
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    /// 清空上一张地图的资源并按文档重新加载。
    /// 相对路径相对于地图文件所在目录解析。
    pub fn load(&mut self, gl: &glow::Context, egui_ctx: &egui::Context, document: &Document) {
        self.ensure_shader(gl);
        self.clear_models(gl);

        let base_dir = document
            .filename
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let Some(entries) = document.json["library"].as_array() else {
            return;
        };

        for entry in entries {
            let id = entry["id"].as_u64().unwrap_or(0);
            let name = entry["name"].as_str().unwrap_or("").to_string();
            let scale = entry["scale"].as_f64().unwrap_or(1.0) as f32;

            if let Some(diffuse) = entry["diffuse"].as_str() {
                if let Some(texture) =
                    load_thumbnail(egui_ctx, &base_dir.join(diffuse), &name)
                {
                    self.thumbnails.push(Thumbnail {
                        name: name.clone(),
                        texture,
                    });
                }
            }

            if let Some(filename) = entry["filename"].as_str() {
                let path = base_dir.join(filename);
                match load_model(gl, &path, scale) {
                    Ok(model) => {
                        self.models.insert(id, model);
                    }
                    Err(err) => {
                        eprintln!("[library] {}: {err}", path.display());
                        let _ = rfd::MessageDialog::new()
                            .set_level(rfd::MessageLevel::Error)
                            .set_title("加载模型")
                            .set_description(format!("{}\n{err}", path.display()))
                            .show();
                    }
                }
            }
        }
    }

    fn ensure_shader(&mut self, gl: &glow::Context) {
        if self.shader.is_some() || self.shader_failed {
            return;
        }
        let attribs: &[(u32, &str)] =
            &[(0, "a_pos"), (1, "a_normal"), (2, "a_color"), (3, "a_uv")];
        match shader::create_program(gl, MESH_VERT, MESH_FRAG, attribs) {
            Ok(program) => unsafe {
                self.shader = Some(MeshShader {
                    u_world: gl.get_uniform_location(program, "u_world"),
                    u_proj: gl.get_uniform_location(program, "u_proj"),
                    program,
                });
            },
            Err(err) => {
                // 只报一次，之后的加载静默跳过着色器
                shader::report_build_failure("场景网格着色器", &err);
                self.shader_failed = true;
            }
        }
    }

    fn clear_models(&mut self, gl: &glow::Context) {
        for (_, model) in self.models.drain() {
            for mesh in model.meshes {
                unsafe {
                    gl.delete_vertex_array(mesh.vao);
                    gl.delete_buffer(mesh.vbo);
                    gl.delete_buffer(mesh.ibo);
                }
            }
        }
        self.thumbnails.clear();
    }

    /// 退出前释放全部 GL 资源
    pub fn destroy(&mut self, gl: &glow::Context) {
        self.clear_models(gl);
        if let Some(shader) = self.shader.take() {
            unsafe {
                gl.delete_program(shader.program);
            }
        }
    }
}

fn load_thumbnail(
    egui_ctx: &egui::Context,
    path: &Path,
    name: &str,
) -> Option<egui::TextureHandle> {
    let image = match image::open(path) {
        Ok(image) => image.to_rgba8(),
        Err(err) => {
            // 贴图缺失不致命，面板里显示不出缩略图而已
            eprintln!("[library] 缩略图解码失败 {}: {err}", path.display());
            return None;
        }
    };
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image.into_raw();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &pixels);
    Some(egui_ctx.load_texture(
        format!("library_thumb_{name}"),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

fn load_model(gl: &glow::Context, path: &Path, scale: f32) -> Result<Model, LibraryError> {
    let (obj_models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|err| LibraryError::Import(err.to_string()))?;

    let mut meshes = Vec::with_capacity(obj_models.len());
    for obj in obj_models {
        let mesh = obj.mesh;
        let vertex_count = mesh.positions.len() / 3;
        if vertex_count == 0 {
            return Err(LibraryError::EmptyMesh);
        }

        let mut vertices = Vec::with_capacity(vertex_count * VERTEX_FLOATS);
        for i in 0..vertex_count {
            // OBJ 资产按 Y 轴朝上导出，摆进 Z 轴朝上的世界要换轴
            let (x, y, z) = swap_axes(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            vertices.extend_from_slice(&[x * scale, y * scale, z * scale]);

            if mesh.normals.len() >= (i + 1) * 3 {
                let (nx, ny, nz) = swap_axes(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                );
                vertices.extend_from_slice(&[nx, ny, nz]);
            } else {
                vertices.extend_from_slice(&[0.0, 0.0, 1.0]);
            }

            if mesh.vertex_color.len() >= (i + 1) * 3 {
                vertices.extend_from_slice(&[
                    mesh.vertex_color[i * 3],
                    mesh.vertex_color[i * 3 + 1],
                    mesh.vertex_color[i * 3 + 2],
                    1.0,
                ]);
            } else {
                vertices.extend_from_slice(&[1.0, 1.0, 1.0, 1.0]);
            }

            if mesh.texcoords.len() >= (i + 1) * 2 {
                vertices.extend_from_slice(&[mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]);
            } else {
                vertices.extend_from_slice(&[0.0, 0.0]);
            }
        }

        meshes.push(upload_mesh(gl, &vertices, &mesh.indices, vertex_count));
    }

    Ok(Model { meshes })
}

/// Y-up → Z-up：(x, y, z) ↦ (x, -z, y)
fn swap_axes(x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    (x, -z, y)
}

fn upload_mesh(
    gl: &glow::Context,
    vertices: &[f32],
    indices: &[u32],
    vertex_count: usize,
) -> GpuMesh {
    unsafe {
        let vao = gl.create_vertex_array().expect("GL: 创建 VAO 失败");
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().expect("GL: 创建 VBO 失败");
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        let vertex_bytes: &[u8] = core::slice::from_raw_parts(
            vertices.as_ptr() as *const u8,
            vertices.len() * core::mem::size_of::<f32>(),
        );
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, vertex_bytes, glow::STATIC_DRAW);

        let stride = (VERTEX_FLOATS * core::mem::size_of::<f32>()) as i32;
        gl.enable_vertex_attrib_array(0);
        gl.enable_vertex_attrib_array(1);
        gl.enable_vertex_attrib_array(2);
        gl.enable_vertex_attrib_array(3);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
        gl.vertex_attrib_pointer_f32(2, 4, glow::FLOAT, false, stride, 24);
        gl.vertex_attrib_pointer_f32(3, 2, glow::FLOAT, false, stride, 40);

        // 顶点数放得进 u16 就用 16 位索引
        let ibo = gl.create_buffer().expect("GL: 创建 IBO 失败");
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        let element_type = if vertex_count > u16::MAX as usize {
            let bytes: &[u8] = core::slice::from_raw_parts(
                indices.as_ptr() as *const u8,
                indices.len() * core::mem::size_of::<u32>(),
            );
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytes, glow::STATIC_DRAW);
            glow::UNSIGNED_INT
        } else {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            let bytes: &[u8] = core::slice::from_raw_parts(
                narrow.as_ptr() as *const u8,
                narrow.len() * core::mem::size_of::<u16>(),
            );
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytes, glow::STATIC_DRAW);
            glow::UNSIGNED_SHORT
        };

        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

        GpuMesh {
            vao,
            vbo,
            ibo,
            element_count: indices.len() as i32,
            element_type,
        }
    }
}
