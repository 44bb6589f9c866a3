//! # GL 状态快照
//!
//! 视口绘制回调运行在 egui 自己的 GL 绘制过程中间，回调里会随意
//! 改动全局管线状态（program、VAO、混合、裁剪……）。egui 的
//! painter 在回调返回后立即继续绘制剩余 UI，并假定状态未被动过，
//! 所以回调开头 [`GlStateSnapshot::capture`]，结尾
//! [`GlStateSnapshot::restore`]，保证捕获的每一项在前后观测一致。

use std::num::NonZeroU32;

use glow::HasContext as _;

/// 一次完整的管线状态捕获。字段集合是固定的：视口渲染会动到的
/// 所有全局状态，多一项不捕、少一项不漏。
pub struct GlStateSnapshot {
    active_texture: u32,
    program: Option<glow::Program>,
    texture_2d: Option<glow::Texture>,
    sampler: Option<glow::Sampler>,
    array_buffer: Option<glow::Buffer>,
    vertex_array: Option<glow::VertexArray>,
    polygon_mode: [i32; 2],
    viewport: [i32; 4],
    scissor_box: [i32; 4],
    blend_src_rgb: u32,
    blend_dst_rgb: u32,
    blend_src_alpha: u32,
    blend_dst_alpha: u32,
    blend_equation_rgb: u32,
    blend_equation_alpha: u32,
    enable_blend: bool,
    enable_cull_face: bool,
    enable_depth_test: bool,
    enable_scissor_test: bool,
}

impl GlStateSnapshot {
    pub fn capture(gl: &glow::Context) -> Self {
        unsafe {
            let active_texture = gl.get_parameter_i32(glow::ACTIVE_TEXTURE) as u32;
            // 纹理绑定按单元 0 捕获/恢复
            gl.active_texture(glow::TEXTURE0);

            let mut polygon_mode = [0i32; 2];
            gl.get_parameter_i32_slice(glow::POLYGON_MODE, &mut polygon_mode);
            let mut viewport = [0i32; 4];
            gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);
            let mut scissor_box = [0i32; 4];
            gl.get_parameter_i32_slice(glow::SCISSOR_BOX, &mut scissor_box);

            Self {
                active_texture,
                program: NonZeroU32::new(gl.get_parameter_i32(glow::CURRENT_PROGRAM) as u32)
                    .map(glow::NativeProgram),
                texture_2d: NonZeroU32::new(gl.get_parameter_i32(glow::TEXTURE_BINDING_2D) as u32)
                    .map(glow::NativeTexture),
                sampler: NonZeroU32::new(gl.get_parameter_i32(glow::SAMPLER_BINDING) as u32)
                    .map(glow::NativeSampler),
                array_buffer: NonZeroU32::new(
                    gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING) as u32,
                )
                .map(glow::NativeBuffer),
                vertex_array: NonZeroU32::new(
                    gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING) as u32,
                )
                .map(glow::NativeVertexArray),
                polygon_mode,
                viewport,
                scissor_box,
                blend_src_rgb: gl.get_parameter_i32(glow::BLEND_SRC_RGB) as u32,
                blend_dst_rgb: gl.get_parameter_i32(glow::BLEND_DST_RGB) as u32,
                blend_src_alpha: gl.get_parameter_i32(glow::BLEND_SRC_ALPHA) as u32,
                blend_dst_alpha: gl.get_parameter_i32(glow::BLEND_DST_ALPHA) as u32,
                blend_equation_rgb: gl.get_parameter_i32(glow::BLEND_EQUATION_RGB) as u32,
                blend_equation_alpha: gl.get_parameter_i32(glow::BLEND_EQUATION_ALPHA) as u32,
                enable_blend: gl.is_enabled(glow::BLEND),
                enable_cull_face: gl.is_enabled(glow::CULL_FACE),
                enable_depth_test: gl.is_enabled(glow::DEPTH_TEST),
                enable_scissor_test: gl.is_enabled(glow::SCISSOR_TEST),
            }
        }
    }

    pub fn restore(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(self.program);
            gl.bind_texture(glow::TEXTURE_2D, self.texture_2d);
            gl.bind_sampler(0, self.sampler);
            gl.active_texture(self.active_texture);
            gl.bind_vertex_array(self.vertex_array);
            gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
            gl.blend_equation_separate(self.blend_equation_rgb, self.blend_equation_alpha);
            gl.blend_func_separate(
                self.blend_src_rgb,
                self.blend_dst_rgb,
                self.blend_src_alpha,
                self.blend_dst_alpha,
            );
            set_enabled(gl, glow::BLEND, self.enable_blend);
            set_enabled(gl, glow::CULL_FACE, self.enable_cull_face);
            set_enabled(gl, glow::DEPTH_TEST, self.enable_depth_test);
            set_enabled(gl, glow::SCISSOR_TEST, self.enable_scissor_test);
            gl.polygon_mode(glow::FRONT_AND_BACK, self.polygon_mode[0] as u32);
            gl.viewport(
                self.viewport[0],
                self.viewport[1],
                self.viewport[2],
                self.viewport[3],
            );
            gl.scissor(
                self.scissor_box[0],
                self.scissor_box[1],
                self.scissor_box[2],
                self.scissor_box[3],
            );
        }
    }
}

fn set_enabled(gl: &glow::Context, cap: u32, enabled: bool) {
    unsafe {
        if enabled {
            gl.enable(cap);
        } else {
            gl.disable(cap);
        }
    }
}
