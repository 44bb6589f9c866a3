//! # 视口绘制回调
//!
//! egui 回放绘制列表时执行，轮到本视口的那条 PaintCallback 才跑到
//! 这里——此刻才允许发真正的 GL 命令。回调携带的是相机槽位下标，
//! 相机记录在回放时从共享状态里解析，不持有任何跨帧指针。
//!
//! 流程固定：存状态 → 设视口/裁剪 → 按相机类型画 → 还原状态。

use std::sync::Mutex;

use glow::HasContext as _;

use crate::document::map::PlacedEntry;
use crate::library::Library;
use crate::viewport::{ViewCamera, ViewKind, ViewState};

use super::gl_state::GlStateSnapshot;
use super::grid::{GRID_GUIDE_LEVEL, GridCache, GridResources, grid_level_for_zoom};
use super::transform::{
    Mat4, create_perspective_fov, create_translation, create_view_matrix, flatten, mul_matrix,
};

/// 透视投影参数：垂直 FOV 90°，近远裁剪面 0.1 / 1000
const PERSPECTIVE_FOV: f32 = 90.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

#[allow(clippy::too_many_arguments)]
pub fn paint_view(
    gl: &glow::Context,
    info: &egui::PaintCallbackInfo,
    view_index: usize,
    views: &Mutex<ViewState>,
    scene: &Mutex<Vec<PlacedEntry>>,
    library: &Mutex<Library>,
    grid: &Mutex<GridCache>,
) {
    // 回放时按下标解析相机，拷一份快照用于本次绘制
    let camera = {
        let state = views.lock().unwrap();
        state.cameras[view_index].clone()
    };

    let snapshot = GlStateSnapshot::capture(gl);

    let mut grid = grid.lock().unwrap();
    let resources = grid.ensure_initialized(gl);

    // egui 的裁剪矩形以左上角为原点（物理像素），GL 视口以左下角
    // 为原点：y 要翻转
    let clip = info.clip_rect_in_pixels();
    let screen_h = info.screen_size_px[1] as i32;
    unsafe {
        gl.disable(glow::BLEND);
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::CULL_FACE);
        gl.disable(glow::SCISSOR_TEST);
        gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
        gl.viewport(
            clip.left_px,
            screen_h - clip.top_px - clip.height_px,
            clip.width_px,
            clip.height_px,
        );
        gl.scissor(
            clip.left_px,
            screen_h - clip.top_px - clip.height_px,
            clip.width_px,
            clip.height_px,
        );
    }

    // 矩阵按相机记录里的布局矩形（逻辑点）算：指针输入和拖拽换算
    // 都在点空间，保持同一单位
    let w = camera.rect.width();
    let h = camera.rect.height();

    match camera.kind {
        ViewKind::Perspective => draw_perspective(gl, resources, &camera, w, h, scene, library),
        _ => draw_orthographic(gl, resources, &camera, w, h),
    }

    snapshot.restore(gl);
}

fn draw_perspective(
    gl: &glow::Context,
    resources: &GridResources,
    camera: &ViewCamera,
    w: f32,
    h: f32,
    scene: &Mutex<Vec<PlacedEntry>>,
    library: &Mutex<Library>,
) {
    let view = create_view_matrix(camera.position, camera.angle_x, camera.angle_z);
    let proj = create_perspective_fov(PERSPECTIVE_FOV, w / h, NEAR_PLANE, FAR_PLANE);
    let view_proj = flatten(&mul_matrix(&view, &proj));

    unsafe {
        // 深度缓冲残留上一帧的内容，清除范围用裁剪矩形限定住
        gl.enable(glow::SCISSOR_TEST);
        gl.depth_mask(true);
        gl.clear(glow::DEPTH_BUFFER_BIT);
        gl.enable(glow::DEPTH_TEST);
        gl.enable(glow::CULL_FACE);
    }

    // 场景模型：平移矩阵 + 子网格逐个提交
    let library = library.lock().unwrap();
    let placed = scene.lock().unwrap();
    if let Some(shader) = library.mesh_shader() {
        unsafe {
            gl.use_program(Some(shader.program));
            gl.uniform_matrix_4_f32_slice(shader.u_proj.as_ref(), false, &view_proj);
        }
        for entry in placed.iter() {
            let Some(model) = library.get(entry.model_id) else {
                continue;
            };
            let world = flatten(&create_translation(entry.position));
            unsafe {
                gl.uniform_matrix_4_f32_slice(shader.u_world.as_ref(), false, &world);
            }
            for mesh in &model.meshes {
                unsafe {
                    gl.bind_vertex_array(Some(mesh.vao));
                    gl.draw_elements(glow::TRIANGLES, mesh.element_count, mesh.element_type, 0);
                }
            }
        }
    }

    // 地面网格：测试开、写入关，网格被模型遮挡但不在模型上开洞
    unsafe {
        gl.depth_mask(false);
        gl.disable(glow::CULL_FACE);
    }
    if let Some(program) = &resources.program_3d {
        unsafe {
            gl.use_program(Some(program.program));
            gl.uniform_matrix_4_f32_slice(program.u_proj.as_ref(), false, &view_proj);
        }
        resources.meshes[0].draw(gl);
    }
    unsafe {
        // 深度写入不在状态快照的捕获集里，手动复位
        gl.depth_mask(true);
    }
}

fn draw_orthographic(gl: &glow::Context, resources: &GridResources, camera: &ViewCamera, w: f32, h: f32) {
    let Some(program) = &resources.program_2d else {
        return;
    };

    // 左上角原点、y 向下的正交投影，和 UI 坐标一致
    let (l, r, t, b) = (0.0f32, w, 0.0f32, h);
    let projection: Mat4 = [
        [2.0 / (r - l), 0.0, 0.0, 0.0],
        [0.0, 2.0 / (t - b), 0.0, 0.0],
        [0.0, 0.0, -1.0, 0.0],
        [(r + l) / (l - r), (t + b) / (b - t), 0.0, 1.0],
    ];

    // 世界 (X, Y) 映射到矩形中心减 (X, Y)·zoom
    let zoom = camera.zoom();
    let world: Mat4 = [
        [zoom, 0.0, 0.0, 0.0],
        [0.0, zoom, 0.0, 0.0],
        [0.0, 0.0, zoom, 0.0],
        [
            w / 2.0 - camera.position[0] * zoom,
            h / 2.0 - camera.position[1] * zoom,
            0.0,
            1.0,
        ],
    ];

    unsafe {
        gl.use_program(Some(program.program));
        gl.uniform_matrix_4_f32_slice(program.u_world.as_ref(), false, &flatten(&world));
        gl.uniform_matrix_4_f32_slice(program.u_proj.as_ref(), false, &flatten(&projection));
    }

    // 按缩放档位选一套网格，0 档不画
    if let Some(level) = grid_level_for_zoom(camera.zoom_level) {
        resources.meshes[level].draw(gl);
    }
    // 原点参考线永远叠加在最上层
    resources.meshes[GRID_GUIDE_LEVEL].draw(gl);
}
