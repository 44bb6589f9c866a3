//! # 视口面板（控制器）
//!
//! 每帧每个活动视口跑一遍：算布局矩形 → 固定 egui 窗口 → 解释
//! 悬停/拖拽/滚轮输入 → 更新相机 → 注册延迟绘制回调。
//!
//! 输入按视口矩形限定：滚轮和中键按下只在悬停时生效；拖拽会话一旦
//! 建立，持有视口直接读全局指针状态，指针划出矩形也不丢失捕捉，
//! 直到中键抬起。

use std::sync::{Arc, Mutex};

use egui::{Align2, Color32, FontId, PointerButton, Sense, vec2};

use crate::document::map::PlacedEntry;
use crate::library::Library;
use crate::rendering::grid::GridCache;
use crate::rendering::view_renderer;

use super::{FlyKeys, ViewKind, ViewLayout, ViewState, pan_from_drag, view_rect};

/// 控制器和绘制回调共用的状态束。回调闭包持有这些 Arc 的克隆，
/// 回放晚于本帧任何内存挪动也不会产生悬垂。
#[derive(Clone)]
pub struct ViewportShared {
    pub views: Arc<Mutex<ViewState>>,
    pub scene: Arc<Mutex<Vec<PlacedEntry>>>,
    pub library: Arc<Mutex<Library>>,
    pub grid: Arc<Mutex<GridCache>>,
}

impl ViewportShared {
    pub fn new() -> Self {
        Self {
            views: Arc::new(Mutex::new(ViewState::new())),
            scene: Arc::new(Mutex::new(Vec::new())),
            library: Arc::new(Mutex::new(Library::new())),
            grid: Arc::new(Mutex::new(GridCache::new())),
        }
    }
}

/// 一个视口的每帧入口。返回相机的持久化字段是否被改动
/// （调用方据此写回文档并置脏标记）。
pub fn show_view(
    ctx: &egui::Context,
    shared: &ViewportShared,
    kind: ViewKind,
    layout: ViewLayout,
    index: usize,
) -> bool {
    let avail = ctx.available_rect();
    let rect = view_rect(avail, layout, index);
    let mut changed = false;

    egui::Window::new(kind.display_name())
        .fixed_rect(rect)
        .movable(false)
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            let size = ui.available_size();
            let (area, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

            let mut state = shared.views.lock().unwrap();

            if response.hovered() {
                // 滚轮一帧一档，表两端的事件是 no-op。
                // 透视视口的档位不参与持久化，不置脏。
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll < -0.1 {
                    let stepped = state.cameras[index].zoom_out();
                    changed |= stepped && kind != ViewKind::Perspective;
                } else if scroll > 0.1 {
                    let stepped = state.cameras[index].zoom_in();
                    changed |= stepped && kind != ViewKind::Perspective;
                }

                // 中键按下：会话空闲才能拿到
                if ui.input(|i| i.pointer.button_pressed(PointerButton::Middle)) {
                    state.try_begin_drag(index);
                }
            }

            if state.drag_owner() == Some(index) {
                let start = state
                    .dragging
                    .map(|session| session.start_position)
                    .unwrap_or_default();
                let camera = &mut state.cameras[index];

                if kind == ViewKind::Perspective {
                    // 飞行：指针增量转角度，按住的移动键按帧时间积分
                    let delta = ui.input(|i| i.pointer.delta());
                    if delta != egui::Vec2::ZERO {
                        camera.apply_look_delta(delta.x, delta.y);
                        changed = true;
                    }
                    let keys = ui.input(|i| FlyKeys {
                        forward: i.key_down(egui::Key::W),
                        back: i.key_down(egui::Key::S),
                        left: i.key_down(egui::Key::A),
                        right: i.key_down(egui::Key::D),
                        up: i.key_down(egui::Key::E),
                        down: i.key_down(egui::Key::Q),
                    });
                    if keys.any() {
                        let dt = ui.input(|i| i.stable_dt);
                        camera.fly(&keys, dt);
                        changed = true;
                    }
                    // 会话期间光标保持隐藏
                    ctx.set_cursor_icon(egui::CursorIcon::None);
                } else {
                    // 平移：从按下点的累计位移重算，丢帧不累积误差。
                    // 指针暂时读不到位置（移出窗口）就保持原位。
                    let drag = ui.input(|i| {
                        i.pointer
                            .press_origin()
                            .zip(i.pointer.latest_pos())
                            .map(|(origin, pos)| pos - origin)
                    });
                    if let Some(drag) = drag {
                        let target = pan_from_drag(start, [drag.x, drag.y], camera.zoom());
                        if target != [camera.position[0], camera.position[1]] {
                            camera.position[0] = target[0];
                            camera.position[1] = target[1];
                            changed = true;
                        }
                    }
                }

                // 中键抬起即结束会话，指针在哪个视口上都算
                if !ui.input(|i| i.pointer.button_down(PointerButton::Middle)) {
                    state.end_drag(index);
                    if kind == ViewKind::Perspective {
                        ctx.set_cursor_icon(egui::CursorIcon::Default);
                    }
                }
            }

            // 本帧解析出的类型和布局矩形写回相机记录
            let camera = &mut state.cameras[index];
            camera.kind = kind;
            camera.rect = area;

            let overlay = match kind {
                ViewKind::Perspective => format!(
                    "({:.1}, {:.1}, {:.1})  pitch {:.0}  yaw {:.0}",
                    camera.position[0],
                    camera.position[1],
                    camera.position[2],
                    camera.angle_x,
                    camera.angle_z,
                ),
                _ => format!(
                    "({:.1}, {:.1})  x{}",
                    camera.position[0],
                    camera.position[1],
                    camera.zoom(),
                ),
            };
            drop(state);

            // 注册延迟绘制回调：只携带槽位下标，回放时再解析相机
            let views = Arc::clone(&shared.views);
            let scene = Arc::clone(&shared.scene);
            let library = Arc::clone(&shared.library);
            let grid = Arc::clone(&shared.grid);
            let callback = egui_glow::CallbackFn::new(move |info, painter| {
                view_renderer::paint_view(
                    painter.gl(),
                    &info,
                    index,
                    &views,
                    &scene,
                    &library,
                    &grid,
                );
            });
            ui.painter().add(egui::PaintCallback {
                rect: area,
                callback: Arc::new(callback),
            });

            // 调试遥测叠加在左上角
            ui.painter().text(
                area.left_top() + vec2(6.0, 4.0),
                Align2::LEFT_TOP,
                overlay,
                FontId::monospace(12.0),
                Color32::from_gray(200),
            );
        });

    changed
}
