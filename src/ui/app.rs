//! # 编辑器主循环
//!
//! 每帧固定顺序：快捷键 → 菜单/工具栏 → 侧边面板 → 状态栏 →
//! 视口。全视图模式只跑透视视口（槽位 0），否则按
//! 透视/顶视/左视/前视的固定顺序跑四分布局。
//!
//! 相机被视口控制器改动后统一写回文档并置脏；透视飞行会话存续
//! 期间每帧主动请求重绘，移动键的积分不依赖新输入事件。

use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui;

use crate::document::{Document, map, views};
use crate::storage::app_config::AppConfig;
use crate::ui::{layers_panel, library_panel, menu_bar, properties, status_bar, tool_bar};
use crate::viewport::panel::{ViewportShared, show_view};
use crate::viewport::{ViewKind, ViewLayout};

/// 侧边面板固定宽度
const PANEL_WIDTH: f32 = 240.0;

pub struct MapEditorApp {
    gl: Option<Arc<glow::Context>>,
    document: Document,
    config: AppConfig,
    shared: ViewportShared,
    show_left_panel: bool,
    show_right_panel: bool,
    full_view: bool,
    snap: bool,
    // 属性面板的占位数值（选择工具还没接上）
    sel_position: [f32; 3],
    sel_rotation: [f32; 3],
    sel_scale: [f32; 3],
    status: String,
}

impl MapEditorApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let document = Document::new();
        Self {
            gl: cc.gl.clone(),
            show_left_panel: document.editor_flag("leftPanel"),
            show_right_panel: document.editor_flag("rightPanel"),
            full_view: document.editor_flag("fullView"),
            snap: document.editor_flag("snap"),
            document,
            config: AppConfig::load(),
            shared: ViewportShared::new(),
            sel_position: [0.0; 3],
            sel_rotation: [0.0; 3],
            sel_scale: [1.0; 3],
            status: "就绪".to_string(),
        }
    }

    /// 文档换了之后把编辑器状态全部对齐：开关、相机、摆放列表、模型库
    fn apply_document(&mut self, egui_ctx: &egui::Context) {
        self.show_left_panel = self.document.editor_flag("leftPanel");
        self.show_right_panel = self.document.editor_flag("rightPanel");
        self.full_view = self.document.editor_flag("fullView");
        self.snap = self.document.editor_flag("snap");

        {
            let mut state = self.shared.views.lock().unwrap();
            // 先回出厂默认，schema 没覆盖到的字段不继承上一张地图
            state.reset();
            views::load_views(&self.document.json, &mut state);
        }

        *self.shared.scene.lock().unwrap() = map::placed_entries(&self.document.json);
        if let Some(gl) = &self.gl {
            self.shared
                .library
                .lock()
                .unwrap()
                .load(gl, egui_ctx, &self.document);
        }
    }

    fn new_map(&mut self, egui_ctx: &egui::Context) {
        self.document = Document::new();
        self.apply_document(egui_ctx);
        self.status = "已新建地图".to_string();
    }

    fn open_path(&mut self, egui_ctx: &egui::Context, path: PathBuf) {
        match Document::load(path.clone()) {
            Ok(document) => {
                self.document = document;
                self.apply_document(egui_ctx);
                self.config.push_recent(&path.display().to_string());
                self.config.save();
                self.status = format!("已打开 {}", self.document.display_name());
            }
            Err(err) => {
                eprintln!("[editor] 打开失败 {}: {err}", path.display());
                let _ = rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("打开地图")
                    .set_description(format!("{}\n{err}", path.display()))
                    .show();
            }
        }
    }

    fn open_dialog(&mut self, egui_ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("地图 JSON", &["json"])
            .pick_file()
        {
            self.open_path(egui_ctx, path);
        }
    }

    fn save(&mut self) {
        let path = match self.document.filename.clone() {
            Some(path) => path,
            None => match save_dialog() {
                Some(path) => path,
                None => return,
            },
        };
        self.save_to(path);
    }

    fn save_as(&mut self) {
        if let Some(path) = save_dialog() {
            self.save_to(path);
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        match self.document.save_as(path.clone()) {
            Ok(()) => {
                self.config.push_recent(&path.display().to_string());
                self.config.save();
                self.status = format!("已保存 {}", self.document.display_name());
            }
            Err(err) => {
                eprintln!("[editor] 保存失败 {}: {err}", path.display());
                let _ = rfd::MessageDialog::new()
                    .set_level(rfd::MessageLevel::Error)
                    .set_title("保存地图")
                    .set_description(format!("{}\n{err}", path.display()))
                    .show();
            }
        }
    }

    /// 相机改动写回 `editor.views` 并置脏
    fn store_cameras(&mut self) {
        let state = self.shared.views.lock().unwrap();
        for camera in &state.cameras {
            views::store_view(&mut self.document.json, camera);
        }
        drop(state);
        self.document.dirty = true;
    }

    fn sync_editor_flags(&mut self) {
        self.document.set_editor_flag("leftPanel", self.show_left_panel);
        self.document.set_editor_flag("rightPanel", self.show_right_panel);
        self.document.set_editor_flag("fullView", self.full_view);
        self.document.set_editor_flag("snap", self.snap);
    }
}

fn save_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("地图 JSON", &["json"])
        .set_file_name("untitled.json")
        .save_file()
}

impl eframe::App for MapEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 面板开关快捷键（输入焦点在文本框时不响应）
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::B)) {
                self.show_left_panel = !self.show_left_panel;
            }
            if ctx.input(|i| i.key_pressed(egui::Key::N)) {
                self.show_right_panel = !self.show_right_panel;
            }
            if ctx.input(|i| i.key_pressed(egui::Key::F)) {
                self.full_view = !self.full_view;
            }
        }

        let flags_before = (
            self.show_left_panel,
            self.show_right_panel,
            self.full_view,
            self.snap,
        );

        let action = menu_bar::show_menu_bar(
            ctx,
            &mut self.show_left_panel,
            &mut self.show_right_panel,
            &mut self.full_view,
            &self.config.recent_maps,
        );
        tool_bar::show_tool_bar(ctx, &mut self.snap, &mut self.full_view);

        if action.new_map {
            self.new_map(ctx);
        }
        if action.open_map {
            self.open_dialog(ctx);
        }
        if let Some(path) = action.open_recent {
            self.open_path(ctx, PathBuf::from(path));
        }
        if action.save_map {
            self.save();
        }
        if action.save_map_as {
            self.save_as();
        }
        if action.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let flags_now = (
            self.show_left_panel,
            self.show_right_panel,
            self.full_view,
            self.snap,
        );
        if flags_before != flags_now {
            self.sync_editor_flags();
        }

        if self.show_left_panel {
            egui::SidePanel::left("properties_panel")
                .exact_width(PANEL_WIDTH)
                .resizable(false)
                .show(ctx, |ui| {
                    properties::show_properties(
                        ui,
                        &mut self.sel_position,
                        &mut self.sel_rotation,
                        &mut self.sel_scale,
                    );
                });
        }

        if self.show_right_panel {
            egui::SidePanel::right("right_panel")
                .exact_width(PANEL_WIDTH)
                .resizable(false)
                .show(ctx, |ui| {
                    layers_panel::show_layers(ui);
                    ui.separator();
                    let library = self.shared.library.lock().unwrap();
                    library_panel::show_library(ui, &library);
                });
        }

        egui::TopBottomPanel::bottom("status_bar")
            .min_height(24.0)
            .show(ctx, |ui| {
                let fps = ctx.input(|i| {
                    if i.stable_dt > 0.0 {
                        1.0 / i.stable_dt
                    } else {
                        0.0
                    }
                });
                status_bar::show_status_bar(
                    ui,
                    &self.document.display_name(),
                    self.document.dirty,
                    fps,
                    &self.status,
                );
            });

        // 视口：全视图只跑透视，四分按固定槽位顺序
        let mut camera_changed = false;
        if self.full_view {
            camera_changed |=
                show_view(ctx, &self.shared, ViewKind::Perspective, ViewLayout::Full, 0);
        } else {
            camera_changed |=
                show_view(ctx, &self.shared, ViewKind::Perspective, ViewLayout::Four, 0);
            camera_changed |= show_view(ctx, &self.shared, ViewKind::Top, ViewLayout::Four, 1);
            camera_changed |= show_view(ctx, &self.shared, ViewKind::Left, ViewLayout::Four, 2);
            camera_changed |= show_view(ctx, &self.shared, ViewKind::Front, ViewLayout::Four, 3);
        }
        if camera_changed {
            self.store_cameras();
        }

        // 飞行会话存续期间持续重绘，移动键积分不等新事件
        if self.shared.views.lock().unwrap().flying() {
            ctx.request_repaint();
        }

        // 记住窗口尺寸，退出时随配置落盘
        let size = ctx.screen_rect().size();
        self.config.window_width = size.x;
        self.config.window_height = size.y;
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.config.save();
        if let Some(gl) = gl {
            self.shared.grid.lock().unwrap().destroy(gl);
            self.shared.library.lock().unwrap().destroy(gl);
        }
    }
}
