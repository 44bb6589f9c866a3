//! # 菜单栏
//!
//! 文件/编辑/视图三个菜单。编辑菜单目前全是占位（撤销重做等编辑
//! 操作还没做）。动作通过返回值带回 app，开关直接改传入的引用。

use egui::{Button, Context, TopBottomPanel};

// ── 返回给 app 的动作 ───────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MenuAction {
    pub new_map: bool,
    pub open_map: bool,
    pub open_recent: Option<String>,
    pub save_map: bool,
    pub save_map_as: bool,
    pub quit: bool,
}

pub fn show_menu_bar(
    ctx: &Context,
    left_panel: &mut bool,
    right_panel: &mut bool,
    full_view: &mut bool,
    recent_maps: &[String],
) -> MenuAction {
    let mut action = MenuAction::default();

    TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("文件", |ui| {
                if ui.button("新建").clicked() {
                    action.new_map = true;
                    ui.close_menu();
                }
                if ui.button("打开…").clicked() {
                    action.open_map = true;
                    ui.close_menu();
                }
                ui.menu_button("最近打开", |ui| {
                    if recent_maps.is_empty() {
                        ui.add_enabled(false, Button::new("（空）"));
                    }
                    for path in recent_maps {
                        if ui.button(path).clicked() {
                            action.open_recent = Some(path.clone());
                            ui.close_menu();
                        }
                    }
                });
                ui.separator();
                if ui.button("保存").clicked() {
                    action.save_map = true;
                    ui.close_menu();
                }
                if ui.button("另存为…").clicked() {
                    action.save_map_as = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("退出    Alt+F4").clicked() {
                    action.quit = true;
                    ui.close_menu();
                }
            });

            ui.menu_button("编辑", |ui| {
                if ui.button("撤销    Ctrl+Z").clicked() {
                    ui.close_menu();
                }
                ui.add_enabled(false, Button::new("重做    Ctrl+Y"));
                ui.separator();
                if ui.button("剪切    Ctrl+X").clicked() {
                    ui.close_menu();
                }
                if ui.button("复制    Ctrl+C").clicked() {
                    ui.close_menu();
                }
                if ui.button("粘贴    Ctrl+V").clicked() {
                    ui.close_menu();
                }
            });

            ui.menu_button("视图", |ui| {
                if ui.checkbox(left_panel, "左侧面板 (B)").clicked() {
                    ui.close_menu();
                }
                if ui.checkbox(right_panel, "右侧面板 (N)").clicked() {
                    ui.close_menu();
                }
                ui.separator();
                if ui.checkbox(full_view, "全视图 (F)").clicked() {
                    ui.close_menu();
                }
            });
        });
    });

    action
}
