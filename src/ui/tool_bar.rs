//! # 工具栏

use egui::{Context, TopBottomPanel};

/// 返回是否有编辑器开关被改动
pub fn show_tool_bar(ctx: &Context, snap: &mut bool, full_view: &mut bool) -> bool {
    let mut changed = false;

    TopBottomPanel::top("tool_bar")
        .exact_height(32.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                changed |= ui.checkbox(snap, "吸附").changed();
                ui.separator();
                changed |= ui.toggle_value(full_view, "全视图").changed();
            });
        });

    changed
}
