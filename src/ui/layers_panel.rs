//! # 图层面板

use egui::Ui;

pub fn show_layers(ui: &mut Ui) {
    ui.heading("图层");
    ui.separator();
    ui.weak("图层编辑尚未开放");
}
