//! # 属性面板
//!
//! 选中对象的变换编辑。选择和移动工具还没接上，这里先按住一组
//! 独立数值，面板布局和拖拽手感保持最终形态。

use egui::{DragValue, Ui};

pub fn show_properties(
    ui: &mut Ui,
    position: &mut [f32; 3],
    rotation: &mut [f32; 3],
    scale: &mut [f32; 3],
) {
    ui.heading("属性");
    ui.separator();

    drag_row(ui, "位置", position, 0.1);
    drag_row(ui, "旋转", rotation, 1.0);
    drag_row(ui, "缩放", scale, 0.01);

    ui.separator();
    ui.label("自定义");
}

fn drag_row(ui: &mut Ui, label: &str, values: &mut [f32; 3], speed: f64) {
    ui.label(label);
    ui.horizontal(|ui| {
        for value in values.iter_mut() {
            ui.add(DragValue::new(value).speed(speed));
        }
    });
}
