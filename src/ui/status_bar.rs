use egui::Ui;

pub fn show_status_bar(ui: &mut Ui, document_name: &str, dirty: bool, fps: f32, message: &str) {
    ui.horizontal_wrapped(|ui| {
        let marker = if dirty { " *" } else { "" };
        ui.label(format!("地图: {document_name}{marker}"));
        ui.separator();
        ui.label(format!("FPS: {:.0}", fps));
        ui.separator();
        ui.label(format!("状态: {message}"));
    });
}
