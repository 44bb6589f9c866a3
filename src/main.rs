mod document;
mod library;
mod rendering;
mod storage;
mod ui;
mod viewport;

use storage::app_config::AppConfig;
use ui::app::MapEditorApp;

fn main() {
    let config = AppConfig::load();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Lian Map Editor")
            .with_inner_size([config.window_width, config.window_height])
            .with_app_id("lian-map-editor"),
        // 透视视口要用深度测试，egui 默认不带深度缓冲
        depth_buffer: 24,
        ..Default::default()
    };

    eframe::run_native(
        "Lian Map Editor",
        options,
        Box::new(|cc| Box::new(MapEditorApp::new(cc))),
    )
    .expect("窗口启动失败");
}
