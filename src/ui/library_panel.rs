//! # 模型库面板
//!
//! 三列缩略图 + 名称。缩略图在文档打开时由模型库解码好，这里只
//! 负责摆出来。

use egui::{ScrollArea, Ui, load::SizedTexture, vec2};

use crate::library::Library;

const THUMBNAIL_SIZE: f32 = 64.0;
const COLUMNS: usize = 3;

pub fn show_library(ui: &mut Ui, library: &Library) {
    ui.heading("模型库");
    ui.separator();

    if library.thumbnails().is_empty() {
        ui.weak("地图没有引用任何模型");
        return;
    }

    ScrollArea::vertical().show(ui, |ui| {
        for row in library.thumbnails().chunks(COLUMNS) {
            ui.horizontal(|ui| {
                for thumbnail in row {
                    ui.vertical(|ui| {
                        ui.add(egui::Image::new(SizedTexture::new(
                            thumbnail.texture.id(),
                            vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE),
                        )));
                        ui.label(&thumbnail.name);
                    });
                }
            });
        }
    });
}
