//! # 相机设置持久化
//!
//! 相机记录 ⇄ `editor.views.{perspective,top,left,front}`。
//! 透视视口存位置 + 两个角度，正交视口存 x/y + 缩放档位。
//! 读取对缺失字段一律按 0 处理（手写或旧版地图不崩溃），缩放
//! 档位读进来时钳回表范围。

use serde_json::{Value, json};

use crate::viewport::{ViewCamera, ViewKind, ViewState, ZOOM_LEVELS};

/// 从文档读入全部 4 条相机记录
pub fn load_views(json: &Value, views: &mut ViewState) {
    for camera in views.cameras.iter_mut() {
        let node = &json["editor"]["views"][camera.kind.settings_key()];
        let position = &node["position"];
        camera.position[0] = position["x"].as_f64().unwrap_or(0.0) as f32;
        camera.position[1] = position["y"].as_f64().unwrap_or(0.0) as f32;

        match camera.kind {
            ViewKind::Perspective => {
                camera.position[2] = position["z"].as_f64().unwrap_or(0.0) as f32;
                camera.angle_x = (node["angleX"].as_f64().unwrap_or(0.0) as f32).clamp(-89.0, 89.0);
                camera.angle_z = (node["angleZ"].as_f64().unwrap_or(0.0) as f32).rem_euclid(360.0);
            }
            _ => {
                camera.zoom_level = node["zoom"]
                    .as_i64()
                    .unwrap_or(0)
                    .clamp(0, ZOOM_LEVELS.len() as i64 - 1)
                    as i32;
            }
        }
    }
}

/// 把一条相机记录写回文档对应的视图节点
pub fn store_view(json: &mut Value, camera: &ViewCamera) {
    json["editor"]["views"][camera.kind.settings_key()] = view_json(camera);
}

/// 全部 4 条记录的 `views` 对象（新建模板用）
pub fn views_json(views: &ViewState) -> Value {
    let mut out = json!({});
    for camera in &views.cameras {
        out[camera.kind.settings_key()] = view_json(camera);
    }
    out
}

fn view_json(camera: &ViewCamera) -> Value {
    match camera.kind {
        ViewKind::Perspective => json!({
            "position": {
                "x": camera.position[0],
                "y": camera.position[1],
                "z": camera.position[2],
            },
            "angleX": camera.angle_x,
            "angleZ": camera.angle_z,
        }),
        _ => json!({
            "position": {
                "x": camera.position[0],
                "y": camera.position[1],
            },
            "zoom": camera.zoom_level,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_round_trips_all_views() {
        let mut source = ViewState::new();
        source.cameras[0].position = [3.5, -1.25, 7.0];
        source.cameras[0].angle_x = -42.5;
        source.cameras[0].angle_z = 123.75;
        source.cameras[1].position[0] = 10.0;
        source.cameras[1].position[1] = -4.5;
        source.cameras[1].zoom_level = 3;
        source.cameras[2].zoom_level = 24;
        source.cameras[3].position = [0.25, 0.5, 0.0];
        source.cameras[3].zoom_level = 0;

        let mut json = json!({});
        for camera in &source.cameras {
            store_view(&mut json, camera);
        }

        let mut loaded = ViewState::new();
        load_views(&json, &mut loaded);

        for (a, b) in source.cameras.iter().zip(loaded.cameras.iter()) {
            assert_eq!(a.position[0], b.position[0]);
            assert_eq!(a.position[1], b.position[1]);
            match a.kind {
                ViewKind::Perspective => {
                    assert_eq!(a.position[2], b.position[2]);
                    assert_eq!(a.angle_x, b.angle_x);
                    assert_eq!(a.angle_z, b.angle_z);
                }
                _ => assert_eq!(a.zoom_level, b.zoom_level),
            }
        }
    }

    #[test]
    fn missing_fields_default_to_zero() {
        // 空文档：位置/角度/缩放全部归零，不崩溃
        let mut views = ViewState::new();
        load_views(&json!({}), &mut views);
        for camera in &views.cameras {
            assert_eq!(camera.position[0], 0.0);
            assert_eq!(camera.position[1], 0.0);
        }
        assert_eq!(views.cameras[0].angle_x, 0.0);
        assert_eq!(views.cameras[0].angle_z, 0.0);
        assert_eq!(views.cameras[1].zoom_level, 0);
    }

    #[test]
    fn out_of_range_values_are_normalized_on_load() {
        let json = json!({
            "editor": { "views": {
                "perspective": { "position": { "x": 1.0 }, "angleX": -260.0, "angleZ": -90.0 },
                "top": { "zoom": 99 },
            }}
        });
        let mut views = ViewState::new();
        load_views(&json, &mut views);
        assert_eq!(views.cameras[0].angle_x, -89.0);
        assert_eq!(views.cameras[0].angle_z, 270.0);
        assert_eq!(views.cameras[1].zoom_level, 24);
    }
}
