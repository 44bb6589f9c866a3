//! # 摆放列表
//!
//! `map` 数组的只读解析：透视视口每帧按这份列表画场景。
//! 列表在文档打开/改动时重建一次，绘制回调拿到的是解析结果，
//! 不在热路径上碰 JSON。

use serde_json::Value;

/// 场景里摆放的一个模型实例
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEntry {
    pub model_id: u64,
    pub position: [f32; 3],
}

pub fn placed_entries(json: &Value) -> Vec<PlacedEntry> {
    let Some(entries) = json["map"].as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let position = &entry["position"];
            PlacedEntry {
                model_id: entry["modelId"].as_u64().unwrap_or(0),
                position: [
                    position["x"].as_f64().unwrap_or(0.0) as f32,
                    position["y"].as_f64().unwrap_or(0.0) as f32,
                    position["z"].as_f64().unwrap_or(0.0) as f32,
                ],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_entries_and_tolerates_gaps() {
        let json = json!({
            "map": [
                { "modelId": 7, "position": { "x": 1.0, "y": 2.0, "z": 3.0 } },
                { "position": { "x": -1.5 } },
            ]
        });
        let entries = placed_entries(&json);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            PlacedEntry {
                model_id: 7,
                position: [1.0, 2.0, 3.0]
            }
        );
        assert_eq!(entries[1].model_id, 0);
        assert_eq!(entries[1].position, [-1.5, 0.0, 0.0]);
    }

    #[test]
    fn missing_map_yields_empty_list() {
        assert!(placed_entries(&json!({})).is_empty());
    }
}
