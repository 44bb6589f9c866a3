//! # 编辑器配置（AppConfig）
//!
//! 最近打开的地图列表 + 上次的窗口尺寸，持久化到
//! `~/.local/share/lme/config.json`。读不到就用默认值，写失败
//! 静默忽略——配置丢了顶多重选一次窗口大小。

use serde::{Deserialize, Serialize};

use super::paths;

/// 最近列表最多保留的条数
pub const MAX_RECENT_MAPS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 最近打开的地图，最新的在最前
    pub recent_maps: Vec<String>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recent_maps: Vec::new(),
            window_width: 1400.0,
            window_height: 860.0,
        }
    }
}

impl AppConfig {
    /// 从 config.json 加载，文件不存在 / 解析失败返回默认值。
    pub fn load() -> Self {
        let path = paths::config_json_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// 写入 config.json（格式化）。
    pub fn save(&self) {
        if let Ok(content) = serde_json::to_string_pretty(self) {
            let _ = std::fs::write(paths::config_json_path(), content);
        }
    }

    /// 记一条最近打开：去重置顶，超出上限截断。
    pub fn push_recent(&mut self, path: &str) {
        self.recent_maps.retain(|existing| existing != path);
        self.recent_maps.insert(0, path.to_string());
        self.recent_maps.truncate(MAX_RECENT_MAPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_recent_dedupes_and_truncates() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.push_recent(&format!("/maps/{i}.json"));
        }
        assert_eq!(config.recent_maps.len(), MAX_RECENT_MAPS);
        assert_eq!(config.recent_maps[0], "/maps/11.json");

        // 重复路径被置顶而不是追加
        config.push_recent("/maps/5.json");
        assert_eq!(config.recent_maps[0], "/maps/5.json");
        assert_eq!(config.recent_maps.len(), MAX_RECENT_MAPS);
        let count = config
            .recent_maps
            .iter()
            .filter(|p| p.as_str() == "/maps/5.json")
            .count();
        assert_eq!(count, 1);
    }
}
