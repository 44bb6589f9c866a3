//! # 应用路径管理
//!
//! 编辑器自己的数据只有一个 `config.json`，放在
//! `$XDG_DATA_HOME/lme/`（默认 `~/.local/share/lme/`）。目录在
//! 首次取用时创建。

use std::path::PathBuf;
use std::sync::OnceLock;

/// 全局单例：应用数据根目录
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 应用数据根目录，首次调用时创建
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        let dir = resolve_data_dir();
        let _ = std::fs::create_dir_all(&dir);
        dir
    })
}

/// config.json 的完整路径
pub fn config_json_path() -> PathBuf {
    data_dir().join("config.json")
}

/// $XDG_DATA_HOME/lme，缺省回退 ~/.local/share/lme，连 $HOME 都
/// 没有时落到当前目录
fn resolve_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("lme");
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("lme"),
        Err(_) => PathBuf::from("."),
    }
}
