//! # 地图文档
//!
//! 文档就是一棵 JSON 树加一个脏标记：相机、面板开关、模型库和
//! 摆放列表全部读写 `json` 里对应的节点，谁改了谁负责把 `dirty`
//! 置位。保存时整棵树格式化写盘。

pub mod map;
pub mod views;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde_json::{Value, json};

use crate::viewport::ViewState;

pub const MAP_VERSION: i64 = 1;

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "文件读写失败: {error}"),
            Self::Parse(error) => write!(f, "地图解析失败: {error}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Parse(error) => Some(error),
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

pub struct Document {
    pub json: Value,
    pub dirty: bool,
    pub filename: Option<PathBuf>,
}

impl Document {
    /// 新建地图：完整模板，所有编辑器字段带显式默认值
    pub fn new() -> Self {
        Self {
            json: template(),
            dirty: false,
            filename: None,
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(&path)?;
        let json: Value = serde_json::from_str(&content)?;
        Ok(Self {
            json,
            dirty: false,
            filename: Some(path),
        })
    }

    /// 写盘并记住路径，成功后清除脏标记
    pub fn save_as(&mut self, path: PathBuf) -> Result<(), DocumentError> {
        let content = serde_json::to_string_pretty(&self.json)?;
        std::fs::write(&path, content)?;
        self.filename = Some(path);
        self.dirty = false;
        Ok(())
    }

    pub fn editor_flag(&self, key: &str) -> bool {
        self.json["editor"][key].as_bool().unwrap_or(false)
    }

    pub fn set_editor_flag(&mut self, key: &str, value: bool) {
        if self.editor_flag(key) != value {
            self.json["editor"][key] = Value::Bool(value);
            self.dirty = true;
        }
    }

    /// 标题栏/状态栏显示用的名字
    pub fn display_name(&self) -> String {
        match &self.filename {
            Some(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            None => "未命名".to_string(),
        }
    }
}

fn template() -> Value {
    json!({
        "version": MAP_VERSION,
        "editor": {
            "fullView": false,
            "leftPanel": true,
            "rightPanel": true,
            "snap": false,
            "views": views::views_json(&ViewState::new()),
        },
        "library": [],
        "map": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_carries_explicit_view_defaults() {
        let document = Document::new();
        assert!(!document.dirty);
        assert_eq!(document.json["version"], json!(MAP_VERSION));
        assert_eq!(document.json["editor"]["leftPanel"], json!(true));
        assert_eq!(
            document.json["editor"]["views"]["top"]["zoom"],
            json!(18)
        );
        assert_eq!(
            document.json["editor"]["views"]["perspective"]["angleZ"],
            json!(45.0)
        );
        assert_eq!(document.display_name(), "未命名");
    }

    #[test]
    fn flag_write_marks_dirty_once() {
        let mut document = Document::new();
        document.set_editor_flag("snap", false);
        assert!(!document.dirty);
        document.set_editor_flag("snap", true);
        assert!(document.dirty);
        assert!(document.editor_flag("snap"));
    }
}
