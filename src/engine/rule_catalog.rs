// ==========================================
// 柜内接线导入系统 - 规则目录持久化
// ==========================================
// 文件格式 (JSON):
//   {"rules": [{"terminal_a": "A1", "terminal_b": "A2",
//               "classification": "coil_connection",
//               "description": "coil connection"}, ...]}
// 兼容旧版: {"rules": [["A1", "A2"], ...]}，分类由 classify_pair 补全
// ==========================================

use crate::domain::{RuleCatalog, RuleTemplate};
use crate::engine::error::{RuleCatalogError, RuleCatalogResult};
use crate::engine::pair_classifier::classify_pair;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Template(RuleTemplate),
    Pair([String; 2]),
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

impl RuleEntry {
    fn into_template(self) -> RuleTemplate {
        match self {
            RuleEntry::Template(t) => t,
            RuleEntry::Pair([a, b]) => {
                let (kind, description) = classify_pair(&a, &b);
                RuleTemplate::new(&a, &b, kind, &description)
            }
        }
    }
}

impl RuleCatalog {
    /// 从 JSON 文本解析规则目录
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: RuleFile = serde_json::from_str(text)?;
        let rules = file.rules.into_iter().map(RuleEntry::into_template).collect();
        Ok(RuleCatalog::new(rules))
    }

    /// 读取规则目录文件
    ///
    /// # 返回
    /// - Err(Missing): 文件不存在（调用方应走自举流程）
    /// - Err(Parse): 文件存在但格式错误
    pub fn load<P: AsRef<Path>>(path: P) -> RuleCatalogResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        if !path.exists() {
            return Err(RuleCatalogError::Missing(shown));
        }

        let text = fs::read_to_string(path).map_err(|e| RuleCatalogError::Io {
            path: shown.clone(),
            message: e.to_string(),
        })?;

        let catalog = Self::from_json(&text).map_err(|e| RuleCatalogError::Parse {
            path: shown.clone(),
            message: e.to_string(),
        })?;

        if catalog.is_empty() {
            warn!(path = %shown, "规则目录为空，本次不会推断任何内部连接");
        }
        info!(path = %shown, rule_count = catalog.len(), "规则目录已加载");
        Ok(catalog)
    }

    /// 写出规则目录文件（带缩进，便于人工审阅）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RuleCatalogResult<()> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let io_err = |e: std::io::Error| RuleCatalogError::Io {
            path: shown.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let text = serde_json::to_string_pretty(self).map_err(|e| RuleCatalogError::Parse {
            path: shown.clone(),
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(io_err)?;

        info!(path = %shown, rule_count = self.len(), "规则目录已保存");
        Ok(())
    }
}
