//! 应用设置模块
//!
//! # 设计思路
//!
//! 设置以 JSON 文件持久化，包含校验阈值与可选的上报配置。
//! 文件不存在时使用默认值；文件存在但内容非法时报错，而不是静默回退，
//! 避免用户以为自己调整过的阈值已经生效。
//!
//! # 实现思路
//!
//! - 路径优先读取环境变量 `CROP_DIAGNOSIS_SETTINGS`，否则使用当前目录下的 `settings.json`。
//! - 读取后统一调用 `ValidatorConfig::check` 做范围校验。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::submission::SubmissionConfig;
use crate::validator::ValidatorConfig;

pub const SETTINGS_ENV_VAR: &str = "CROP_DIAGNOSIS_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub validator: ValidatorConfig,
    pub submission: Option<SubmissionConfig>,
}

/// 设置文件路径。
pub fn settings_file_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

/// 从指定路径读取设置；文件不存在时返回默认设置。
pub fn load_settings_from_path(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::debug!("⚙️ 设置文件不存在，使用默认设置：{}", path.display());
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    settings.validator.check()?;
    Ok(settings)
}

pub fn save_settings_to_path(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    settings.validator.check()?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
