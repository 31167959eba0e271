//! # 模拟诊断模块（diagnosis）
//!
//! ## 设计思路
//!
//! 诊断结果来自静态目录而非模型推理：
//! - `catalog`：作物 → 病害记录表、均匀随机选择、未知作物兜底
//! - `symptoms`：文本模式的症状关键词匹配
//! - `DiagnosisReport`：对外输出的诊断报告（图片 / 文本两种模式共用）

mod catalog;
mod symptoms;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::validator::ImageDetails;

pub use catalog::{Catalog, DiseaseRecord, FALLBACK_RECORD, Severity};
pub use symptoms::MIN_DESCRIPTION_CHARS;

/// 诊断阶段错误。
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("症状描述过短：{actual} 个字符（至少 {min} 个）")]
    DescriptionTooShort { actual: usize, min: usize },
}

/// 诊断来源模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisMode {
    Image,
    Text,
}

impl DiagnosisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// 诊断报告。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReport {
    pub crop: String,
    pub mode: DiagnosisMode,
    pub disease: &'static DiseaseRecord,
    /// 图片模式下的校验详情。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageDetails>,
    /// RFC 3339 时间戳（UTC）。
    pub created_at: String,
}

impl DiagnosisReport {
    pub(crate) fn new(
        crop: &str,
        mode: DiagnosisMode,
        disease: &'static DiseaseRecord,
        image: Option<ImageDetails>,
    ) -> Self {
        Self {
            crop: crop.trim().to_ascii_lowercase(),
            mode,
            disease,
            image,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
