//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 校验链路区分两类失败：
//! - `RejectionKind`：用户可修复的拒绝原因，最终落在 `Verdict::Rejected` 中，不是错误
//! - `DecodeError` / `LoadError`：解码能力与加载阶段的真实错误，通过 `thiserror` 保持可读
//!
//! 解码错误在校验器内部被吞并转换为 `RejectionKind::DecodeFailed`，不会逃逸到调用方。

use serde::{Deserialize, Serialize};

/// 拒绝原因分类。
///
/// 每个分支都对应一条面向用户的提示文案，调用方按分支匹配即可决定 UI 展示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionKind {
    NotAnImage,
    TooLarge,
    DecodeFailed,
    TooSmall,
    LowVegetationScore,
}

impl RejectionKind {
    /// 稳定错误码，供前端或脚本按码分支。
    pub fn code(self) -> &'static str {
        match self {
            Self::NotAnImage => "E_NOT_IMAGE",
            Self::TooLarge => "E_TOO_LARGE",
            Self::DecodeFailed => "E_DECODE",
            Self::TooSmall => "E_TOO_SMALL",
            Self::LowVegetationScore => "E_LOW_VEGETATION",
        }
    }

    /// 命中该拒绝的校验阶段。
    pub fn stage(self) -> &'static str {
        match self {
            Self::NotAnImage => "media_type",
            Self::TooLarge => "size",
            Self::DecodeFailed => "decode",
            Self::TooSmall => "dimensions",
            Self::LowVegetationScore => "vegetation",
        }
    }
}

/// 解码能力错误。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

/// 加载阶段错误（文件 / Base64）。
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("Base64 错误：{0}")]
    Base64(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

/// 校验器自身的运行错误（配置非法、锁中毒、阻塞任务异常）。
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("内部状态错误：{0}")]
    State(String),
}
