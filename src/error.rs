//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 注意：图片被“拒绝”不是错误，而是 `Verdict::Rejected`；
//! 只有加载失败、配置非法、上报失败等真正的运行错误才走 `AppError`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为各子模块错误提供 `From` 转换，调用侧直接 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，便于 CLI 以 JSON 输出。

use serde::Serialize;

use crate::diagnosis::DiagnosisError;
use crate::submission::SubmitError;
use crate::validator::{LoadError, ValidatorError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片加载失败（文件 / Base64）
    #[error("{0}")]
    Load(#[from] LoadError),

    /// 校验器配置或内部状态错误
    #[error("{0}")]
    Validator(#[from] ValidatorError),

    /// 诊断输入错误
    #[error("{0}")]
    Diagnosis(#[from] DiagnosisError),

    /// 结果上报失败
    #[error("{0}")]
    Submit(#[from] SubmitError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用
    #[error("设置错误: {0}")]
    Settings(String),
}

impl AppError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Load(_) => "E_LOAD",
            Self::Validator(_) => "E_VALIDATOR",
            Self::Diagnosis(_) => "E_DIAGNOSIS",
            Self::Submit(_) => "E_SUBMIT",
            Self::Io(_) => "E_IO",
            Self::Settings(_) => "E_SETTINGS",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
