//! # 图片合理性校验模块（validator）
//!
//! ## 设计思路
//!
//! 该模块把“来源加载 → 声明信息校验 → 解码降采样 → 植被评分 → 结论”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `loader`：负责文件 / Base64 加载与声明媒体类型推断
//! - `handler`：编排整条校验链路（短路 + 阶段耗时日志）
//! - `decoder`：解码能力接口与基于 `image` 的默认实现
//! - `score`：植被评分
//! - `verdict`：结论模型与面向用户的文案
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 调用方（CLI / DiagnosisService）
//!    ↓
//! loader.rs（ImageSource → CandidateImage）
//!    ↓
//! handler.rs（PlantImageValidator::validate）
//!    ├─ 媒体类型 / 体积（解码前短路）
//!    ├─ decoder.rs（spawn_blocking 解码 + 降采样）
//!    ├─ 像素尺寸
//!    └─ score.rs（植被评分）
//!    ↓
//! Verdict::Accepted / Verdict::Rejected
//! ```

mod config;
mod decoder;
mod error;
mod handler;
mod loader;
mod score;
mod source;
mod verdict;

pub use config::ValidatorConfig;
pub use decoder::{DecodeOptions, ImageCrateDecoder, RasterDecoder};
pub use error::{DecodeError, LoadError, RejectionKind, ValidatorError};
pub use handler::PlantImageValidator;
pub use loader::{load_candidate, load_from_base64, load_from_file};
pub use score::{sample_vegetation, vegetation_score, VegetationSample};
pub use source::{CandidateImage, ImageSource, Raster};
pub use verdict::{
    ImageDetails, Rejection, Verdict, REASON_DECODE_FAILED, REASON_LOW_VEGETATION,
    REASON_NOT_AN_IMAGE,
};
