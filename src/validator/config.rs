//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调阈值”集中到 `ValidatorConfig`，保证运行时行为可观测、可调整、可测试。
//! 植被评分中的相对裕度与绝对下限属于经验常数，同样作为配置暴露，默认值保持不变。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产默认值。
//! - 字段使用 camelCase 序列化，与设置文件及前端字段名一致。
//! - `check` 负责范围校验，拒绝会让校验器失去意义的组合。

use serde::{Deserialize, Serialize};

use super::ValidatorError;

/// 图片合理性校验配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// 允许的最大文件体积（MB）。
    #[serde(rename = "maxSizeMB")]
    pub max_size_mb: f64,
    /// 宽、高的最小像素值。
    pub min_dimension_px: u32,
    /// 植被评分下限。
    pub min_vegetation_score: f64,
    /// 采样缓冲长边上限。
    pub max_sample_side: u32,
    /// 目标采样像素数量（决定步长）。
    pub target_sample_count: u32,
    /// 绿色通道相对红/蓝通道的裕度倍数。
    pub green_margin: f64,
    /// 绿色通道绝对下限（0~255），排除近黑噪点。
    pub green_floor: u8,
    /// 透明度下限（0~255），低于该值的像素不计入。
    pub alpha_floor: u8,
    /// 可选的像素上限（`width * height`），用于防御解压炸弹；默认不限制。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_decoded_pixels: Option<u64>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 10.0,
            min_dimension_px: 256,
            min_vegetation_score: 0.08,
            max_sample_side: 512,
            target_sample_count: 10_000,
            green_margin: 1.1,
            green_floor: 60,
            alpha_floor: 50,
            max_decoded_pixels: None,
        }
    }
}

impl ValidatorConfig {
    /// 校验配置取值范围。
    pub fn check(&self) -> Result<(), ValidatorError> {
        if !self.max_size_mb.is_finite() || self.max_size_mb <= 0.0 {
            return Err(ValidatorError::InvalidConfig(
                "maxSizeMB 必须为正数".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_vegetation_score) {
            return Err(ValidatorError::InvalidConfig(
                "minVegetationScore 必须在 0~1 之间".to_string(),
            ));
        }
        if self.max_sample_side == 0 {
            return Err(ValidatorError::InvalidConfig(
                "maxSampleSide 不能为 0".to_string(),
            ));
        }
        if self.target_sample_count == 0 {
            return Err(ValidatorError::InvalidConfig(
                "targetSampleCount 不能为 0".to_string(),
            ));
        }
        if !self.green_margin.is_finite() || self.green_margin < 1.0 {
            return Err(ValidatorError::InvalidConfig(
                "greenMargin 不能小于 1.0".to_string(),
            ));
        }
        if self.max_decoded_pixels == Some(0) {
            return Err(ValidatorError::InvalidConfig(
                "maxDecodedPixels 不能为 0".to_string(),
            ));
        }

        Ok(())
    }

    /// 体积上限的展示文案：`10.0` 输出为 `10`，`2.5` 保持 `2.5`。
    pub(crate) fn max_size_label(&self) -> String {
        format!("{}", self.max_size_mb)
    }
}
