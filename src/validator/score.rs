//! # 植被评分模块
//!
//! 在降采样后的 RGBA 缓冲上按固定步长抽样约 `target_sample_count` 个像素，
//! 统计“绿色占优”像素在非透明像素中的比例，作为“是否为植物照片”的粗略代理。

use super::source::Raster;
use super::ValidatorConfig;

/// 单次评分的统计结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VegetationSample {
    /// 参与统计的非透明像素数。
    pub counted: usize,
    /// 其中绿色占优的像素数。
    pub green: usize,
}

impl VegetationSample {
    /// 评分，取值 `[0, 1]`；没有可统计像素时为 0。
    pub fn score(&self) -> f64 {
        if self.counted == 0 {
            return 0.0;
        }
        self.green as f64 / self.counted as f64
    }
}

/// 抽样统计绿色占优像素。
pub fn sample_vegetation(raster: &Raster, config: &ValidatorConfig) -> VegetationSample {
    let total_pixels = raster.sample_pixels();
    let stride = (total_pixels / config.target_sample_count.max(1) as usize).max(1);

    let mut sample = VegetationSample { counted: 0, green: 0 };

    for pixel in raster.rgba.chunks_exact(4).step_by(stride) {
        let (r, g, b, a) = (pixel[0], pixel[1], pixel[2], pixel[3]);
        if a < config.alpha_floor {
            continue;
        }

        sample.counted += 1;
        if is_green_dominant(r, g, b, config) {
            sample.green += 1;
        }
    }

    sample
}

/// 计算植被评分。
pub fn vegetation_score(raster: &Raster, config: &ValidatorConfig) -> f64 {
    sample_vegetation(raster, config).score()
}

// g > r * margin && g > b * margin && g > floor
fn is_green_dominant(r: u8, g: u8, b: u8, config: &ValidatorConfig) -> bool {
    let g = g as f64;
    g > r as f64 * config.green_margin
        && g > b as f64 * config.green_margin
        && g > config.green_floor as f64
}
