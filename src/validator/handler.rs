//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `PlantImageValidator` 只负责流程编排与配置管理，不绑定具体解码库。
//! 校验链路固定为（首个失败即短路）：
//! 1. 媒体类型
//! 2. 文件体积
//! 3. 解码（唯一的挂起点，在阻塞线程池执行）
//! 4. 像素尺寸
//! 5. 植被评分
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ValidatorConfig>>` 支持运行时替换。
//! - 单次校验内使用“同一配置快照”，避免处理中途配置漂移。
//! - 所有拒绝都转换为 `Verdict::Rejected`，解码错误同样不会逃逸给调用方。
//! - 记录 `decode/score/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::decoder::{DecodeOptions, ImageCrateDecoder, RasterDecoder};
use super::score::vegetation_score;
use super::source::{CandidateImage, Raster};
use super::verdict::{
    round_size_mb, ImageDetails, Rejection, Verdict, REASON_DECODE_FAILED, REASON_LOW_VEGETATION,
    REASON_NOT_AN_IMAGE,
};
use super::{DecodeError, RejectionKind, ValidatorConfig, ValidatorError};

const IMAGE_MEDIA_TYPE_PREFIX: &str = "image/";

/// 图片合理性校验器。
pub struct PlantImageValidator {
    config: Arc<RwLock<ValidatorConfig>>,
    decoder: Arc<dyn RasterDecoder>,
}

impl PlantImageValidator {
    /// 使用默认解码器创建校验器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use crop_diagnosis::validator::{PlantImageValidator, ValidatorConfig};
    ///
    /// let validator = PlantImageValidator::new(ValidatorConfig::default())?;
    /// # Ok::<(), crop_diagnosis::validator::ValidatorError>(())
    /// ```
    pub fn new(config: ValidatorConfig) -> Result<Self, ValidatorError> {
        Self::with_decoder(config, Arc::new(ImageCrateDecoder::default()))
    }

    /// 注入自定义解码能力（测试或其他平台解码库）。
    pub fn with_decoder(
        config: ValidatorConfig,
        decoder: Arc<dyn RasterDecoder>,
    ) -> Result<Self, ValidatorError> {
        config.check()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            decoder,
        })
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<ValidatorConfig, ValidatorError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ValidatorError::State("配置读取锁已中毒".to_string()))
    }

    /// 整体替换配置，非法配置会被拒绝且保持原值。
    pub fn set_config(&self, config: ValidatorConfig) -> Result<(), ValidatorError> {
        config.check()?;

        let mut guard = self
            .config
            .write()
            .map_err(|_| ValidatorError::State("配置写入锁已中毒".to_string()))?;

        log::info!(
            "⚙️ 已更新校验配置：maxSizeMB={} minDimensionPx={} minVegetationScore={}",
            config.max_size_mb,
            config.min_dimension_px,
            config.min_vegetation_score
        );
        *guard = config;

        Ok(())
    }

    /// 校验主入口。
    ///
    /// 只有内部状态异常（锁中毒、阻塞任务崩溃）才返回 `Err`；所有用户可修复的问题
    /// 都体现在 `Verdict::Rejected` 中。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use crop_diagnosis::validator::{CandidateImage, PlantImageValidator, ValidatorConfig};
    ///
    /// # async fn demo() -> Result<(), crop_diagnosis::validator::ValidatorError> {
    /// let validator = PlantImageValidator::new(ValidatorConfig::default())?;
    /// let bytes = std::fs::read("leaf.png").unwrap_or_default();
    /// let verdict = validator.validate(CandidateImage::new(bytes, "image/png")).await?;
    /// println!("{:?}", verdict.reason());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn validate(&self, candidate: CandidateImage) -> Result<Verdict, ValidatorError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        if let Some(rejection) = Self::check_declared(&candidate, &config) {
            log::info!(
                "🚫 图片被拒绝 - stage={} code={}",
                rejection.kind.stage(),
                rejection.kind.code()
            );
            return Ok(Verdict::Rejected(rejection));
        }

        let decode_start = Instant::now();
        let raster = match self.decode_blocking(&candidate, &config).await? {
            Ok(raster) => raster,
            Err(err) => {
                log::warn!("⚠️ 图片解码失败，按无法读取处理：{}", err);
                return Ok(Verdict::Rejected(Rejection::new(
                    RejectionKind::DecodeFailed,
                    REASON_DECODE_FAILED,
                )));
            }
        };
        let decode_elapsed = decode_start.elapsed();

        let score_start = Instant::now();
        let verdict = Self::judge_raster(&candidate, &raster, &config);
        let score_elapsed = score_start.elapsed();

        log::info!(
            "✅ 图片校验完成 - accepted={} decode={}ms score={}ms total={}ms",
            verdict.is_accepted(),
            decode_elapsed.as_millis(),
            score_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(verdict)
    }

    /// 解码前的声明信息校验：媒体类型、体积。
    fn check_declared(candidate: &CandidateImage, config: &ValidatorConfig) -> Option<Rejection> {
        if !candidate.media_type.starts_with(IMAGE_MEDIA_TYPE_PREFIX) {
            return Some(Rejection::new(RejectionKind::NotAnImage, REASON_NOT_AN_IMAGE));
        }

        let size_mb = candidate.size_mb();
        if size_mb > config.max_size_mb {
            return Some(Rejection::new(
                RejectionKind::TooLarge,
                format!(
                    "Image is too large ({:.1} MB). Max {} MB.",
                    size_mb,
                    config.max_size_label()
                ),
            ));
        }

        None
    }

    /// 在阻塞线程池中执行解码，避免阻塞 async 运行时。
    ///
    /// 外层 `Result` 表示任务本身是否正常结束，内层为解码结果。
    async fn decode_blocking(
        &self,
        candidate: &CandidateImage,
        config: &ValidatorConfig,
    ) -> Result<Result<Raster, DecodeError>, ValidatorError> {
        let decoder = Arc::clone(&self.decoder);
        let bytes = candidate.bytes.clone();
        let options = DecodeOptions {
            max_sample_side: config.max_sample_side,
            max_decoded_pixels: config.max_decoded_pixels,
        };

        tokio::task::spawn_blocking(move || decoder.decode(&bytes, options))
            .await
            .map_err(|e| ValidatorError::State(format!("解码任务异常结束：{}", e)))
    }

    /// 解码后的校验：像素尺寸、植被评分。
    fn judge_raster(candidate: &CandidateImage, raster: &Raster, config: &ValidatorConfig) -> Verdict {
        let min = config.min_dimension_px;
        if raster.width < min || raster.height < min {
            return Verdict::Rejected(Rejection::new(
                RejectionKind::TooSmall,
                format!(
                    "Image is too small ({}x{}). Minimum {}x{}.",
                    raster.width, raster.height, min, min
                ),
            ));
        }

        let score = vegetation_score(raster, config);
        let details = ImageDetails {
            width: raster.width,
            height: raster.height,
            size_mb: round_size_mb(candidate.size_mb()),
            media_type: candidate.media_type.clone(),
            vegetation_score: score,
        };

        if score < config.min_vegetation_score {
            log::info!(
                "🍂 植被评分不足 - score={:.3} threshold={}",
                score,
                config.min_vegetation_score
            );
            return Verdict::Rejected(
                Rejection::new(RejectionKind::LowVegetationScore, REASON_LOW_VEGETATION)
                    .with_details(details),
            );
        }

        Verdict::Accepted(details)
    }
}
