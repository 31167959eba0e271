//! # 诊断服务层
//!
//! ## 设计思路
//!
//! `DiagnosisService` 把校验器、病害目录与可选的上报客户端组装在一起，
//! 对外只暴露两条流程：
//! - `analyze_image`：加载 → 校验 → 通过后从目录选择病害
//! - `analyze_text`：症状描述 → 关键词匹配 → 选择病害
//!
//! 上报与分析解耦：分析只产出报告，是否上报由调用方决定。
//!
//! ## 实现思路
//!
//! - 随机源由调用方注入，便于测试固定结果。
//! - 图片被拒绝时返回 `AnalysisOutcome::Rejected`，不会转换为错误。

use rand::Rng;
use serde::Serialize;

use crate::diagnosis::{Catalog, DiagnosisMode, DiagnosisReport};
use crate::error::AppError;
use crate::settings::AppSettings;
use crate::submission::ResultSubmitter;
use crate::validator::{load_candidate, ImageSource, PlantImageValidator, Rejection, Verdict};

/// 图片模式的分析结果。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    Diagnosed(DiagnosisReport),
    Rejected(Rejection),
}

/// 诊断服务。
pub struct DiagnosisService {
    validator: PlantImageValidator,
    catalog: &'static Catalog,
    submitter: Option<ResultSubmitter>,
}

impl DiagnosisService {
    /// 使用设置构建服务：内置目录 + 默认解码器，配置了上报地址时创建上报客户端。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use crop_diagnosis::service::DiagnosisService;
    /// use crop_diagnosis::settings::AppSettings;
    ///
    /// let service = DiagnosisService::from_settings(&AppSettings::default())?;
    /// # Ok::<(), crop_diagnosis::error::AppError>(())
    /// ```
    pub fn from_settings(settings: &AppSettings) -> Result<Self, AppError> {
        let validator = PlantImageValidator::new(settings.validator.clone())?;
        let submitter = settings
            .submission
            .as_ref()
            .map(ResultSubmitter::new)
            .transpose()?;

        Ok(Self::new(validator, Catalog::builtin(), submitter))
    }

    pub fn new(
        validator: PlantImageValidator,
        catalog: &'static Catalog,
        submitter: Option<ResultSubmitter>,
    ) -> Self {
        Self {
            validator,
            catalog,
            submitter,
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn can_submit(&self) -> bool {
        self.submitter.is_some()
    }

    /// 图片模式：加载并校验图片，通过后生成诊断报告。
    pub async fn analyze_image<R: Rng + ?Sized>(
        &self,
        source: &ImageSource,
        crop: &str,
        rng: &mut R,
    ) -> Result<AnalysisOutcome, AppError> {
        let config = self.validator.config_snapshot()?;
        let candidate = load_candidate(source, config.max_size_mb)?;

        match self.validator.validate(candidate).await? {
            Verdict::Accepted(details) => {
                let disease = self.catalog.pick(crop, rng);
                log::info!("🩺 图片诊断完成 - crop={} disease={}", crop.trim(), disease.name);
                Ok(AnalysisOutcome::Diagnosed(DiagnosisReport::new(
                    crop,
                    DiagnosisMode::Image,
                    disease,
                    Some(details),
                )))
            }
            Verdict::Rejected(rejection) => Ok(AnalysisOutcome::Rejected(rejection)),
        }
    }

    /// 文本模式：根据症状描述生成诊断报告。
    pub fn analyze_text<R: Rng + ?Sized>(
        &self,
        crop: &str,
        description: &str,
        rng: &mut R,
    ) -> Result<DiagnosisReport, AppError> {
        let disease = self.catalog.diagnose_text(crop, description, rng)?;
        log::info!("🩺 文本诊断完成 - crop={} disease={}", crop.trim(), disease.name);
        Ok(DiagnosisReport::new(crop, DiagnosisMode::Text, disease, None))
    }

    /// 上报诊断报告；未配置上报地址时返回 `Ok(false)`。
    pub async fn submit(&self, report: &DiagnosisReport) -> Result<bool, AppError> {
        let Some(submitter) = &self.submitter else {
            log::debug!("未配置上报地址，跳过上报");
            return Ok(false);
        };

        submitter.submit(report).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::RejectionKind;
    use base64::{Engine as _, engine::general_purpose};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32, pixel: [u8; 4]) -> String {
        let img = ImageBuffer::from_pixel(width, height, Rgba(pixel));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(cursor.into_inner())
        )
    }

    fn service() -> DiagnosisService {
        DiagnosisService::from_settings(&AppSettings::default()).expect("service init failed")
    }

    #[tokio::test]
    async fn green_leaf_is_diagnosed_for_its_crop() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(3);
        let source = ImageSource::Base64(png_data_url(320, 320, [30, 160, 40, 255]));

        let outcome = service
            .analyze_image(&source, "Potato", &mut rng)
            .await
            .expect("analyze image failed");

        let AnalysisOutcome::Diagnosed(report) = outcome else {
            panic!("expected diagnosis");
        };
        assert_eq!(report.crop, "potato");
        assert_eq!(report.mode, DiagnosisMode::Image);
        assert!(service
            .catalog()
            .records("potato")
            .iter()
            .any(|r| r.name == report.disease.name));
        assert_eq!(report.image.map(|d| d.vegetation_score), Some(1.0));
    }

    #[tokio::test]
    async fn non_plant_image_is_rejected_not_errored() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(3);
        let source = ImageSource::Base64(png_data_url(320, 320, [40, 40, 200, 255]));

        let outcome = service
            .analyze_image(&source, "tomato", &mut rng)
            .await
            .expect("analyze image failed");

        assert!(matches!(
            outcome,
            AnalysisOutcome::Rejected(Rejection { kind: RejectionKind::LowVegetationScore, .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(3);
        let source = ImageSource::FilePath("/no/such/leaf.jpg".to_string());

        let result = service.analyze_image(&source, "tomato", &mut rng).await;

        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn text_mode_produces_report_without_image_details() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(11);

        let report = service
            .analyze_text("rice", "diamond shaped lesions with grey centers", &mut rng)
            .expect("analyze text failed");

        assert_eq!(report.mode, DiagnosisMode::Text);
        assert_eq!(report.disease.name, "Rice Blast");
        assert!(report.image.is_none());
    }

    #[test]
    fn text_mode_rejects_blank_description() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(11);

        let result = service.analyze_text("rice", "   ", &mut rng);

        assert!(matches!(result, Err(AppError::Diagnosis(_))));
    }

    #[tokio::test]
    async fn submit_without_endpoint_is_skipped() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(5);
        let report = service
            .analyze_text("corn", "orange pustules on leaves", &mut rng)
            .expect("analyze text failed");

        assert!(!service.can_submit());
        assert!(!service.submit(&report).await.expect("submit failed"));
    }
}
