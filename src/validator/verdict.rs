//! # 校验结论模型
//!
//! `Verdict` 只有两种形态：`Accepted` 携带图片详情，`Rejected` 携带面向用户的原因，
//! 在植被评分不足时额外附带详情用于诊断展示。序列化字段与前端约定保持 camelCase。

use serde::{Deserialize, Serialize};

use super::RejectionKind;

pub const REASON_NOT_AN_IMAGE: &str = "File is not an image.";
pub const REASON_DECODE_FAILED: &str = "Could not read the image. Try another file.";
pub const REASON_LOW_VEGETATION: &str =
    "Wrong image: looks unlike a crop/leaf. Please upload a clear leaf/plant photo.";

/// 图片详情。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "sizeMB")]
    pub size_mb: f64,
    pub media_type: String,
    pub vegetation_score: f64,
}

/// 拒绝结论。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub kind: RejectionKind,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ImageDetails>,
}

impl Rejection {
    pub(crate) fn new(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            details: None,
        }
    }

    pub(crate) fn with_details(mut self, details: ImageDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// 校验结论。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Verdict {
    Accepted(ImageDetails),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// 拒绝原因文案；接受时为 `None`。
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(&rejection.reason),
        }
    }

    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection.kind),
        }
    }

    /// 图片详情：接受时总是存在，拒绝时仅植被评分不足分支携带。
    pub fn details(&self) -> Option<&ImageDetails> {
        match self {
            Self::Accepted(details) => Some(details),
            Self::Rejected(rejection) => rejection.details.as_ref(),
        }
    }
}

/// MB 数值保留两位小数，用于详情展示。
pub(crate) fn round_size_mb(size_mb: f64) -> f64 {
    (size_mb * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_serializes_with_camel_case_details() {
        let verdict = Verdict::Accepted(ImageDetails {
            width: 5000,
            height: 5000,
            size_mb: 3.0,
            media_type: "image/png".to_string(),
            vegetation_score: 1.0,
        });

        let value = serde_json::to_value(&verdict).expect("serialize verdict failed");

        assert_eq!(value["status"], "accepted");
        assert_eq!(value["width"], 5000);
        assert_eq!(value["sizeMB"], 3.0);
        assert_eq!(value["mediaType"], "image/png");
        assert_eq!(value["vegetationScore"], 1.0);
    }

    #[test]
    fn rejected_without_details_omits_field() {
        let verdict = Verdict::Rejected(Rejection::new(
            RejectionKind::NotAnImage,
            REASON_NOT_AN_IMAGE,
        ));

        let value = serde_json::to_value(&verdict).expect("serialize verdict failed");

        assert_eq!(value["status"], "rejected");
        assert_eq!(value["kind"], "notAnImage");
        assert_eq!(value["reason"], REASON_NOT_AN_IMAGE);
        assert!(value.get("details").is_none());
        assert_eq!(verdict.details(), None);
    }

    #[test]
    fn round_size_mb_keeps_two_decimals() {
        assert_eq!(round_size_mb(3.0), 3.0);
        assert_eq!(round_size_mb(1.23456), 1.23);
        assert_eq!(round_size_mb(0.005), 0.01);
    }
}
