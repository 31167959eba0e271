//! # 诊断结果上报模块
//!
//! ## 设计思路
//!
//! 诊断报告可选地以表单（`application/x-www-form-urlencoded`）POST 到远端地址。
//! 上报是一次性的外部调用：只请求一次，不重试，失败原样返回给调用方决定是否提示。
//!
//! ## 实现思路
//!
//! - 构造阶段校验地址协议（仅 HTTP/HTTPS）并复用同一个 `reqwest::Client`。
//! - 列表字段（治疗 / 预防）以 `"; "` 拼接为单个表单值。
//! - reqwest 错误统一映射到 `SubmitError`，日志中去除查询串避免泄露令牌。

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::diagnosis::DiagnosisReport;

const LIST_SEPARATOR: &str = "; ";

/// 上报配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionConfig {
    /// 接收表单的远端地址。
    pub endpoint: String,
    /// 整体请求超时（秒）。
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 建立连接超时（秒）。
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    8
}

impl SubmissionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// 上报错误。
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("上报地址无效：{0}")]
    InvalidEndpoint(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("HTTP {0}: 远端拒绝了上报")]
    Status(u16),
}

/// 诊断结果上报客户端。
pub struct ResultSubmitter {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    timeout_secs: u64,
}

impl ResultSubmitter {
    pub fn new(config: &SubmissionConfig) -> Result<Self, SubmitError> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| SubmitError::InvalidEndpoint(format!("URL 格式错误：{}", e)))?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(SubmitError::InvalidEndpoint("仅支持 HTTP/HTTPS".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SubmitError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs: config.timeout_secs,
        })
    }

    /// 提交一份诊断报告。
    pub async fn submit(&self, report: &DiagnosisReport) -> Result<(), SubmitError> {
        let fields = form_fields(report);
        log::info!("📤 上报诊断结果 - {}", self.redacted_endpoint());

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&fields)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("⚠️ 上报被拒绝 - HTTP {}", status.as_u16());
            return Err(SubmitError::Status(status.as_u16()));
        }

        log::debug!("✅ 上报完成 - HTTP {}", status.as_u16());
        Ok(())
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> SubmitError {
        let err_msg = e.to_string().replace(self.endpoint.as_str(), &self.redacted_endpoint());

        if e.is_timeout() {
            SubmitError::Timeout(format!("上报超时（{}秒）", self.timeout_secs))
        } else if e.is_connect() {
            SubmitError::Network(format!("无法连接：{}", err_msg))
        } else {
            SubmitError::Network(format!("请求失败：{}", err_msg))
        }
    }

    fn redacted_endpoint(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or("<unknown-host>");
        let port = self
            .endpoint
            .port()
            .map(|p| format!(":{}", p))
            .unwrap_or_default();
        format!("{}://{}{}{}", self.endpoint.scheme(), host, port, self.endpoint.path())
    }
}

/// 将报告展开为表单字段。
pub fn form_fields(report: &DiagnosisReport) -> Vec<(&'static str, String)> {
    let disease = report.disease;
    let mut fields = vec![
        ("crop", report.crop.clone()),
        ("mode", report.mode.as_str().to_string()),
        ("disease", disease.name.to_string()),
        ("confidence", disease.confidence.to_string()),
        ("severity", disease.severity.as_str().to_string()),
        ("treatments", disease.treatments.join(LIST_SEPARATOR)),
        ("prevention", disease.prevention.join(LIST_SEPARATOR)),
        ("created_at", report.created_at.clone()),
    ];

    if let Some(image) = &report.image {
        fields.push(("vegetation_score", format!("{:.3}", image.vegetation_score)));
    }

    fields
}
