//! # 作物病害诊断：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     CLI (main.rs)                        │
//! │  image <path> │ text <crop> <desc> │ crops │ init-settings │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<AnalysisOutcome, AppError>
//! ┌───────┴──────────────────────────────────────────────────┐
//! │  service ── DiagnosisService                             │
//! │   │                                                      │
//! │   ├─ validator ── 图片合理性校验                         │
//! │   │   ├─ loader   文件 / Base64 → CandidateImage         │
//! │   │   ├─ decoder  解码 + 降采样 (image / fast_image_resize)│
//! │   │   ├─ score    绿色像素占比                           │
//! │   │   └─ verdict  Accepted / Rejected                    │
//! │   │                                                      │
//! │   ├─ diagnosis ── 静态病害目录 + 症状关键词匹配          │
//! │   └─ submission ─ 表单 POST 上报 (reqwest)               │
//! │                                                          │
//! │  settings ── JSON 设置文件      error ── AppError         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`validator`] | 判断图片是否像一张植物叶片照片 |
//! | [`diagnosis`] | 作物病害目录、随机选择、症状匹配 |
//! | [`service`] | 组装校验、诊断与上报流程 |
//! | [`submission`] | 诊断结果表单上报 |
//! | [`settings`] | 设置文件读取与保存 |

pub mod error;
pub mod diagnosis;
pub mod service;
pub mod settings;
pub mod submission;
pub mod validator;
