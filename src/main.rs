//! # 作物病害诊断：命令行入口
//!
//! 本文件仅负责参数解析、服务初始化与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。
//!
//! 退出码：`0` 诊断完成，`2` 图片被拒绝，`1` 运行错误或参数错误。

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use crop_diagnosis::diagnosis::{Catalog, DiagnosisReport};
use crop_diagnosis::error::AppError;
use crop_diagnosis::service::{AnalysisOutcome, DiagnosisService};
use crop_diagnosis::settings::{self, AppSettings};
use crop_diagnosis::validator::ImageSource;
use serde::Serialize;

const EXIT_REJECTED: u8 = 2;

/// 叶片照片校验与模拟病害诊断
#[derive(Parser, Debug)]
#[command(name = "crop-diagnosis", version, about = "Leaf photo check and mock crop disease diagnosis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// 校验叶片照片，通过后给出诊断
    Image {
        /// 图片文件路径
        path: String,
        /// 作物名称，未知作物使用兜底诊断
        #[arg(long, default_value = "general")]
        crop: String,
        /// 将诊断结果上报到设置中的地址
        #[arg(long)]
        submit: bool,
    },
    /// 根据症状描述给出诊断
    Text {
        /// 作物名称
        crop: String,
        /// 症状描述（多个单词以空格拼接）
        #[arg(required = true)]
        description: Vec<String>,
        /// 将诊断结果上报到设置中的地址
        #[arg(long)]
        submit: bool,
    },
    /// 列出支持的作物
    Crops,
    /// 写入一份默认设置文件
    InitSettings {
        /// 覆盖已存在的设置文件
        #[arg(long)]
        force: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Settings(format!("序列化输出失败: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn load_service(settings_path: &Path) -> Result<DiagnosisService, AppError> {
    let settings = settings::load_settings_from_path(settings_path)?;
    DiagnosisService::from_settings(&settings)
}

fn init_settings(settings_path: &Path, force: bool) -> Result<ExitCode, AppError> {
    if settings_path.exists() && !force {
        return Err(AppError::Settings(format!(
            "设置文件已存在：{}（使用 --force 覆盖）",
            settings_path.display()
        )));
    }

    settings::save_settings_to_path(settings_path, &AppSettings::default())?;
    log::info!("⚙️ 已写入默认设置：{}", settings_path.display());
    print_json(&serde_json::json!({ "settings": settings_path.display().to_string() }))?;
    Ok(ExitCode::SUCCESS)
}

async fn finish_report(
    service: &DiagnosisService,
    report: &DiagnosisReport,
    submit: bool,
) -> Result<(), AppError> {
    print_json(report)?;
    if submit && !service.submit(report).await? {
        log::warn!("⚠️ 未配置上报地址（settings.json 中的 submission.endpoint），已跳过上报");
    }
    Ok(())
}

async fn run(command: Command, settings_path: &Path) -> Result<ExitCode, AppError> {
    match command {
        Command::Crops => {
            print_json(&Catalog::builtin().crops())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::InitSettings { force } => init_settings(settings_path, force),
        Command::Text {
            crop,
            description,
            submit,
        } => {
            let service = load_service(settings_path)?;
            let report =
                service.analyze_text(&crop, &description.join(" "), &mut rand::thread_rng())?;
            finish_report(&service, &report, submit).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Image { path, crop, submit } => {
            let service = load_service(settings_path)?;
            let source = ImageSource::FilePath(path);
            let outcome = service
                .analyze_image(&source, &crop, &mut rand::thread_rng())
                .await?;
            match outcome {
                AnalysisOutcome::Diagnosed(report) => {
                    finish_report(&service, &report, submit).await?;
                    Ok(ExitCode::SUCCESS)
                }
                rejected @ AnalysisOutcome::Rejected(_) => {
                    print_json(&rejected)?;
                    Ok(ExitCode::from(EXIT_REJECTED))
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli.command, &settings::settings_file_path()).await {
        Ok(code) => code,
        Err(err) => {
            log::error!("❌ [{}] {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("crop_diagnosis_cli_{}_{}", nanos, name));
        std::fs::create_dir_all(&dir).expect("create temp dir failed");
        dir
    }

    fn write_png(dir: &Path, width: u32, height: u32, pixel: [u8; 4]) -> String {
        let path = dir.join("leaf.png");
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(width, height, Rgba(pixel)))
            .save_with_format(&path, ImageFormat::Png)
            .expect("write test png failed");
        path.display().to_string()
    }

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("crop-diagnosis").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn image_defaults_to_general_crop_without_submit() {
        let command = parse(&["image", "leaf.jpg"]).expect("parse failed");

        assert_eq!(
            command,
            Command::Image {
                path: "leaf.jpg".to_string(),
                crop: "general".to_string(),
                submit: false,
            }
        );
    }

    #[test]
    fn image_accepts_crop_and_submit_flags() {
        let command =
            parse(&["image", "--crop", "Tomato", "leaf.jpg", "--submit"]).expect("parse failed");

        assert_eq!(
            command,
            Command::Image {
                path: "leaf.jpg".to_string(),
                crop: "Tomato".to_string(),
                submit: true,
            }
        );
    }

    #[test]
    fn text_collects_description_words() {
        let command =
            parse(&["text", "corn", "orange", "pustules", "--submit"]).expect("parse failed");

        assert_eq!(
            command,
            Command::Text {
                crop: "corn".to_string(),
                description: vec!["orange".to_string(), "pustules".to_string()],
                submit: true,
            }
        );
    }

    #[test]
    fn invalid_invocations_are_usage_errors() {
        for args in [
            &[][..],
            &["image", "leaf.jpg", "--crop"][..],
            &["image", "a.jpg", "b.jpg"][..],
            &["text", "tomato"][..],
            &["scan", "leaf.jpg"][..],
        ] {
            let err = parse(args).expect_err("parse should fail");
            assert!(err.use_stderr(), "{:?}", args);
        }
    }

    #[tokio::test]
    async fn rejected_image_exits_with_rejection_code() {
        let dir = temp_dir("rejected");
        let path = write_png(&dir, 300, 300, [200, 50, 50, 255]);
        let command = Command::Image {
            path,
            crop: "tomato".to_string(),
            submit: false,
        };

        let code = run(command, &dir.join("settings.json")).await.expect("run failed");
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(code, ExitCode::from(EXIT_REJECTED));
    }

    #[tokio::test]
    async fn diagnosed_image_exits_successfully() {
        let dir = temp_dir("diagnosed");
        let path = write_png(&dir, 300, 300, [0, 200, 0, 255]);
        let command = Command::Image {
            path,
            crop: "tomato".to_string(),
            submit: false,
        };

        let code = run(command, &dir.join("settings.json")).await.expect("run failed");
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn missing_image_is_an_error() {
        let dir = temp_dir("missing");
        let command = Command::Image {
            path: dir.join("absent.png").display().to_string(),
            crop: "tomato".to_string(),
            submit: false,
        };

        let result = run(command, &dir.join("settings.json")).await;
        let _ = std::fs::remove_dir_all(&dir);

        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[tokio::test]
    async fn short_description_is_an_error() {
        let dir = temp_dir("short");
        let command = Command::Text {
            crop: "rice".to_string(),
            description: vec!["spots".to_string()],
            submit: false,
        };

        let result = run(command, &dir.join("settings.json")).await;
        let _ = std::fs::remove_dir_all(&dir);

        assert!(matches!(result, Err(AppError::Diagnosis(_))));
    }

    #[test]
    fn init_settings_writes_defaults_once() {
        let dir = temp_dir("init");
        let path = dir.join("settings.json");

        let code = init_settings(&path, false).expect("init settings failed");
        let loaded = settings::load_settings_from_path(&path).expect("load settings failed");
        let second = init_settings(&path, false);
        let forced = init_settings(&path, true);
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(loaded, AppSettings::default());
        assert!(matches!(second, Err(AppError::Settings(_))));
        assert!(forced.is_ok());
    }
}
