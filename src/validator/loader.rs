//! # 加载模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / Base64）的原始字节加载，产出带“声明媒体类型”的
//! `CandidateImage`。加载阶段只做 I/O 与格式解析，不做合理性判断：
//! 媒体类型、体积、像素与植被评分全部交给校验器，保证拒绝原因只有一个出口。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + metadata 体积；超过体积上限时只读取文件头识别类型，校验器会按体积拒绝。
//! - Base64：Data URL 的类型即声明类型；纯 Base64 按 magic bytes 推断。
//! - 声明类型推断顺序：`infer` 魔数 → 文件扩展名 → `application/octet-stream`。

use base64::{Engine as _, engine::general_purpose};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::source::{CandidateImage, ImageSource};
use super::LoadError;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
/// 超限文件只读取的文件头长度，足够覆盖常见图片签名。
const SNIFF_HEAD_LEN: u64 = 64;

/// Base64 输入允许的解码体积是体积上限的多少倍。
///
/// 超过体积上限但在该倍数内的输入仍会被解码，交给校验器给出带实际体积的拒绝文案。
const BASE64_HARD_CAP_FACTOR: f64 = 4.0;

/// 按来源加载候选图片。
pub fn load_candidate(source: &ImageSource, max_size_mb: f64) -> Result<CandidateImage, LoadError> {
    match source {
        ImageSource::FilePath(path) => load_from_file(path, max_size_mb),
        ImageSource::Base64(data) => load_from_base64(data, max_size_mb),
    }
}

/// 从本地路径加载候选图片。
pub fn load_from_file(path: &str, max_size_mb: f64) -> Result<CandidateImage, LoadError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path);

    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(LoadError::FileSystem(format!("文件不存在：{}", path)));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| LoadError::FileSystem(format!("无法读取文件信息：{}", e)))?;

    if !metadata.is_file() {
        return Err(LoadError::FileSystem(format!("不是普通文件：{}", path)));
    }

    let size_bytes = metadata.len();
    if size_bytes as f64 / BYTES_PER_MB > max_size_mb {
        log::debug!("📦 文件超过体积上限，仅读取文件头 - {} bytes", size_bytes);
        let head = read_file_head(file_path)?;
        let media_type = sniff_media_type(&head)
            .or_else(|| media_type_from_extension(file_path))
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string();
        return Ok(CandidateImage::from_parts(Vec::new(), media_type, size_bytes));
    }

    let bytes = std::fs::read(file_path)
        .map_err(|e| LoadError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    let media_type = sniff_media_type(&bytes)
        .or_else(|| media_type_from_extension(file_path))
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string();

    Ok(CandidateImage::new(bytes, media_type))
}

/// 从 Base64 字符串加载候选图片（支持 Data URL / 纯 Base64）。
pub fn load_from_base64(data: &str, max_size_mb: f64) -> Result<CandidateImage, LoadError> {
    log::info!("📝 开始处理 base64 图片");

    let normalized = data.trim();
    let hard_cap = (max_size_mb * BASE64_HARD_CAP_FACTOR * BYTES_PER_MB) as u64;

    let (declared_type, payload) = split_data_url(normalized)?;

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > hard_cap {
        return Err(LoadError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / BYTES_PER_MB,
            hard_cap as f64 / BYTES_PER_MB
        )));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| LoadError::Base64(format!("Base64 解码失败：{}", e)))?;

    let media_type = match declared_type {
        Some(declared) => declared.to_string(),
        None => sniff_media_type(&bytes).unwrap_or(FALLBACK_MEDIA_TYPE).to_string(),
    };

    Ok(CandidateImage::new(bytes, media_type))
}

/// 拆分 Data URL：返回 `(声明类型, base64 负载)`；非 Data URL 时声明类型为 `None`。
fn split_data_url(data: &str) -> Result<(Option<&str>, &str), LoadError> {
    let Some(rest) = data.strip_prefix("data:") else {
        return Ok((None, data));
    };

    let marker = rest
        .find(";base64,")
        .ok_or_else(|| LoadError::Base64("缺少 base64 标记".to_string()))?;

    let declared = rest[..marker].trim();
    let payload = &rest[marker + ";base64,".len()..];

    if declared.is_empty() {
        Ok((None, payload))
    } else {
        Ok((Some(declared), payload))
    }
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, LoadError> {
    let len = base64_data.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| LoadError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| LoadError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 读取文件开头的少量字节，仅用于签名识别。
fn read_file_head(path: &Path) -> Result<Vec<u8>, LoadError> {
    let file = File::open(path)
        .map_err(|e| LoadError::FileSystem(format!("无法打开图片文件：{}", e)))?;

    let mut head = Vec::with_capacity(SNIFF_HEAD_LEN as usize);
    file.take(SNIFF_HEAD_LEN)
        .read_to_end(&mut head)
        .map_err(|e| LoadError::FileSystem(format!("无法读取文件头：{}", e)))?;
    Ok(head)
}

/// 通过文件签名（magic bytes）推断媒体类型。
fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(media_type)
}
