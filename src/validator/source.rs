//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `CandidateImage` 表示已加载但未解码的字节（含声明的媒体类型与体积）
//! - `Raster` 表示解码并降采样后的 RGBA 采样缓冲

use bytes::Bytes;

/// 图片输入来源。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
}

/// 待校验图片：原始字节 + 声明的媒体类型 + 字节数。
///
/// `size_bytes` 与 `bytes.len()` 分开保存：超过体积上限的文件不会被读入内存，
/// 此时 `bytes` 为空而 `size_bytes` 仍是真实大小。
#[derive(Debug, Clone)]
pub struct CandidateImage {
    pub bytes: Bytes,
    pub media_type: String,
    pub size_bytes: u64,
}

impl CandidateImage {
    /// 以字节内容长度作为体积创建候选图片。
    pub fn new(bytes: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let size_bytes = bytes.len() as u64;
        Self {
            bytes,
            media_type: media_type.into(),
            size_bytes,
        }
    }

    /// 显式指定声明体积（例如上传表单给出的文件大小）。
    pub fn from_parts(
        bytes: impl Into<Bytes>,
        media_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            size_bytes,
        }
    }

    /// 体积（MB，1 MB = 1024 * 1024 字节）。
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

/// 解码阶段输出：原图尺寸 + 降采样后的 RGBA 采样缓冲。
#[derive(Debug, Clone)]
pub struct Raster {
    /// 原图宽度（像素）。
    pub width: u32,
    /// 原图高度（像素）。
    pub height: u32,
    /// 采样缓冲宽度（长边不超过 `max_sample_side`）。
    pub sample_width: u32,
    /// 采样缓冲高度。
    pub sample_height: u32,
    /// RGBA 字节数组（`sample_width * sample_height * 4`）。
    pub rgba: Vec<u8>,
}

impl Raster {
    /// 采样缓冲中的像素数量。
    pub fn sample_pixels(&self) -> usize {
        self.rgba.len() / 4
    }
}
