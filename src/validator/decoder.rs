//! # 解码与降采样模块
//!
//! ## 设计思路
//!
//! 校验器只依赖 `RasterDecoder` 能力接口，不绑定具体解码库；默认实现
//! `ImageCrateDecoder` 基于 `image` + `fast_image_resize`。
//! 配置了像素上限时，先读取 header 尺寸做检查再完整解码，降低恶意输入触发高内存开销的风险；
//! 未配置时不限制像素数，任何能正常解码的图片都交给后续尺寸与评分判断。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限（若有）快速拒绝
//! 3. 关闭 `image` 内置的分配上限后完整解码
//! 4. 长边超过 `max_sample_side` 时等比降采样
//! 5. 转换 RGBA，并校验字节长度一致性

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;

use super::source::Raster;
use super::DecodeError;

/// 单次解码的资源约束。
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// 采样缓冲长边上限。
    pub max_sample_side: u32,
    /// 原图像素上限，`None` 表示不限制。
    pub max_decoded_pixels: Option<u64>,
}

/// 图片解码能力。
///
/// 实现方在阻塞线程池中被调用，可以执行 CPU 密集的同步解码。
pub trait RasterDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], options: DecodeOptions) -> Result<Raster, DecodeError>;
}

/// 基于 `image` crate 的默认解码器。
#[derive(Debug, Clone)]
pub struct ImageCrateDecoder {
    /// 降采样滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ImageCrateDecoder {
    fn default() -> Self {
        Self {
            resize_filter: FilterType::Triangle,
        }
    }
}

impl RasterDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8], options: DecodeOptions) -> Result<Raster, DecodeError> {
        let format: ImageFormat = image::guess_format(bytes)
            .map_err(|e| DecodeError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = inspect_dimensions_from_memory(bytes)?;
        validate_pixel_limits(options.max_decoded_pixels, header_width, header_height)?;

        let mut reader = image::ImageReader::with_format(Cursor::new(bytes), format);
        reader.no_limits();
        let decoded = reader
            .decode()
            .map_err(|e| DecodeError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        validate_pixel_limits(options.max_decoded_pixels, width, height)?;

        let (sample_width, sample_height) =
            sample_dimensions(width, height, options.max_sample_side);
        let sampled = if (sample_width, sample_height) == (width, height) {
            decoded
        } else {
            self.downscale(decoded, sample_width, sample_height)
        };

        let rgba = sampled.to_rgba8().into_raw();
        let expected_len = (sample_width as usize)
            .checked_mul(sample_height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| DecodeError::ResourceLimit("采样尺寸导致内存溢出风险".to_string()))?;

        if rgba.len() != expected_len {
            return Err(DecodeError::Decode("解码后像素数据长度异常".to_string()));
        }

        log::debug!(
            "🧩 解码完成 - 格式: {:?} 原始尺寸: {}x{} 采样尺寸: {}x{}",
            format,
            width,
            height,
            sample_width,
            sample_height
        );

        Ok(Raster {
            width,
            height,
            sample_width,
            sample_height,
            rgba,
        })
    }
}

impl ImageCrateDecoder {
    fn downscale(&self, image: DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
        match resize_with_fast_image_resize(&image, target_width, target_height, self.resize_filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}",
                    err
                );
                image.resize_exact(target_width, target_height, self.resize_filter)
            }
        }
    }
}

/// 计算采样尺寸：`scale = min(1, max_side / max(w, h))`，四舍五入且每边至少 1。
pub(crate) fn sample_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 {
        return (width, height);
    }

    let scale = (max_side as f64 / longest as f64).min(1.0);
    if scale >= 1.0 {
        return (width, height);
    }

    let target_width = ((width as f64 * scale).round() as u32).max(1);
    let target_height = ((height as f64 * scale).round() as u32).max(1);
    (target_width, target_height)
}

/// 仅通过内存中的图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| DecodeError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(max_pixels: Option<u64>, width: u32, height: u32) -> Result<(), DecodeError> {
    let Some(max_pixels) = max_pixels else {
        return Ok(());
    };

    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| DecodeError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > max_pixels {
        return Err(DecodeError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, max_pixels
        )));
    }

    Ok(())
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<DynamicImage, DecodeError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image =
        fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
            .map_err(|e| DecodeError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| DecodeError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
        target_width,
        target_height,
        dst_image.into_vec(),
    )
    .ok_or_else(|| DecodeError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgba(pixel));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn options() -> DecodeOptions {
        DecodeOptions {
            max_sample_side: 512,
            max_decoded_pixels: None,
        }
    }

    #[test]
    fn sample_dimensions_preserve_aspect_ratio() {
        assert_eq!(sample_dimensions(300, 200, 512), (300, 200));
        assert_eq!(sample_dimensions(1024, 512, 512), (512, 256));
        assert_eq!(sample_dimensions(5000, 5000, 512), (512, 512));
        assert_eq!(sample_dimensions(4000, 3, 512), (512, 1));
    }

    #[test]
    fn decode_keeps_small_images_unscaled() {
        let png = create_png_bytes(300, 280, [0, 200, 0, 255]);
        let raster = ImageCrateDecoder::default()
            .decode(&png, options())
            .expect("decode should succeed");

        assert_eq!((raster.width, raster.height), (300, 280));
        assert_eq!((raster.sample_width, raster.sample_height), (300, 280));
        assert_eq!(raster.rgba.len(), 300 * 280 * 4);
        assert_eq!(&raster.rgba[..4], &[0, 200, 0, 255]);
    }

    #[test]
    fn decode_downscales_long_side_to_limit() {
        let png = create_png_bytes(2048, 1024, [0, 200, 0, 255]);
        let raster = ImageCrateDecoder::default()
            .decode(&png, options())
            .expect("decode should succeed");

        assert_eq!((raster.width, raster.height), (2048, 1024));
        assert_eq!((raster.sample_width, raster.sample_height), (512, 256));
        assert_eq!(raster.sample_pixels(), 512 * 256);
    }

    #[test]
    fn decode_rejects_garbage_bytes() {
        let result = ImageCrateDecoder::default().decode(b"definitely not an image", options());

        assert!(matches!(result, Err(DecodeError::InvalidFormat(_))));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let png = create_png_bytes(2000, 2000, [0, 200, 0, 255]);
        let result = ImageCrateDecoder::default().decode(
            &png,
            DecodeOptions {
                max_sample_side: 512,
                max_decoded_pixels: Some(1_000_000),
            },
        );

        assert!(matches!(result, Err(DecodeError::ResourceLimit(_))));
    }
}
