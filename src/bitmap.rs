//! # 像素通道访问模块
//!
//! 以有界窗口批量读写载体的原始通道字节，顺序固定为行优先、
//! 像素优先、通道优先 (R,G,B,R,G,B…)。写入总是产出新的无损文件：
//! 先写入目标目录下的临时文件，成功后原子改名发布，
//! 源载体永不被就地修改，失败也不会留下半成品。

use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};

use crate::constants::CHANNELS_PER_PIXEL;
use crate::error::StegoError;

/// 载体通道字节的窗口化读写契约。
///
/// 编解码器按同一遍历顺序分窗口读与写，窗口边界本身对结果不可见。
pub trait PixelChannelAccess {
    /// 载体的像素总数。
    fn pixel_count(&self) -> usize;

    /// 读取像素下标 `[start, end)` 的通道字节，长度恰为 `3*(end-start)`。
    fn read_window(&self, start: usize, end: usize) -> Result<Vec<u8>, StegoError>;

    /// 用展平的通道字节改写从像素 0 开始的前 `len/3` 个像素并持久化，
    /// 返回新文件位置。末尾不足一个像素的字节被截断忽略，不报错。
    fn write(&mut self, channels: &[u8]) -> Result<PathBuf, StegoError>;
}

/// 基于 `image` crate 的位图实现：打开时解码一次，窗口从内存缓冲切片。
pub struct BitmapAccess {
    pixels: RgbImage,
    source: PathBuf,
    output: Option<PathBuf>,
}

impl BitmapAccess {
    /// 打开并解码载体。任何解码失败都归为 `CarrierUnreadable`。
    pub fn open(path: &Path) -> Result<Self, StegoError> {
        let image = image::open(path).map_err(|e| StegoError::CarrierUnreadable {
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(Self {
            pixels: image.to_rgb8(),
            source: path.to_owned(),
            output: None,
        })
    }

    /// 指定编码结果的输出路径；缺省时在源文件旁派生 `hidden_<原名>.png`。
    pub fn with_output(mut self, dest: PathBuf) -> Self {
        self.output = Some(dest);
        self
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.source))
    }
}

/// 为编码结果派生默认输出路径：与源同目录的 `hidden_<文件名>.png`。
pub fn default_output(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carrier".to_owned());
    source.with_file_name(format!("hidden_{stem}.png"))
}

/// 按输出扩展名挑选无损编码格式，认不出或不保证无损时退回 PNG。
fn lossless_format_for(dest: &Path) -> ImageFormat {
    dest.extension()
        .and_then(|ext| ImageFormat::from_extension(ext))
        .filter(|format| {
            matches!(
                format,
                ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::Qoi
            )
        })
        .unwrap_or(ImageFormat::Png)
}

impl PixelChannelAccess for BitmapAccess {
    fn pixel_count(&self) -> usize {
        self.pixels.width() as usize * self.pixels.height() as usize
    }

    fn read_window(&self, start: usize, end: usize) -> Result<Vec<u8>, StegoError> {
        let pixels = self.pixel_count();
        if start > end || end > pixels {
            return Err(StegoError::WindowOutOfRange { start, end, pixels });
        }
        Ok(self.pixels.as_raw()[start * CHANNELS_PER_PIXEL..end * CHANNELS_PER_PIXEL].to_vec())
    }

    fn write(&mut self, channels: &[u8]) -> Result<PathBuf, StegoError> {
        // 截断末尾不完整的像素，容忍差一的窗口边界
        let count = (channels.len() / CHANNELS_PER_PIXEL).min(self.pixel_count());
        let staged = &channels[..count * CHANNELS_PER_PIXEL];
        let raw: &mut [u8] = &mut self.pixels;
        raw[..staged.len()].copy_from_slice(staged);

        let dest = self.output_path();
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staging = tempfile::Builder::new()
            .prefix(".hushpix-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        self.pixels
            .write_to(staging.as_file_mut(), lossless_format_for(&dest))
            .map_err(io::Error::other)?;
        staging.persist(&dest).map_err(|e| StegoError::Io(e.error))?;

        tracing::debug!(pixels = count, dest = %dest.display(), "carrier persisted");
        Ok(dest)
    }
}
