//! LSB 编解码核心：把成帧后的比特按像素优先、R,G,B 通道次序
//! 逐一写入通道字节的最低位，提取按完全相同的顺序回读。
//! 这个遍历顺序是区分信号与噪声的唯一依据，两端必须一致。

use std::path::PathBuf;

use crate::bitmap::PixelChannelAccess;
use crate::bitstream::{self, Unframer};
use crate::constants::{CHANNELS_PER_PIXEL, LENGTH_HEADER_BITS, WINDOW_PIXELS};
use crate::error::StegoError;

/// 载体可容纳的比特数：每个通道一个 LSB 槽位。
pub fn capacity_bits(pixel_count: usize) -> u64 {
    pixel_count as u64 * CHANNELS_PER_PIXEL as u64
}

/// 载荷成帧后占用的比特数：固定长度头 + 每字节 8 bits。
pub fn required_bits(payload_len: usize) -> u64 {
    LENGTH_HEADER_BITS as u64 + payload_len as u64 * 8
}

/// 把载荷嵌入载体并持久化，返回新文件位置。
/// 容量检查先于一切写入，检查失败时载体保持原样。
pub fn embed<A: PixelChannelAccess + ?Sized>(
    access: &mut A,
    payload: &[u8],
) -> Result<PathBuf, StegoError> {
    embed_in_windows(access, payload, WINDOW_PIXELS)
}

/// 从载体中提取成帧前的载荷字节。
pub fn extract<A: PixelChannelAccess + ?Sized>(access: &A) -> Result<Vec<u8>, StegoError> {
    extract_in_windows(access, WINDOW_PIXELS)
}

fn embed_in_windows<A: PixelChannelAccess + ?Sized>(
    access: &mut A,
    payload: &[u8],
    window: usize,
) -> Result<PathBuf, StegoError> {
    debug_assert!(window > 0);
    let required = required_bits(payload.len());
    let available = capacity_bits(access.pixel_count());
    if required > available {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }

    let bits = bitstream::frame(payload);
    // 载荷只占据通道流的前缀；末尾未占满的像素也要整个读出回写
    let pixels_touched = bits.len().div_ceil(CHANNELS_PER_PIXEL);
    let mut staged = Vec::with_capacity(pixels_touched * CHANNELS_PER_PIXEL);

    let mut start = 0;
    while start < pixels_touched {
        let end = (start + window).min(pixels_touched);
        let mut channels = access.read_window(start, end)?;
        let base = start * CHANNELS_PER_PIXEL;
        for (offset, value) in channels.iter_mut().enumerate() {
            if let Some(&bit) = bits.get(base + offset) {
                *value = (*value & 0xFE) | bit;
            }
        }
        staged.extend_from_slice(&channels);
        tracing::debug!(start, end, "window staged");
        start = end;
    }

    let uri = access.write(&staged)?;
    tracing::info!(bits = bits.len(), uri = %uri.display(), "payload embedded");
    Ok(uri)
}

fn extract_in_windows<A: PixelChannelAccess + ?Sized>(
    access: &A,
    window: usize,
) -> Result<Vec<u8>, StegoError> {
    debug_assert!(window > 0);
    let pixels = access.pixel_count();
    let mut unframer = Unframer::new(capacity_bits(pixels));

    let mut start = 0;
    'windows: while start < pixels {
        let end = (start + window).min(pixels);
        for value in access.read_window(start, end)? {
            if unframer.push(value & 0x01)? {
                break 'windows;
            }
        }
        start = end;
    }

    let payload = unframer.into_bytes()?;
    tracing::info!(bytes = payload.len(), "payload extracted");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 内存中的通道缓冲，扮演窗口化访问契约的另一端。
    struct MemoryAccess {
        channels: Vec<u8>,
        written: Option<Vec<u8>>,
    }

    impl MemoryAccess {
        fn new(channels: Vec<u8>) -> Self {
            assert_eq!(channels.len() % CHANNELS_PER_PIXEL, 0);
            Self {
                channels,
                written: None,
            }
        }
    }

    impl PixelChannelAccess for MemoryAccess {
        fn pixel_count(&self) -> usize {
            self.channels.len() / CHANNELS_PER_PIXEL
        }

        fn read_window(&self, start: usize, end: usize) -> Result<Vec<u8>, StegoError> {
            let pixels = self.pixel_count();
            if start > end || end > pixels {
                return Err(StegoError::WindowOutOfRange { start, end, pixels });
            }
            Ok(self.channels[start * CHANNELS_PER_PIXEL..end * CHANNELS_PER_PIXEL].to_vec())
        }

        fn write(&mut self, channels: &[u8]) -> Result<PathBuf, StegoError> {
            let count = channels.len() / CHANNELS_PER_PIXEL;
            let staged = &channels[..count * CHANNELS_PER_PIXEL];
            self.channels[..staged.len()].copy_from_slice(staged);
            self.written = Some(staged.to_vec());
            Ok(PathBuf::from("memory://carrier"))
        }
    }

    #[test]
    fn roundtrip_survives_mismatched_window_sizes() {
        // 嵌入与提取各用一个互质的窗口大小，结果必须一致
        let payload = b"windowed roundtrip payload".to_vec();
        let mut access = MemoryAccess::new(vec![0b1010_1010; 200 * 3]);
        embed_in_windows(&mut access, &payload, 5).unwrap();
        assert_eq!(extract_in_windows(&access, 7).unwrap(), payload);
        assert_eq!(extract_in_windows(&access, 100_000).unwrap(), payload);
    }

    #[test]
    fn exact_capacity_fits() {
        // 2 字节载荷 → 32+16=48 bits，恰好填满 16 个像素
        let payload = vec![0xC3, 0x5A];
        let mut access = MemoryAccess::new(vec![0xFF; 16 * 3]);
        embed_in_windows(&mut access, &payload, 4).unwrap();
        assert_eq!(extract_in_windows(&access, 4).unwrap(), payload);
    }

    #[test]
    fn capacity_overflow_rejected_before_any_write() {
        let payload = vec![0xC3, 0x5A];
        let mut access = MemoryAccess::new(vec![0xFF; 15 * 3]);
        let err = embed_in_windows(&mut access, &payload, 4).unwrap_err();
        assert!(matches!(
            err,
            StegoError::InsufficientCapacity {
                required: 48,
                available: 45
            }
        ));
        assert!(access.written.is_none());
        assert!(access.channels.iter().all(|&c| c == 0xFF));
    }

    #[test]
    fn only_the_lsb_plane_is_touched() {
        let mut access = MemoryAccess::new(vec![0b0101_0100; 30 * 3]);
        embed_in_windows(&mut access, b"x", 8).unwrap();
        for &channel in &access.channels {
            assert_eq!(channel & 0xFE, 0b0101_0100);
        }
    }

    #[test]
    fn length_header_occupies_the_first_32_slots() {
        let mut access = MemoryAccess::new(vec![0u8; 14 * 3]);
        embed_in_windows(&mut access, &[0xFF], 16).unwrap();
        let lsbs: Vec<u8> = access.channels.iter().map(|c| c & 1).collect();
        // 长度 1 的大端表示：31 个 0 后跟 1 个 1
        assert!(lsbs[..31].iter().all(|&b| b == 0));
        assert_eq!(lsbs[31], 1);
        // 数据字节 0xFF 的 8 个比特全为 1
        assert!(lsbs[32..40].iter().all(|&b| b == 1));
    }

    #[test]
    fn untouched_suffix_is_not_rewritten() {
        let mut access = MemoryAccess::new(vec![0xAB; 100 * 3]);
        embed_in_windows(&mut access, &[0x00], 32).unwrap();
        // 40 bits → 前 14 个像素被改写，其余像素不进入写回
        let written = access.written.as_ref().unwrap();
        assert_eq!(written.len(), 14 * 3);
        assert!(access.channels[14 * 3..].iter().all(|&c| c == 0xAB));
    }

    #[test]
    fn corrupted_length_header_reports_truncation() {
        let mut access = MemoryAccess::new(vec![0u8; 40 * 3]);
        embed_in_windows(&mut access, b"abc", 9).unwrap();
        // 把长度头最高位翻成 1，声明的长度立即超出容量
        access.channels[0] |= 0x01;
        assert!(matches!(
            extract_in_windows(&access, 9),
            Err(StegoError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn extraction_is_idempotent() {
        let payload = b"same twice".to_vec();
        let mut access = MemoryAccess::new(vec![0x80; 80 * 3]);
        embed_in_windows(&mut access, &payload, 11).unwrap();
        let first = extract_in_windows(&access, 11).unwrap();
        let second = extract_in_windows(&access, 11).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, payload);
    }
}
