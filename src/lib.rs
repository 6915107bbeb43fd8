//! # hushpix 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：载荷信封、比特流成帧、
//! 窗口化像素访问、LSB 编解码，以及按载体类型分派的调度器。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod bitstream;
pub mod cli;
pub mod constants;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod steganography;

pub use bitmap::{BitmapAccess, PixelChannelAccess};
pub use dispatch::{CarrierKind, EncodeOutcome, decode, encode};
pub use envelope::PayloadEnvelope;
pub use error::StegoError;
