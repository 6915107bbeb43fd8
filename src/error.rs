//! # 错误类型模块
//!
//! 定义隐写编解码全流程的错误分类。每种失败都有独立的、人类可读的提示；
//! `InvalidPassword` 与 `TruncatedStream` 之类的载体问题严格区分，
//! 因为二者的补救方式不同 (重新输入密码 vs 重新选择载体)。

use thiserror::Error;

/// 隐写编码或解码过程中可能出现的错误。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 载体无法按无损位图解码，或载体类型不受支持。
    #[error("Unable to read the carrier: {reason}")]
    CarrierUnreadable { reason: String },

    /// 秘密文本去除首尾空白后为空。
    #[error("Secret message cannot be empty.")]
    EmptySecret,

    /// 载荷超出载体的可嵌入比特数。该检查先于任何写入。
    #[error(
        "Not enough space in the carrier to hide the payload. \nRequired: {required} bits, Available: {available} bits"
    )]
    InsufficientCapacity { required: u64, available: u64 },

    /// 请求的像素窗口越界。
    #[error("Pixel window [{start}, {end}) is invalid for a carrier of {pixels} pixels.")]
    WindowOutOfRange {
        start: usize,
        end: usize,
        pixels: usize,
    },

    /// 可用比特数少于长度头声明的数量。
    /// 通常意味着载体从未被编码过，或编码后经过了有损压缩。
    #[error(
        "The hidden bitstream is truncated: declared {expected} bits, only {available} usable. \nThe carrier may not contain a hidden message or was re-compressed lossily."
    )]
    TruncatedStream { expected: u64, available: u64 },

    /// 恢复出的字节不是合法的载荷信封。
    #[error("The recovered payload is not a valid envelope.")]
    MalformedEnvelope,

    /// 信封携带密码，且与调用方提供的不一致。
    #[error("Invalid password for this hidden message.")]
    InvalidPassword,

    /// 读写载体文件时的底层 I/O 失败。
    #[error("Carrier I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
