/// 每个像素参与隐写的颜色通道数 (R, G, B)。
/// 载体若带 Alpha 通道，解码时会被丢弃，不占用嵌入槽位。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 用于记录载荷长度的头部比特数。
/// 长度以大端序 `u32` 表示，固定 32 bits，与载荷内容无关；
/// 解码端必须先完整读出这 32 bits 才知道后续还要读多少数据比特。
pub const LENGTH_HEADER_BITS: usize = 32;

/// 单次窗口读写的像素数量。
/// 窗口太小会放大每次调用的固定开销，太大则抬高峰值内存，
/// 数万像素是一个折中值。窗口大小只影响性能，不影响编解码结果。
pub const WINDOW_PIXELS: usize = 32_768;

/// 帧序列载体中承载载荷的帧下标。
/// 整个载荷只写入这一帧，其余帧逐字节原样保留。
pub const PAYLOAD_FRAME_INDEX: usize = 0;
