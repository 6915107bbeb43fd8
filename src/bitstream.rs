//! # 比特流成帧模块
//!
//! 把字节载荷变成自描述的比特序列：32 bits 大端长度头，
//! 随后是按高位在前逐位展开的数据。头部宽度固定，与载荷内容无关。

use crate::constants::LENGTH_HEADER_BITS;
use crate::error::StegoError;

/// 把载荷字节展开为长度头 + 数据比特，每个元素为 0 或 1。
pub fn frame(payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= u32::MAX as usize);
    let mut bits = Vec::with_capacity(LENGTH_HEADER_BITS + payload.len() * 8);
    push_bits(&mut bits, &(payload.len() as u32).to_be_bytes());
    push_bits(&mut bits, payload);
    bits
}

fn push_bits(bits: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
}

/// 增量拆帧器。
///
/// 先吃满 32 bits 长度头才知道还需要多少数据比特；
/// 声明的总量一旦超出可用比特数就立即报 `TruncatedStream`，
/// 不必把载体读完。
#[derive(Debug)]
pub struct Unframer {
    available_bits: u64,
    bits_seen: u64,
    header: u32,
    declared_bytes: Option<usize>,
    data: Vec<u8>,
    pending: u8,
    pending_bits: u8,
}

impl Unframer {
    /// `available_bits` 是载体整体可提供的比特上限，用于尽早发现截断。
    pub fn new(available_bits: u64) -> Self {
        Self {
            available_bits,
            bits_seen: 0,
            header: 0,
            declared_bytes: None,
            data: Vec::new(),
            pending: 0,
            pending_bits: 0,
        }
    }

    /// 长度头与全部数据比特是否都已集齐。
    pub fn is_complete(&self) -> bool {
        match self.declared_bytes {
            Some(declared) => self.data.len() == declared && self.pending_bits == 0,
            None => false,
        }
    }

    /// 送入下一个比特，返回是否就此完成。完成后的多余比特被忽略。
    pub fn push(&mut self, bit: u8) -> Result<bool, StegoError> {
        debug_assert!(bit <= 1);
        if self.is_complete() {
            return Ok(true);
        }

        if self.bits_seen < LENGTH_HEADER_BITS as u64 {
            self.header = (self.header << 1) | u32::from(bit);
            self.bits_seen += 1;
            if self.bits_seen == LENGTH_HEADER_BITS as u64 {
                let declared = u64::from(self.header);
                let total = LENGTH_HEADER_BITS as u64 + declared * 8;
                if total > self.available_bits {
                    return Err(StegoError::TruncatedStream {
                        expected: total,
                        available: self.available_bits,
                    });
                }
                self.declared_bytes = Some(declared as usize);
                self.data.reserve_exact(declared as usize);
            }
            return Ok(self.is_complete());
        }

        self.pending = (self.pending << 1) | bit;
        self.pending_bits += 1;
        self.bits_seen += 1;
        if self.pending_bits == 8 {
            self.data.push(self.pending);
            self.pending = 0;
            self.pending_bits = 0;
        }
        Ok(self.is_complete())
    }

    /// 取出重组后的载荷字节；未集齐时报 `TruncatedStream`。
    pub fn into_bytes(self) -> Result<Vec<u8>, StegoError> {
        match self.declared_bytes {
            Some(declared) if self.data.len() == declared && self.pending_bits == 0 => {
                Ok(self.data)
            }
            Some(declared) => Err(StegoError::TruncatedStream {
                expected: LENGTH_HEADER_BITS as u64 + declared as u64 * 8,
                available: self.bits_seen,
            }),
            None => Err(StegoError::TruncatedStream {
                expected: LENGTH_HEADER_BITS as u64,
                available: self.bits_seen,
            }),
        }
    }
}
