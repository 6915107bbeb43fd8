//! # 载荷信封模块
//!
//! 秘密文本与可选密码在成帧之前，先封装为规范的 UTF-8 JSON 字节。
//! “未设置密码”序列化为 JSON `null`，与空字符串密码严格区分，
//! 两者在解码端因此可辨。

use serde::{Deserialize, Serialize};

use crate::error::StegoError;

/// 嵌入载体前的逻辑载荷：秘密文本 + 可选密码。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadEnvelope {
    pub secret: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl PayloadEnvelope {
    /// 构造信封。去除空白后为空的秘密文本在此被拒绝，早于任何载体操作。
    pub fn new(secret: &str, password: Option<&str>) -> Result<Self, StegoError> {
        if secret.trim().is_empty() {
            return Err(StegoError::EmptySecret);
        }
        Ok(Self {
            secret: secret.to_owned(),
            password: password.map(str::to_owned),
        })
    }

    /// 序列化为规范字节编码。
    /// JSON 自带转义，秘密文本中出现引号、花括号等结构字符也能完整往返。
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("JSON serialization of plain strings should not fail")
    }

    /// 从字节反序列化。无法解析时返回 `MalformedEnvelope`，
    /// 是否退回为旧版裸文本载荷由调用方决定。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        serde_json::from_slice(bytes).map_err(|_| StegoError::MalformedEnvelope)
    }
}
