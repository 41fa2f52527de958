//! 内容指纹 - 规范化内容的 SHA-256 摘要

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// 固定长度的内容摘要，只用于相等比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 32]);

impl ContentFingerprint {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// 前 12 位十六进制，用于状态输出
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 计算内容指纹（UTF-8 字节上的 SHA-256）
pub fn fingerprint(content: &str) -> ContentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    ContentFingerprint(hasher.finalize().into())
}
