use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{IndexError, Result};

/// 计算两组等长 u64 的汉明距离
#[inline(always)]
pub fn hamming(va: &[u64], vb: &[u64]) -> u32 {
    debug_assert_eq!(va.len(), vb.len());
    va.iter().zip(vb).map(|(a, b)| (a ^ b).count_ones()).sum()
}

/// 固定位宽的感知哈希
///
/// 内部按小端序将字节打包为 u64，超出位宽的比特始终为 0，
/// 因此相同位宽的两个哈希可以直接逐字异或比较。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HashValue {
    width: u32,
    words: SmallVec<[u64; 4]>,
}

impl HashValue {
    /// 从字节构造哈希，`width` 为有效比特数
    ///
    /// 字节数必须为 `ceil(width / 8)`，多余的高位比特会被清零。
    pub fn from_bytes(bytes: &[u8], width: u32) -> Result<Self> {
        if width == 0 {
            return Err(IndexError::InvalidHash("位宽不能为 0".to_string()));
        }
        let expected = width.div_ceil(8) as usize;
        if bytes.len() != expected {
            return Err(IndexError::InvalidHash(format!(
                "{} 位哈希需要 {} 字节，实际为 {} 字节",
                width,
                expected,
                bytes.len()
            )));
        }

        let mut words = SmallVec::with_capacity(expected.div_ceil(8));
        for chunk in bytes.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            words.push(u64::from_le_bytes(buf));
        }

        let tail = width % 64;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }

        Ok(Self { width, words })
    }

    pub fn from_u64(value: u64) -> Self {
        Self { width: 64, words: SmallVec::from_slice(&[value]) }
    }

    /// 有效比特数
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// 置位比特的数量
    pub fn popcount(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.width.div_ceil(8) as usize;
        let mut bytes = self.words.iter().flat_map(|w| w.to_le_bytes()).collect::<Vec<_>>();
        bytes.truncate(len);
        bytes
    }

    /// 计算汉明距离，位宽不同时返回 [`IndexError::DimensionMismatch`]
    pub fn distance(&self, other: &Self) -> Result<u32> {
        if self.width != other.width {
            return Err(IndexError::DimensionMismatch { expected: self.width, got: other.width });
        }
        Ok(hamming(&self.words, &other.words))
    }

    /// 以新的位宽重新解释同一组字节，字节数必须一致
    ///
    /// 十六进制形式只保留字节，解析后位宽总是 8 的倍数，需要借此还原真实位宽。
    pub fn with_width(&self, width: u32) -> Result<Self> {
        Self::from_bytes(&self.to_bytes(), width)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({}/{})", self, self.width)
    }
}

/// 从十六进制字符串解析，位宽为字节数 * 8
impl FromStr for HashValue {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || !s.is_ascii() || s.len() % 2 != 0 {
            return Err(IndexError::InvalidHash(s.to_string()));
        }
        let bytes = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| IndexError::InvalidHash(s.to_string()))?;
        Self::from_bytes(&bytes, bytes.len() as u32 * 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_identical() {
        let a = HashValue::from_u64(0xdead_beef);
        assert_eq!(a.distance(&a).unwrap(), 0);
    }

    #[test]
    fn test_hamming_all_different() {
        let a = HashValue::from_u64(0);
        let b = HashValue::from_u64(u64::MAX);
        assert_eq!(a.distance(&b).unwrap(), 64);
        assert_eq!(b.distance(&a).unwrap(), 64);
    }

    #[test]
    fn test_hamming_wide() {
        let a = HashValue::from_bytes(&[0u8; 32], 256).unwrap();
        let b = HashValue::from_bytes(&[255u8; 32], 256).unwrap();
        assert_eq!(a.distance(&b).unwrap(), 256);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = HashValue::from_u64(0);
        let b = HashValue::from_bytes(&[0u8; 4], 32).unwrap();
        assert_eq!(a.distance(&b), Err(IndexError::DimensionMismatch { expected: 64, got: 32 }));
    }

    #[test]
    fn test_tail_bits_are_masked() {
        // 12 位哈希，第二个字节只有低 4 位有效
        let a = HashValue::from_bytes(&[0xff, 0xff], 12).unwrap();
        let b = HashValue::from_bytes(&[0xff, 0x0f], 12).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.popcount(), 12);
        assert_eq!(a.to_bytes(), vec![0xff, 0x0f]);
    }

    #[test]
    fn test_wrong_byte_count() {
        assert!(matches!(HashValue::from_bytes(&[0; 7], 64), Err(IndexError::InvalidHash(_))));
        assert!(matches!(HashValue::from_bytes(&[], 0), Err(IndexError::InvalidHash(_))));
    }

    #[test]
    fn test_hex() {
        let h: HashValue = "0123456789abcdef".parse().unwrap();
        assert_eq!(h.width(), 64);
        assert_eq!(h.to_string(), "0123456789abcdef");
        assert!("xyz0".parse::<HashValue>().is_err());
        assert!("abc".parse::<HashValue>().is_err());
    }

    #[test]
    fn test_with_width() {
        let h: HashValue = "ffffffff".parse().unwrap();
        assert_eq!(h.width(), 32);
        let h = h.with_width(25).unwrap();
        assert_eq!(h.width(), 25);
        assert_eq!(h.popcount(), 25);
        assert_eq!(h.to_string(), "ffffff01");
        assert!(matches!(h.with_width(64), Err(IndexError::InvalidHash(_))));
    }
}
