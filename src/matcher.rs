use std::fmt;

use crate::error::{IndexError, Result};
use crate::hamming::HashValue;

/// 汉明距离阈值，保证非负
///
/// 阈值大于等于哈希位宽时任意两个哈希都会匹配，这是合法的。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Threshold(u32);

impl Threshold {
    /// 仅匹配完全相同的哈希
    pub const EXACT: Threshold = Threshold(0);

    pub fn new(value: i64) -> Result<Self> {
        u32::try_from(value).map(Self).map_err(|_| IndexError::InvalidThreshold(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Threshold {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 两个哈希的距离是否在阈值内
#[inline]
pub fn is_match(a: &HashValue, b: &HashValue, threshold: Threshold) -> Result<bool> {
    Ok(a.distance(b)? <= threshold.get())
}
