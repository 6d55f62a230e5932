use thiserror::Error;

/// 索引与聚类过程中可能出现的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// 比较了位宽不同的两个哈希
    #[error("哈希位宽不一致: 期望 {expected} 位，实际 {got} 位")]
    DimensionMismatch { expected: u32, got: u32 },

    #[error("无效的距离阈值: {0}")]
    InvalidThreshold(i64),

    #[error("图片不存在: {0}")]
    UnknownIdentifier(String),

    #[error("无效的哈希值: {0}")]
    InvalidHash(String),

    #[error("操作已取消")]
    Cancelled,
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;
