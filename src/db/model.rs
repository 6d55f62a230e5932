use sqlx::FromRow;

/// 图片记录
#[derive(Debug, FromRow)]
pub struct ImageRecord {
    /// 图片标识，通常为路径
    pub id: String,
    /// 感知哈希的字节表示
    pub hash: Vec<u8>,
    /// 哈希的有效位数
    pub width: i64,
}

/// 元数据键
pub const META_HASH_KIND: &str = "hash_kind";
