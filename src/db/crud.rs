use sqlx::{Executor, Result, Sqlite, SqlitePool};

use super::{ImageRecord, META_HASH_KIND};
use crate::hamming::HashValue;
use crate::store::HashStore;

/// 添加或覆盖图片记录
pub async fn upsert_image<'c, E>(executor: E, id: &str, hash: &HashValue) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO image (id, hash, width)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET hash = excluded.hash, width = excluded.width
        "#,
    )
    .bind(id)
    .bind(hash.to_bytes())
    .bind(hash.width() as i64)
    .execute(executor)
    .await?;

    Ok(())
}

/// 检查图片是否已添加
pub async fn image_exists(executor: &SqlitePool, id: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM image WHERE id = ?")
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(count > 0)
}

pub async fn count_images(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM image").fetch_one(executor).await
}

/// 读取全部图片记录
pub async fn get_all_images(executor: &SqlitePool) -> Result<Vec<ImageRecord>> {
    sqlx::query_as::<_, ImageRecord>("SELECT id, hash, width FROM image ORDER BY id")
        .fetch_all(executor)
        .await
}

/// 将数据库中的全部记录载入内存
pub async fn load_store(executor: &SqlitePool) -> anyhow::Result<HashStore> {
    let mut store = HashStore::new();
    for record in get_all_images(executor).await? {
        let hash = HashValue::from_bytes(&record.hash, record.width as u32)?;
        store.insert(record.id, hash);
    }
    Ok(store)
}

/// 在一个事务中写入全部记录
pub async fn save_store(executor: &SqlitePool, store: &HashStore) -> Result<()> {
    let mut tx = executor.begin().await?;
    for (id, hash) in store {
        upsert_image(&mut *tx, id, hash).await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn get_meta(executor: &SqlitePool, key: &str) -> Result<Option<String>> {
    sqlx::query_scalar("SELECT value FROM meta WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await
}

pub async fn set_meta(executor: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO meta (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;

    Ok(())
}

/// 数据库所使用的哈希类型，空库返回 `None`
pub async fn get_hash_kind(executor: &SqlitePool) -> Result<Option<String>> {
    get_meta(executor, META_HASH_KIND).await
}

pub async fn set_hash_kind(executor: &SqlitePool, kind: &str) -> Result<()> {
    set_meta(executor, META_HASH_KIND, kind).await
}
