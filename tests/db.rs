use anyhow::Result;
use phsearch::db::{self, init_db};
use phsearch::{HashStore, HashValue, Threshold, cluster_all};
use tempfile::TempDir;

#[tokio::test]
async fn test_store_persistence() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("conf").join("phsearch.db");

    let mut store = HashStore::new();
    store.insert("a.jpg", HashValue::from_u64(0));
    store.insert("b.jpg", HashValue::from_u64(1));
    store.insert("c.jpg", HashValue::from_bytes(&[0xff, 0x0f], 12)?);

    {
        let pool = init_db(&path).await?;
        db::save_store(&pool, &store).await?;
        assert!(db::image_exists(&pool, "a.jpg").await?);
        assert!(!db::image_exists(&pool, "z.jpg").await?);
        pool.close().await;
    }

    let pool = init_db(&path).await?;
    assert_eq!(db::load_store(&pool).await?, store);

    // 重复写入同一标识时覆盖旧记录
    db::upsert_image(&pool, "a.jpg", &HashValue::from_u64(u64::MAX)).await?;
    let loaded = db::load_store(&pool).await?;
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.get("a.jpg"), Some(&HashValue::from_u64(u64::MAX)));
    assert_eq!(db::count_images(&pool).await?, 3);

    // 库中混有不同位宽时聚类直接失败
    assert!(cluster_all(&loaded, Threshold::from(1)).is_err());

    Ok(())
}

#[tokio::test]
async fn test_hash_kind_meta() -> Result<()> {
    let dir = TempDir::new()?;
    let pool = init_db(dir.path().join("phsearch.db")).await?;

    assert_eq!(db::get_hash_kind(&pool).await?, None);
    db::set_hash_kind(&pool, "phash:8").await?;
    db::set_hash_kind(&pool, "mean:8").await?;
    assert_eq!(db::get_hash_kind(&pool).await?.as_deref(), Some("mean:8"));

    Ok(())
}
