use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::db::{self, init_db};
use crate::hasher::{HashAlgorithm, HashKind, ImageHasher};

#[derive(Parser, Debug, Clone)]
pub struct HashCommand {
    /// 图片路径
    pub image: PathBuf,
    /// 感知哈希算法，默认与数据库一致
    #[arg(short = 'H', long, value_enum)]
    pub hash: Option<HashAlgorithm>,
    /// 哈希边长，默认与数据库一致
    #[arg(long, value_name = "N")]
    pub hash_size: Option<u32>,
}

impl SubCommandExtend for HashCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let mut kind = HashKind::default();
        if opts.conf_dir.database().exists() {
            let db = init_db(opts.conf_dir.database()).await?;
            if let Some(existing) = db::get_hash_kind(&db).await? {
                kind = existing.parse()?;
            }
        }
        if let Some(algorithm) = self.hash {
            kind.algorithm = algorithm;
        }
        if let Some(size) = self.hash_size {
            kind.size = size;
        }

        let hash = ImageHasher::new(kind).hash_file(&self.image)?;
        println!("{}\t{}", hash, kind);
        Ok(())
    }
}
