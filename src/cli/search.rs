use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use log::debug;
use tokio::task::block_in_place;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, SearchOptions};
use crate::db::{self, init_db};
use crate::hamming::HashValue;
use crate::hasher::{HashKind, ImageHasher, load_image};
use crate::query::{find_similar, find_similar_any, find_similar_to};
use crate::report::print_neighbors;

#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("reference").required(true).args(["image", "hash", "id"])))]
pub struct SearchCommand {
    #[command(flatten)]
    pub search: SearchOptions,
    /// 作为参照的图片路径，旋转 90/180/270 度后的副本同样会被找到
    pub image: Option<PathBuf>,
    /// 使用十六进制哈希作为参照
    #[arg(long, value_name = "HEX")]
    pub hash: Option<String>,
    /// 使用数据库中已有的图片作为参照
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = init_db(opts.conf_dir.database()).await?;
        let store = db::load_store(&db).await?;
        debug!("载入 {} 条记录", store.len());

        let threshold = self.search.distance;
        let result = if let Some(image) = &self.image {
            let kind = match db::get_hash_kind(&db).await? {
                Some(kind) => kind.parse()?,
                None => HashKind::default(),
            };
            let references = block_in_place(|| {
                let image = load_image(image)?;
                ImageHasher::new(kind).hash_rotations(&image)
            })?;
            debug!("参照图片哈希: {:?}", references);
            find_similar_any(&store, &references, threshold)?
        } else if let Some(hash) = &self.hash {
            let mut reference = hash.parse::<HashValue>()?;
            // 十六进制只能表示整字节，按库中的位宽还原
            if let Some(width) = store.width()? {
                if width != reference.width() && width.div_ceil(8) == reference.width() / 8 {
                    reference = reference.with_width(width)?;
                }
            }
            find_similar(&store, &reference, threshold)?
        } else if let Some(id) = &self.id {
            find_similar_to(&store, id, threshold)?
        } else {
            unreachable!()
        };

        print_neighbors(&result, self.search.output_format)
    }
}
