use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use rayon::prelude::*;
use regex::Regex;
use tokio::task::block_in_place;
use walkdir::WalkDir;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::db::{self, init_db};
use crate::hasher::{HashAlgorithm, HashKind, ImageHasher};
use crate::store::HashStore;
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// 图片所在目录
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp,gif,bmp")]
    pub suffix: String,
    /// 在添加到数据库之前使用正则表达式对图片路径进行处理
    /// 例：--replace '/path/to/image/(?<name>[0-9]+).jpg' '$name'
    #[arg(short, long, num_args = 2, value_names = ["REGEX", "REPLACE"], verbatim_doc_comment)]
    pub replace: Vec<String>,
    /// 感知哈希算法，同一个数据库只能使用一种
    #[arg(short = 'H', long, value_enum, default_value_t = HashAlgorithm::Phash)]
    pub hash: HashAlgorithm,
    /// 哈希边长，哈希位数约为边长的平方
    #[arg(
        long,
        value_name = "N",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(2..=64)
    )]
    pub hash_size: u32,
    /// 如果图片已添加，是否覆盖旧的记录
    #[arg(long)]
    pub overwrite: bool,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let kind = HashKind { algorithm: self.hash, size: self.hash_size };
        let re_suf = suffix_regex(&self.suffix)?;
        let replace = match self.replace.as_slice() {
            [re, replace] => Some((Regex::new(re)?, replace.clone())),
            _ => None,
        };

        let db = init_db(opts.conf_dir.database()).await?;

        match db::get_hash_kind(&db).await? {
            Some(existing) if existing != kind.to_string() => {
                return Err(anyhow!("哈希算法不一致: 数据库使用 {}，当前为 {}", existing, kind));
            }
            Some(_) => {}
            None => db::set_hash_kind(&db, &kind.to_string()).await?,
        }

        info!("开始扫描目录: {}", self.path.display());
        let entries = scan_directory(&self.path, &re_suf);
        info!("扫描完成，共 {} 张图片", entries.len());

        let mut pending = vec![];
        let mut skipped = 0;
        for path in entries {
            let id = image_id(&path, replace.as_ref());
            if !self.overwrite && db::image_exists(&db, &id).await? {
                skipped += 1;
                continue;
            }
            pending.push((id, path));
        }
        if skipped > 0 {
            info!("跳过 {} 张已添加图片", skipped);
        }

        let pb = ProgressBar::new(pending.len() as u64).with_style(pb_style());
        let store = block_in_place(|| {
            pending
                .into_par_iter()
                .progress_with(pb.clone())
                .map_init(
                    || ImageHasher::new(kind),
                    |hasher, (id, path)| match hasher.hash_file(&path) {
                        Ok(hash) => Some((id, hash)),
                        Err(e) => {
                            pb.println(format!("不是图片文件: {} ({})", path.display(), e));
                            None
                        }
                    },
                )
                .flatten()
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<HashStore>()
        });

        db::save_store(&db, &store).await?;
        pb.finish_with_message("图片添加完成");
        let total = db::count_images(&db).await?;
        info!("添加 {} 张图片，数据库共 {} 张图片", store.len(), total);

        Ok(())
    }
}

/// 由逗号分隔的后缀列表构造匹配扩展名的正则，忽略大小写
fn suffix_regex(suffix: &str) -> Result<Regex> {
    let alternatives = suffix
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>();
    Ok(Regex::new(&format!("(?i)^({})$", alternatives.join("|")))?)
}

/// 递归扫描目录下后缀匹配的文件，按路径排序
fn scan_directory(path: &Path, re_suf: &Regex) -> Vec<PathBuf> {
    let mut entries = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry.path().extension().is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()))
        })
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    entries.sort();
    entries
}

/// 图片在数据库中的标识，默认为完整路径
fn image_id(path: &Path, replace: Option<&(Regex, String)>) -> String {
    let path = path.to_string_lossy();
    match replace {
        Some((re, replace)) => re.replace(&path, replace.as_str()).into_owned(),
        None => path.into_owned(),
    }
}
