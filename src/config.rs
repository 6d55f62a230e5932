use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::matcher::Threshold;
use crate::report::OutputFormat;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "phsearch", "phsearch").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 两张图片允许的最大汉明距离，0 表示哈希完全相同
    #[arg(
        short = 'd',
        long,
        value_name = "N",
        default_value = "0",
        allow_negative_numbers = true,
        value_parser = parse_threshold
    )]
    pub distance: Threshold,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "phsearch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// phsearch 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 计算目录中图片的感知哈希并添加到数据库
    Add(AddCommand),
    /// 搜索与参照图片相似的图片
    Search(SearchCommand),
    /// 将整个数据库中的相似图片分组
    Group(GroupCommand),
    /// 计算并显示一张图片的感知哈希
    Hash(HashCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("phsearch.db")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

fn parse_threshold(s: &str) -> anyhow::Result<Threshold> {
    let value: i64 = s.trim().parse()?;
    Ok(Threshold::new(value)?)
}
