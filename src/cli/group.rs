use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::{info, warn};
use tokio::task::spawn_blocking;

use crate::cli::SubCommandExtend;
use crate::cluster::{CancelToken, ClusterBuilder};
use crate::config::{Opts, SearchOptions};
use crate::db::{self, init_db};
use crate::report::print_groups;
use crate::utils::pb_style;

fn default_batch_size() -> usize {
    num_cpus::get() * 256
}

#[derive(Parser, Debug, Clone)]
pub struct GroupCommand {
    #[command(flatten)]
    pub search: SearchOptions,
    /// 每批并行比较的图片数量，每批结束后检查一次是否被中断
    #[arg(long, value_name = "SIZE", default_value_t = default_batch_size())]
    pub batch_size: usize,
}

impl SubCommandExtend for GroupCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = init_db(opts.conf_dir.database()).await?;
        let store = db::load_store(&db).await?;
        info!("正在对 {} 张图片分组，最大距离 {}", store.len(), self.search.distance);

        let pb = ProgressBar::new(store.len() as u64).with_style(pb_style());
        let token = CancelToken::new();

        // Ctrl-C 只设置取消标记，当前批次完成后退出
        let ctrl_c = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("收到中断信号，正在停止");
                    token.cancel();
                }
            }
        });

        let builder = ClusterBuilder::new(self.search.distance)
            .batch_size(self.batch_size)
            .cancel_token(token)
            .progress(pb.clone());
        let groups = spawn_blocking(move || builder.run(&store)).await?;
        ctrl_c.abort();
        pb.finish_and_clear();
        let groups = groups?;

        info!("共 {} 个分组", groups.len());
        print_groups(&groups, self.search.output_format)
    }
}
