use anyhow::Result;
use clap::Parser;

use phsearch::Opts;
use phsearch::cli::SubCommandExtend;
use phsearch::config::SubCommand;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Add(config) => config.run(&opts).await,
        SubCommand::Search(config) => config.run(&opts).await,
        SubCommand::Group(config) => config.run(&opts).await,
        SubCommand::Hash(config) => config.run(&opts).await,
    }
}
