mod add;
mod group;
mod hash;
mod search;

pub use add::*;
pub use group::*;
pub use hash::*;
pub use search::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
