use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;

use crate::error::{IndexError, Result};
use crate::hamming::{HashValue, hamming};
use crate::matcher::Threshold;
use crate::store::HashStore;

/// 一组相似图片，成员按标识升序排列
pub type Group = Vec<String>;

/// 并查集，按秩合并 + 路径压缩
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // 第二遍把路径上的节点直接挂到根上
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// 合并 a 与 b 所在集合，两者原本不在同一集合时返回 true
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// 协作式取消标记，可在多个线程间共享
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// 全库聚类
///
/// 枚举所有图片对，距离不超过阈值的两张图片之间连一条边，
/// 最终输出图的连通分量。没有任何匹配的孤立图片不会出现在结果中。
///
/// 结果中每组成员按标识升序，组之间按首个成员升序，与枚举顺序无关。
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    threshold: Threshold,
    batch_size: usize,
    cancel: Option<CancelToken>,
    progress: Option<ProgressBar>,
}

impl ClusterBuilder {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold, batch_size: 1024, cancel: None, progress: None }
    }

    /// 每批并行处理的行数，每批结束后检查一次取消标记
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 进度条的长度会被设置为图片总数
    pub fn progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn run(&self, store: &HashStore) -> Result<Vec<Group>> {
        // 位宽不一致说明库已损坏，直接失败
        if store.width()?.is_none() {
            return Ok(vec![]);
        }

        let instant = Instant::now();
        let (ids, hashes): (Vec<&str>, Vec<&HashValue>) = store.iter().unzip();
        let n = ids.len();

        // 按 popcount 排序后，|pc(a) - pc(b)| 是距离的下界，
        // 内层扫描一旦差值超过阈值即可提前结束
        let popcounts = hashes.iter().map(|h| h.popcount()).collect::<Vec<_>>();
        let mut order = (0..n).collect::<Vec<_>>();
        order.sort_unstable_by_key(|&i| (popcounts[i], i));

        if let Some(pb) = &self.progress {
            pb.set_length(n as u64);
        }

        let threshold = self.threshold.get();
        let mut uf = UnionFind::new(n);
        let mut matched = vec![false; n];
        let mut nedges = 0usize;

        let positions = (0..n).collect::<Vec<_>>();
        for rows in positions.chunks(self.batch_size) {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(IndexError::Cancelled);
            }

            let (order, popcounts, hashes) = (&order, &popcounts, &hashes);
            let edges = rows
                .par_iter()
                .flat_map_iter(move |&p| {
                    let a = order[p];
                    order[p + 1..]
                        .iter()
                        .take_while(move |&&b| popcounts[b] - popcounts[a] <= threshold)
                        .filter(move |&&b| {
                            hamming(hashes[a].words(), hashes[b].words()) <= threshold
                        })
                        .map(move |&b| (a, b))
                })
                .collect::<Vec<_>>();

            nedges += edges.len();
            for (a, b) in edges {
                uf.union(a, b);
                matched[a] = true;
                matched[b] = true;
            }

            if let Some(pb) = &self.progress {
                pb.inc(rows.len() as u64);
            }
        }

        let mut components = BTreeMap::<usize, Group>::new();
        for i in (0..n).filter(|&i| matched[i]) {
            components.entry(uf.find(i)).or_default().push(ids[i].to_owned());
        }
        let mut groups = components.into_values().collect::<Vec<_>>();
        groups.sort_unstable_by(|a, b| a[0].cmp(&b[0]));

        debug!(
            "聚类完成: {} 张图片, {} 条边, {} 个分组, 耗时 {:.2}s",
            n,
            nedges,
            groups.len(),
            instant.elapsed().as_secs_f32()
        );

        Ok(groups)
    }
}

/// 使用默认参数对全库聚类
pub fn cluster_all(store: &HashStore, threshold: Threshold) -> Result<Vec<Group>> {
    ClusterBuilder::new(threshold).run(store)
}
