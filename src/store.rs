use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::error::{IndexError, Result};
use crate::hamming::HashValue;

/// 图片标识到哈希的映射
///
/// 标识唯一，重复插入时后写入的记录覆盖旧记录。遍历顺序为标识的升序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStore {
    records: BTreeMap<String, HashValue>,
}

impl HashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入记录，返回被覆盖的旧哈希
    pub fn insert(&mut self, id: impl Into<String>, hash: HashValue) -> Option<HashValue> {
        self.records.insert(id.into(), hash)
    }

    pub fn get(&self, id: &str) -> Option<&HashValue> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter(self.records.iter())
    }

    /// 返回所有记录的公共位宽，空库返回 `None`
    ///
    /// 库中存在不同位宽的哈希时返回 [`IndexError::DimensionMismatch`]。
    pub fn width(&self) -> Result<Option<u32>> {
        let mut iter = self.records.values();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        let expected = first.width();
        for hash in iter {
            if hash.width() != expected {
                return Err(IndexError::DimensionMismatch { expected, got: hash.width() });
            }
        }
        Ok(Some(expected))
    }
}

pub struct Iter<'a>(btree_map::Iter<'a, String, HashValue>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a HashValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a HashStore {
    type Item = (&'a str, &'a HashValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Into<String>> Extend<(S, HashValue)> for HashStore {
    fn extend<T: IntoIterator<Item = (S, HashValue)>>(&mut self, iter: T) {
        for (id, hash) in iter {
            self.insert(id, hash);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, HashValue)> for HashStore {
    fn from_iter<T: IntoIterator<Item = (S, HashValue)>>(iter: T) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
