use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{IndexError, Result};
use crate::hamming::HashValue;
use crate::matcher::Threshold;
use crate::store::HashStore;

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub id: String,
    pub distance: u32,
}

/// 在库中搜索与 `reference` 距离不超过 `threshold` 的图片
///
/// 结果按标识升序排列。参照哈希本身在库中时也会出现在结果里（距离为 0）。
pub fn find_similar(
    store: &HashStore,
    reference: &HashValue,
    threshold: Threshold,
) -> Result<Vec<Neighbor>> {
    let mut result = vec![];
    for (id, hash) in store {
        let distance = reference.distance(hash)?;
        if distance <= threshold.get() {
            result.push(Neighbor { id: id.to_owned(), distance });
        }
    }
    Ok(result)
}

/// 以库中已有图片作为参照进行搜索
pub fn find_similar_to(store: &HashStore, id: &str, threshold: Threshold) -> Result<Vec<Neighbor>> {
    let reference = store.get(id).ok_or_else(|| IndexError::UnknownIdentifier(id.to_owned()))?;
    find_similar(store, reference, threshold)
}

/// 同时使用多个参照哈希搜索，例如同一张图片旋转后的各个哈希
///
/// 同一图片被多个参照命中时只保留最小距离，结果按标识升序排列。
pub fn find_similar_any(
    store: &HashStore,
    references: &[HashValue],
    threshold: Threshold,
) -> Result<Vec<Neighbor>> {
    let mut best = BTreeMap::<String, u32>::new();
    for reference in references {
        for n in find_similar(store, reference, threshold)? {
            best.entry(n.id).and_modify(|d| *d = (*d).min(n.distance)).or_insert(n.distance);
        }
    }
    Ok(best.into_iter().map(|(id, distance)| Neighbor { id, distance }).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> HashStore {
        [
            ("d.jpg", HashValue::from_u64(0b0000)),
            ("b.jpg", HashValue::from_u64(0b0001)),
            ("a.jpg", HashValue::from_u64(0b0111)),
            ("c.jpg", HashValue::from_u64(0b1111_0000)),
        ]
        .into_iter()
        .collect()
    }

    fn ids(result: &[Neighbor]) -> Vec<&str> {
        result.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_find_similar_sorted() {
        let store = sample_store();
        let result = find_similar(&store, &HashValue::from_u64(0), Threshold::from(3)).unwrap();
        assert_eq!(ids(&result), ["a.jpg", "b.jpg", "d.jpg"]);
        assert_eq!(result[0].distance, 3);
        assert_eq!(result[2].distance, 0);
    }

    #[test]
    fn test_reference_matches_itself() {
        let store = sample_store();
        let reference = store.get("c.jpg").unwrap().clone();
        let result = find_similar(&store, &reference, Threshold::EXACT).unwrap();
        assert_eq!(ids(&result), ["c.jpg"]);
    }

    #[test]
    fn test_reference_not_in_store() {
        let store = sample_store();
        let result =
            find_similar(&store, &HashValue::from_u64(u64::MAX), Threshold::from(10)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store = HashStore::new();
        for t in [0, 10, 64, 1000] {
            let result = find_similar(&store, &HashValue::from_u64(42), Threshold::from(t)).unwrap();
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_find_similar_to() {
        let store = sample_store();
        let result = find_similar_to(&store, "b.jpg", Threshold::from(1)).unwrap();
        assert_eq!(ids(&result), ["b.jpg", "d.jpg"]);
        assert_eq!(
            find_similar_to(&store, "missing.jpg", Threshold::from(1)),
            Err(IndexError::UnknownIdentifier("missing.jpg".to_string()))
        );
    }

    #[test]
    fn test_width_mismatch() {
        let store = sample_store();
        let reference = HashValue::from_bytes(&[0; 4], 32).unwrap();
        assert!(matches!(
            find_similar(&store, &reference, Threshold::from(1)),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_find_similar_any() {
        let store = sample_store();
        let references = [HashValue::from_u64(0b1111_0001), HashValue::from_u64(0b0011)];
        let result = find_similar_any(&store, &references, Threshold::from(1)).unwrap();
        assert_eq!(ids(&result), ["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(result[1].distance, 1);
        assert_eq!(result[2].distance, 1);

        // b.jpg 与两个参照的距离分别为 4 和 1，取较小值
        let result = find_similar_any(&store, &references, Threshold::from(4)).unwrap();
        let b = result.iter().find(|n| n.id == "b.jpg").unwrap();
        assert_eq!(b.distance, 1);

        assert!(find_similar_any(&store, &[], Threshold::from(64)).unwrap().is_empty());
    }
}
