use std::collections::{BTreeMap, BTreeSet};

/// A key can map to many values. Iteration order is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiMap<K, V> {
    map: BTreeMap<K, BTreeSet<V>>,
}

impl<K, V> MultiMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    pub fn new() -> MultiMap<K, V> {
        MultiMap {
            map: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.entry(key).or_insert_with(BTreeSet::new).insert(value);
    }

    pub fn consume(self) -> BTreeMap<K, BTreeSet<V>> {
        self.map
    }
}

impl<K, V> Default for MultiMap<K, V>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    fn default() -> Self {
        MultiMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multimap() {
        let mut m: MultiMap<usize, &str> = MultiMap::new();
        m.insert(1, "b");
        m.insert(1, "a");
        m.insert(2, "c");
        let groups = m.consume();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&1].iter().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(groups[&2].iter().cloned().collect::<Vec<_>>(), vec!["c"]);
    }
}
