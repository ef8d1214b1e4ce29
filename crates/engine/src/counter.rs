//! key 발생 횟수 카운터
//!
//! 각 [`Counter`]는 자신을 소유한 파서 노드 하나에만 속합니다.
//! 저장소는 인스턴스마다 새로 만들어지며 다른 인스턴스와 공유되지 않습니다.

use std::collections::HashMap;

use serde::Serialize;

/// key -> 발생 횟수 매핑
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
    counts: HashMap<String, u64>,
}

impl Counter {
    /// 빈 카운터를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// key의 카운트를 1 증가시킵니다. 처음 보는 key는 1이 됩니다.
    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_owned(), 1);
            }
        }
    }

    /// key의 현재 카운트 (없으면 0)
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// 서로 다른 key 수
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 모든 카운트의 합
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// (key, count) 스냅샷. 순서는 정해져 있지 않습니다.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }

    /// 진단 출력용 스냅샷: count 내림차순, 같으면 key 오름차순
    pub fn sorted_entries(&self) -> Vec<(String, u64)> {
        let mut entries = self.entries();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_counter_is_empty() {
        let counter = Counter::new();
        assert!(counter.is_empty());
        assert_eq!(counter.total(), 0);
        assert_eq!(counter.get("anything"), 0);
    }

    #[test]
    fn increment_initializes_then_adds() {
        let mut counter = Counter::new();
        counter.increment("1.2.3.4");
        assert_eq!(counter.get("1.2.3.4"), 1);
        counter.increment("1.2.3.4");
        counter.increment("1.2.3.4");
        assert_eq!(counter.get("1.2.3.4"), 3);
        assert_eq!(counter.len(), 1);
    }

    #[test]
    fn counters_do_not_share_state() {
        let mut a = Counter::new();
        let b = Counter::new();
        a.increment("k");
        assert_eq!(a.get("k"), 1);
        assert_eq!(b.get("k"), 0);
        assert!(b.is_empty());
    }

    #[test]
    fn entries_are_exhaustive_and_stable() {
        let mut counter = Counter::new();
        for key in ["a", "b", "a", "c", "a", "b"] {
            counter.increment(key);
        }
        let mut first = counter.entries();
        let mut second = counter.entries();
        first.sort();
        second.sort();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                ("a".to_owned(), 3),
                ("b".to_owned(), 2),
                ("c".to_owned(), 1)
            ]
        );
        assert_eq!(counter.total(), 6);
    }

    #[test]
    fn sorted_entries_by_count_desc_then_key_asc() {
        let mut counter = Counter::new();
        for key in ["z", "y", "y", "x", "x", "w"] {
            counter.increment(key);
        }
        let sorted = counter.sorted_entries();
        let keys: Vec<&str> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["x", "y", "w", "z"]);
    }

    #[test]
    fn empty_key_is_counted() {
        let mut counter = Counter::new();
        counter.increment("");
        assert_eq!(counter.get(""), 1);
    }
}
