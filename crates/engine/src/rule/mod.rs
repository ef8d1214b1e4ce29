//! 임계값 규칙 엔진 -- 카운트 평가 및 action 발동
//!
//! [`RuleSet`]은 순서 있는 [`ThresholdRule`] 목록과 공유 [`Action`] 하나를 묶습니다.
//! 카운터의 각 key에 대해 규칙을 삽입 순서대로 평가하고, 첫 번째로 만족하는
//! 규칙에서 평가를 멈춘 뒤 해당 key로 action을 한 번 실행합니다.
//!
//! # 아키텍처
//! - [`RuleSet`]: 규칙 평가 및 발동
//! - [`binding`]: 설정의 `[[rules]]` 항목을 RuleSet + 대상 카운터로 변환
//! - [`types`]: 비교 연산자와 규칙 데이터 구조

pub mod binding;
pub mod types;

pub use binding::RuleBinding;
pub use types::{Comparator, ThresholdRule};

use std::sync::Arc;

use tracing::{debug, info};

use countfire_core::action::Action;
use countfire_core::error::ActionError;

use crate::counter::Counter;

/// 규칙 집합 -- 하나의 action에 바인딩된 임계값 규칙들
///
/// action은 공유 참조로 보관하며 수명을 관리하지 않습니다.
pub struct RuleSet {
    /// 평가 순서 = 삽입 순서
    rules: Vec<ThresholdRule>,
    /// 발동 시 실행할 action
    action: Arc<dyn Action>,
}

impl RuleSet {
    /// 빈 규칙 집합을 생성합니다.
    pub fn new(action: Arc<dyn Action>) -> Self {
        Self {
            rules: Vec::new(),
            action,
        }
    }

    /// 규칙을 추가합니다.
    pub fn add_rule(&mut self, op: Comparator, threshold: u64) {
        self.rules.push(ThresholdRule::new(op, threshold));
    }

    /// 규칙을 추가하고 자신을 반환합니다.
    pub fn with_rule(mut self, op: Comparator, threshold: u64) -> Self {
        self.add_rule(op, threshold);
        self
    }

    /// 현재 규칙 목록
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 바인딩된 action 이름
    pub fn action_name(&self) -> &str {
        self.action.name()
    }

    /// 값이 규칙 중 하나라도 만족하는지 평가합니다.
    ///
    /// 삽입 순서대로 평가하며 첫 번째로 만족하는 규칙에서 `true`를 반환합니다.
    pub fn evaluate(&self, value: u64) -> bool {
        for rule in &self.rules {
            let fired = rule.matches(value);
            debug!(
                op = %rule.op,
                value,
                threshold = rule.threshold,
                fired,
                "rule evaluated"
            );
            if fired {
                return true;
            }
        }
        false
    }

    /// 카운터의 모든 key를 평가하고, 만족하는 key마다 action을 한 번 실행합니다.
    ///
    /// 하나라도 발동했으면 `true`를 반환합니다.
    ///
    /// # Errors
    /// action 실행 에러는 잡지 않고 즉시 전파합니다.
    pub fn fire_against_counter(&self, counter: &Counter) -> Result<bool, ActionError> {
        Ok(!self.fired_keys(counter)?.is_empty())
    }

    /// [`fire_against_counter`](Self::fire_against_counter)와 같지만 발동한 key 목록을 반환합니다.
    pub fn fired_keys(&self, counter: &Counter) -> Result<Vec<String>, ActionError> {
        let mut fired = Vec::new();
        for (key, count) in counter.entries() {
            if self.evaluate(count) {
                self.action.execute(&key)?;
                info!(action = self.action.name(), key = %key, count, "action fired");
                fired.push(key);
            }
        }
        Ok(fired)
    }

    /// action을 실행하지 않고 발동 대상 key만 계산합니다 (dry-run).
    pub fn matching_keys(&self, counter: &Counter) -> Vec<(String, u64)> {
        counter
            .sorted_entries()
            .into_iter()
            .filter(|(_, count)| self.evaluate(*count))
            .collect()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules)
            .field("action", &self.action.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use countfire_core::action::ActionContext;

    use super::*;

    /// 실행된 key를 기록하는 테스트용 action
    #[derive(Default)]
    struct RecordingAction {
        keys: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingAction {
        fn keys(&self) -> Vec<String> {
            self.keys.lock().unwrap().clone()
        }
    }

    impl Action for RecordingAction {
        fn name(&self) -> &str {
            "recording"
        }

        fn prepare(&mut self, _ctx: &ActionContext<'_>) -> Result<(), ActionError> {
            Ok(())
        }

        fn execute(&self, key: &str) -> Result<(), ActionError> {
            if self.fail_on.as_deref() == Some(key) {
                return Err(ActionError::Execute {
                    name: "recording".to_owned(),
                    key: key.to_owned(),
                    reason: "boom".to_owned(),
                });
            }
            self.keys.lock().unwrap().push(key.to_owned());
            Ok(())
        }
    }

    fn counter(entries: &[(&str, u64)]) -> Counter {
        let mut counter = Counter::new();
        for (key, n) in entries {
            for _ in 0..*n {
                counter.increment(key);
            }
        }
        counter
    }

    #[test]
    fn evaluate_greater_than_five() {
        let rules = RuleSet::new(Arc::new(RecordingAction::default())).with_rule(Comparator::Gt, 5);
        assert!(rules.evaluate(6));
        assert!(!rules.evaluate(5));
    }

    #[test]
    fn empty_ruleset_never_fires() {
        let rules = RuleSet::new(Arc::new(RecordingAction::default()));
        assert!(rules.is_empty());
        assert!(!rules.evaluate(0));
        assert!(!rules.evaluate(u64::MAX));
    }

    #[test]
    fn any_rule_in_order_fires() {
        let rules = RuleSet::new(Arc::new(RecordingAction::default()))
            .with_rule(Comparator::Eq, 1)
            .with_rule(Comparator::Ge, 10);
        assert!(rules.evaluate(1));
        assert!(rules.evaluate(12));
        assert!(!rules.evaluate(5));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn fires_once_for_qualifying_key() {
        let action = Arc::new(RecordingAction::default());
        let rules = RuleSet::new(action.clone()).with_rule(Comparator::Gt, 5);

        let fired = rules
            .fire_against_counter(&counter(&[("1.2.3.4", 6), ("5.6.7.8", 2)]))
            .unwrap();

        assert!(fired);
        assert_eq!(action.keys(), vec!["1.2.3.4".to_owned()]);
    }

    #[test]
    fn no_qualifying_key_means_no_call() {
        let action = Arc::new(RecordingAction::default());
        let rules = RuleSet::new(action.clone()).with_rule(Comparator::Gt, 5);

        let fired = rules
            .fire_against_counter(&counter(&[("1.2.3.4", 2)]))
            .unwrap();

        assert!(!fired);
        assert!(action.keys().is_empty());
    }

    #[test]
    fn first_matching_rule_fires_key_only_once() {
        let action = Arc::new(RecordingAction::default());
        let rules = RuleSet::new(action.clone())
            .with_rule(Comparator::Gt, 1)
            .with_rule(Comparator::Gt, 2);

        rules.fire_against_counter(&counter(&[("k", 3)])).unwrap();
        assert_eq!(action.keys(), vec!["k".to_owned()]);
    }

    #[test]
    fn action_error_propagates() {
        let action = Arc::new(RecordingAction {
            fail_on: Some("bad".to_owned()),
            ..Default::default()
        });
        let rules = RuleSet::new(action).with_rule(Comparator::Ge, 1);

        let err = rules
            .fire_against_counter(&counter(&[("bad", 1)]))
            .unwrap_err();
        assert!(matches!(err, ActionError::Execute { .. }));
    }

    #[test]
    fn matching_keys_does_not_execute() {
        let action = Arc::new(RecordingAction::default());
        let rules = RuleSet::new(action.clone()).with_rule(Comparator::Ge, 2);

        let keys = rules.matching_keys(&counter(&[("a", 3), ("b", 1), ("c", 2)]));
        assert_eq!(keys, vec![("a".to_owned(), 3), ("c".to_owned(), 2)]);
        assert!(action.keys().is_empty());
    }

    #[test]
    fn debug_shows_action_name() {
        let rules = RuleSet::new(Arc::new(RecordingAction::default())).with_rule(Comparator::Lt, 1);
        let text = format!("{rules:?}");
        assert!(text.contains("recording"));
    }
}
