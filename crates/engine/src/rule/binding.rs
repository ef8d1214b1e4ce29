//! 규칙 바인딩 -- RuleSet과 평가 대상 카운터 이름의 묶음

use countfire_core::config::RuleBindingConfig;

use super::{Comparator, RuleSet};
use crate::action::ActionRegistry;
use crate::error::EngineError;

/// 설정의 `[[rules]]` 항목 하나
#[derive(Debug)]
pub struct RuleBinding {
    /// 규칙 이름
    pub name: String,
    /// 평가 대상 카운팅 노드 이름
    pub counters: Vec<String>,
    /// 평가할 규칙 집합
    pub rules: RuleSet,
}

impl RuleBinding {
    /// 새 바인딩을 생성합니다.
    pub fn new(name: impl Into<String>, counters: Vec<String>, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            counters,
            rules,
        }
    }

    /// 설정과 준비된 action 레지스트리로부터 바인딩을 생성합니다.
    pub fn from_config(
        config: &RuleBindingConfig,
        registry: &ActionRegistry,
    ) -> Result<Self, EngineError> {
        let action = registry
            .get(&config.action)
            .ok_or_else(|| EngineError::UnknownAction {
                rule: config.name.clone(),
                action: config.action.clone(),
            })?;

        let mut rules = RuleSet::new(action);
        for condition in &config.conditions {
            rules.add_rule(condition.op.parse::<Comparator>()?, condition.threshold);
        }

        Ok(Self::new(config.name.clone(), config.counters.clone(), rules))
    }

    /// 설정의 모든 규칙을 바인딩으로 변환합니다.
    pub fn all_from_config(
        configs: &[RuleBindingConfig],
        registry: &ActionRegistry,
    ) -> Result<Vec<Self>, EngineError> {
        configs
            .iter()
            .map(|config| Self::from_config(config, registry))
            .collect()
    }
}
