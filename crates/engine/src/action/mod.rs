//! 기본 제공 action 및 action 레지스트리
//!
//! - [`LogAction`]: 발동한 key를 구조화 로그로 남김 (`kind = "log"`)
//! - [`AccessMapAction`]: Postfix access map 파일에 key 추가 (`kind = "access_map"`)
//!
//! [`ActionRegistry`]는 규칙이 참조하는 action을 한 번씩만 준비(prepare)하고
//! 공유 참조(`Arc<dyn Action>`)로 나눠 줍니다. 레지스트리가 drop되면
//! 마지막 참조와 함께 action의 리소스도 해제됩니다.

pub mod access_map;
pub mod log;

pub use access_map::AccessMapAction;
pub use log::LogAction;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use countfire_core::action::{Action, ActionContext};
use countfire_core::config::CountfireConfig;
use countfire_core::error::ActionError;

/// `kind` 값으로 준비되지 않은 action을 생성합니다.
pub fn build_action(name: &str, kind: &str) -> Result<Box<dyn Action>, ActionError> {
    match kind {
        "log" => Ok(Box::new(LogAction::new(name))),
        "access_map" => Ok(Box::new(AccessMapAction::new(name))),
        other => Err(ActionError::UnknownKind {
            name: name.to_owned(),
            kind: other.to_owned(),
        }),
    }
}

/// 준비된 action 모음 (이름 -> action)
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정의 모든 규칙이 참조하는 action을 준비합니다.
    ///
    /// # Errors
    /// 섹션/필드 누락, 알 수 없는 `kind`, 리소스 획득 실패는 모두 치명적입니다.
    pub fn prepare_for_rules(config: &CountfireConfig) -> Result<Self, ActionError> {
        Self::prepare_named(config, config.rules.iter().map(|rule| rule.action.as_str()))
    }

    /// 지정한 이름의 action 섹션들을 준비합니다. 중복 이름은 한 번만 준비합니다.
    pub fn prepare_named<'a>(
        config: &CountfireConfig,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ActionError> {
        let mut registry = Self::new();
        for name in names {
            if registry.contains(name) {
                continue;
            }
            let ctx = ActionContext::new(config, name);
            let kind = ctx.require_str("kind")?;
            let mut action = build_action(name, kind)?;
            action.prepare(&ctx)?;
            info!(action = name, kind, "action prepared");
            registry.register(Arc::from(action));
        }
        Ok(registry)
    }

    /// 규칙이 참조하는 action을 생성만 하고 준비하지 않습니다 (dry-run용).
    ///
    /// `kind` 검증은 수행하지만 리소스는 획득하지 않으므로, 이 레지스트리의
    /// action을 실행하면 [`ActionError::NotPrepared`]가 반환됩니다.
    pub fn unprepared_for_rules(config: &CountfireConfig) -> Result<Self, ActionError> {
        let mut registry = Self::new();
        for rule in &config.rules {
            let name = rule.action.as_str();
            if registry.contains(name) {
                continue;
            }
            let kind = ActionContext::new(config, name).require_str("kind")?;
            registry.register(Arc::from(build_action(name, kind)?));
        }
        Ok(registry)
    }

    /// 이미 준비된 action을 등록합니다. 같은 이름은 교체됩니다.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_owned(), action);
    }

    /// 이름으로 action을 찾습니다.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// 등록 여부
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// 등록된 action 수
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 등록된 action 이름 (정렬됨)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}
