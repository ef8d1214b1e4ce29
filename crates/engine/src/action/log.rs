//! 로그 action -- 발동한 key를 구조화 로그로 남깁니다.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use countfire_core::action::{Action, ActionContext};
use countfire_core::error::ActionError;

/// 기본 메시지
const DEFAULT_MESSAGE: &str = "threshold exceeded";

/// `kind = "log"` action
///
/// ```toml
/// [actions.notify]
/// kind = "log"
/// message = "spam source over threshold"
/// ```
pub struct LogAction {
    name: String,
    message: Option<String>,
    executed: AtomicU64,
}

impl LogAction {
    /// 준비되지 않은 action을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
            executed: AtomicU64::new(0),
        }
    }

    /// 지금까지 실행된 횟수
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }
}

impl Action for LogAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
        let message = ctx.optional_str("message")?.unwrap_or(DEFAULT_MESSAGE);
        self.message = Some(message.to_owned());
        Ok(())
    }

    fn execute(&self, key: &str) -> Result<(), ActionError> {
        let message = self
            .message
            .as_deref()
            .ok_or_else(|| ActionError::NotPrepared(self.name.clone()))?;

        info!(action = %self.name, key, "{message}");
        self.executed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
