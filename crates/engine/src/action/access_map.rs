//! Postfix access map action -- 발동한 key를 차단 목록 파일에 추가합니다.
//!
//! 파일의 각 줄은 `<key> <access>` 형식이며, `#`으로 시작하는 줄은 주석입니다.
//! 이미 파일에 있는 key는 다시 쓰지 않으므로 같은 입력으로 여러 번 실행해도 안전합니다.
//!
//! ```text
//! # reason: SPAM_DETECTED_BY_AMAVIS, datetime: 2024-09-13 11:00:02
//! 1.2.3.4 REJECT
//! ```

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info};

use countfire_core::action::{Action, ActionContext};
use countfire_core::error::ActionError;

/// 기본 access 값
const DEFAULT_ACCESS: &str = "REJECT";

/// `kind = "access_map"` action
///
/// ```toml
/// [actions.postfix_access]
/// kind = "access_map"
/// path = "/etc/postfix/access_spam"
/// access = "REJECT"
/// reason = "SPAM_DETECTED_BY_AMAVIS"
/// ```
pub struct AccessMapAction {
    name: String,
    access: String,
    reason: Option<String>,
    /// prepare에서 획득, drop 시 파일 핸들 해제
    state: Option<Mutex<AccessMapState>>,
}

struct AccessMapState {
    file: File,
    known: HashSet<String>,
}

impl AccessMapAction {
    /// 준비되지 않은 action을 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: DEFAULT_ACCESS.to_owned(),
            reason: None,
            state: None,
        }
    }

    fn prepare_error(&self, reason: String) -> ActionError {
        ActionError::Prepare {
            name: self.name.clone(),
            reason,
        }
    }

    fn execute_error(&self, key: &str, reason: impl Into<String>) -> ActionError {
        ActionError::Execute {
            name: self.name.clone(),
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}

/// 기존 파일에서 key 목록을 읽습니다. 주석과 빈 줄은 건너뜁니다.
fn existing_keys(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_owned)
        .collect()
}

impl Action for AccessMapAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, ctx: &ActionContext<'_>) -> Result<(), ActionError> {
        let path = PathBuf::from(ctx.require_str("path")?);

        if let Some(access) = ctx.optional_str("access")? {
            if access.is_empty() || access.contains(char::is_whitespace) {
                return Err(ActionError::InvalidField {
                    section: ctx.section_name().to_owned(),
                    field: "access".to_owned(),
                    reason: "must be a single non-empty word".to_owned(),
                });
            }
            self.access = access.to_owned();
        }
        self.reason = ctx.optional_str("reason")?.map(str::to_owned);

        let known = match std::fs::read_to_string(&path) {
            Ok(content) => existing_keys(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(self.prepare_error(format!("failed to read {}: {e}", path.display())));
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| self.prepare_error(format!("failed to open {}: {e}", path.display())))?;

        info!(
            action = %self.name,
            path = %path.display(),
            existing = known.len(),
            "access map opened"
        );

        self.state = Some(Mutex::new(AccessMapState { file, known }));
        Ok(())
    }

    fn execute(&self, key: &str) -> Result<(), ActionError> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| ActionError::NotPrepared(self.name.clone()))?;

        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(self.execute_error(key, "key must be a single non-empty word"));
        }

        let mut state = state
            .lock()
            .map_err(|_| self.execute_error(key, "access map state poisoned"))?;

        if state.known.contains(key) {
            debug!(action = %self.name, key, "key already present, skipping");
            return Ok(());
        }

        let mut entry = String::new();
        if let Some(ref reason) = self.reason {
            let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            entry.push_str(&format!("# reason: {reason}, datetime: {now}\n"));
        }
        entry.push_str(&format!("{key} {}\n", self.access));

        state
            .file
            .write_all(entry.as_bytes())
            .and_then(|()| state.file.flush())
            .map_err(|e| self.execute_error(key, e.to_string()))?;

        state.known.insert(key.to_owned());
        Ok(())
    }
}
