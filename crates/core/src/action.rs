//! Action trait -- 임계값을 넘은 key에 대해 실행되는 외부 효과
//!
//! 엔진은 [`Action`]을 통해서만 외부 세계와 상호작용합니다.
//! 구현체(파일 기록, 알림, DB 삽입 등)는 상속 없이 이 trait만 구현하면 됩니다.
//!
//! # 수명
//! 1. `prepare`: 설정 섹션을 읽고 필요한 리소스(파일, 연결 등)를 획득합니다.
//!    설정 누락이나 리소스 획득 실패는 치명적 에러입니다.
//! 2. `execute`: 조건을 만족한 key 하나당 한 번씩 호출됩니다.
//! 3. drop: 실행이 끝나면 어떤 경로로든 리소스가 해제됩니다.

use crate::config::CountfireConfig;
use crate::error::ActionError;

/// 규칙이 발동했을 때 실행되는 capability
///
/// 같은 action을 여러 규칙이 공유하므로 `execute`는 `&self`를 받습니다.
/// 상태가 필요한 구현체는 내부 가변성을 사용합니다.
pub trait Action: Send + Sync {
    /// action 이름 (설정 섹션 이름)
    fn name(&self) -> &str;

    /// 설정 섹션을 읽고 리소스를 준비합니다.
    fn prepare(&mut self, ctx: &ActionContext<'_>) -> Result<(), ActionError>;

    /// key 하나에 대해 외부 효과를 수행합니다.
    fn execute(&self, key: &str) -> Result<(), ActionError>;
}

/// `prepare`에 전달되는 설정 컨텍스트
///
/// 로드된 설정과 `[actions.<section>]` 섹션 이름을 묶습니다.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    config: &'a CountfireConfig,
    section: &'a str,
}

impl<'a> ActionContext<'a> {
    /// 새 컨텍스트를 생성합니다.
    pub fn new(config: &'a CountfireConfig, section: &'a str) -> Self {
        Self { config, section }
    }

    /// 섹션 이름
    pub fn section_name(&self) -> &'a str {
        self.section
    }

    /// 섹션 테이블을 반환합니다. 섹션이 없으면 치명적 에러입니다.
    pub fn section(&self) -> Result<&'a toml::Table, ActionError> {
        self.config
            .actions
            .get(self.section)
            .ok_or_else(|| ActionError::MissingSection {
                section: self.section.to_owned(),
            })
    }

    /// 필수 문자열 필드를 읽습니다.
    pub fn require_str(&self, field: &str) -> Result<&'a str, ActionError> {
        self.optional_str(field)?
            .ok_or_else(|| ActionError::MissingField {
                section: self.section.to_owned(),
                field: field.to_owned(),
            })
    }

    /// 선택 문자열 필드를 읽습니다. 타입이 다르면 에러입니다.
    pub fn optional_str(&self, field: &str) -> Result<Option<&'a str>, ActionError> {
        match self.section()?.get(field) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| {
                self.invalid(field, format!("expected string, got {}", value.type_str()))
            }),
        }
    }

    /// 선택 정수 필드를 읽습니다.
    pub fn optional_integer(&self, field: &str) -> Result<Option<i64>, ActionError> {
        match self.section()?.get(field) {
            None => Ok(None),
            Some(value) => value.as_integer().map(Some).ok_or_else(|| {
                self.invalid(field, format!("expected integer, got {}", value.type_str()))
            }),
        }
    }

    fn invalid(&self, field: &str, reason: String) -> ActionError {
        ActionError::InvalidField {
            section: self.section.to_owned(),
            field: field.to_owned(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CountfireConfig {
        CountfireConfig::parse(
            r#"
[actions.mail]
kind = "log"
port = 3306
host = 42
"#,
        )
        .unwrap()
    }

    #[test]
    fn missing_section_is_fatal() {
        let config = config();
        let ctx = ActionContext::new(&config, "nope");
        assert!(matches!(
            ctx.section(),
            Err(ActionError::MissingSection { .. })
        ));
        assert!(ctx.require_str("kind").is_err());
    }

    #[test]
    fn reads_fields() {
        let config = config();
        let ctx = ActionContext::new(&config, "mail");
        assert_eq!(ctx.section_name(), "mail");
        assert_eq!(ctx.require_str("kind").unwrap(), "log");
        assert_eq!(ctx.optional_integer("port").unwrap(), Some(3306));
        assert_eq!(ctx.optional_str("user").unwrap(), None);
    }

    #[test]
    fn missing_required_field() {
        let config = config();
        let ctx = ActionContext::new(&config, "mail");
        let err = ctx.require_str("path").unwrap_err();
        assert!(matches!(err, ActionError::MissingField { ref field, .. } if field == "path"));
    }

    #[test]
    fn wrong_field_type() {
        let config = config();
        let ctx = ActionContext::new(&config, "mail");
        let err = ctx.optional_str("host").unwrap_err();
        assert!(matches!(err, ActionError::InvalidField { .. }));
        assert!(err.to_string().contains("expected string"));
    }
}
