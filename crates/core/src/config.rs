//! 설정 관리 -- countfire.toml 파싱 및 런타임 설정
//!
//! [`CountfireConfig`]는 파서 트리, 임계값 규칙, action 섹션을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`COUNTFIRE_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`countfire.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), countfire_core::error::CountfireError> {
//! use countfire_core::config::CountfireConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CountfireConfig::load("countfire.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CountfireConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CountfireError};

/// countfire 통합 설정
///
/// `countfire.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountfireConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 파서 트리 루트 (없으면 amavis 프리셋 사용)
    #[serde(default)]
    pub parser: Option<ParserNodeConfig>,
    /// 임계값 규칙 목록
    #[serde(default)]
    pub rules: Vec<RuleBindingConfig>,
    /// action 설정 섹션 (섹션 이름 -> 원시 테이블)
    #[serde(default)]
    pub actions: BTreeMap<String, toml::Table>,
}

impl CountfireConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CountfireError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CountfireError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CountfireError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CountfireError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CountfireError> {
        toml::from_str(toml_str).map_err(|e| {
            CountfireError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `COUNTFIRE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "COUNTFIRE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "COUNTFIRE_GENERAL_LOG_FORMAT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CountfireError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if let Some(ref root) = self.parser {
            root.validate("parser")?;
        }

        for (idx, rule) in self.rules.iter().enumerate() {
            let field = format!("rules[{idx}]");
            if rule.name.is_empty() {
                return Err(invalid(&format!("{field}.name"), "must not be empty"));
            }
            if rule.counters.is_empty() {
                return Err(invalid(
                    &format!("{field}.counters"),
                    "at least one counter is required",
                ));
            }
            if rule.conditions.is_empty() {
                return Err(invalid(
                    &format!("{field}.conditions"),
                    "at least one condition is required",
                ));
            }
            if !self.actions.contains_key(&rule.action) {
                return Err(invalid(
                    &format!("{field}.action"),
                    format!("no [actions.{}] section defined", rule.action),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CountfireError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 파서 노드 설정
///
/// 패턴은 정확히 두 개의 캡처 그룹(key, rest)을 가져야 합니다.
/// 컴파일과 그룹 수 검증은 엔진이 트리를 만들 때 수행합니다.
///
/// ```toml
/// [parser]
/// name = "timestamp"
/// pattern = '(.+ [0-9]+ [0-9]{2}:[0-9]{2}:[0-9]{2}) (.+)'
///
/// [[parser.children]]
/// name = "amavis"
/// pattern = '(.+ amavis\[[0-9]+\]: \(.*\)) (.*)'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserNodeConfig {
    /// 노드 이름 (리포트 및 규칙 바인딩에 사용)
    pub name: String,
    /// 두 개의 캡처 그룹을 가진 정규식
    pub pattern: String,
    /// key 발생 횟수를 셀지 여부
    #[serde(default)]
    pub count: bool,
    /// 자식 노드 (rest가 전달됨)
    #[serde(default)]
    pub children: Vec<ParserNodeConfig>,
}

impl ParserNodeConfig {
    fn validate(&self, path: &str) -> Result<(), CountfireError> {
        if self.name.is_empty() {
            return Err(invalid(&format!("{path}.name"), "must not be empty"));
        }
        if self.pattern.is_empty() {
            return Err(invalid(&format!("{path}.pattern"), "must not be empty"));
        }
        for (idx, child) in self.children.iter().enumerate() {
            child.validate(&format!("{path}.children[{idx}]"))?;
        }
        Ok(())
    }
}

/// 임계값 규칙 바인딩 설정
///
/// 지정한 카운터들의 각 key 카운트를 `conditions`에 대해 평가하고,
/// 하나라도 만족하면 `action`을 실행합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBindingConfig {
    /// 규칙 이름
    pub name: String,
    /// 평가 대상 카운팅 노드 이름
    pub counters: Vec<String>,
    /// 실행할 action 섹션 이름 (`[actions.<name>]`)
    pub action: String,
    /// 조건 목록 (삽입 순서대로 평가, 첫 매칭에서 중단)
    pub conditions: Vec<ConditionConfig>,
}

/// 단일 임계값 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// 비교 연산자 (`gt`, `>=` 등). 해석은 엔진의 `Comparator`가 담당합니다.
    pub op: String,
    /// 비교 대상 값
    pub threshold: u64,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const RULES_TOML: &str = r#"
[general]
log_level = "debug"

[parser]
name = "root"
pattern = '(\w+) (.*)'
count = true

[[parser.children]]
name = "leaf"
pattern = '(\d+) (.*)'
count = true

[[rules]]
name = "many"
counters = ["leaf"]
action = "echo"
conditions = [{ op = "gt", threshold = 5 }, { op = "==", threshold = 1 }]

[actions.echo]
kind = "log"
"#;

    #[test]
    fn default_config_has_sane_values() {
        let config = CountfireConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.parser.is_none());
        assert!(config.rules.is_empty());
        assert!(config.actions.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        CountfireConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = CountfireConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn parses_tree_rules_and_actions() {
        let config = CountfireConfig::parse(RULES_TOML).unwrap();
        config.validate().unwrap();

        let root = config.parser.as_ref().unwrap();
        assert_eq!(root.name, "root");
        assert!(root.count);
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].children.is_empty());

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].conditions[1].op, "==");
        assert_eq!(config.rules[0].conditions[0].threshold, 5);

        let echo = &config.actions["echo"];
        assert_eq!(echo.get("kind").and_then(|v| v.as_str()), Some("log"));
    }

    #[test]
    fn invalid_toml_returns_parse_error() {
        let err = CountfireConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            CountfireError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = CountfireConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = CountfireConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_rule_without_action_section() {
        let mut config = CountfireConfig::parse(RULES_TOML).unwrap();
        config.actions.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[actions.echo]"));
    }

    #[test]
    fn validate_rejects_rule_without_conditions() {
        let mut config = CountfireConfig::parse(RULES_TOML).unwrap();
        config.rules[0].conditions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_child_name() {
        let mut config = CountfireConfig::parse(RULES_TOML).unwrap();
        if let Some(root) = config.parser.as_mut() {
            root.children[0].name = String::new();
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parser.children[0].name"));
    }

    #[test]
    #[serial]
    fn env_override_log_level() {
        let mut config = CountfireConfig::default();
        // SAFETY: #[serial]로 환경변수를 건드리는 테스트를 직렬화합니다.
        unsafe { std::env::set_var("COUNTFIRE_GENERAL_LOG_LEVEL", "warn") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("COUNTFIRE_GENERAL_LOG_LEVEL") };
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_COUNTFIRE_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = CountfireConfig::parse(RULES_TOML).unwrap();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = CountfireConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.parser, config.parser);
        assert_eq!(parsed.rules, config.rules);
    }

    #[test]
    fn from_file_not_found() {
        let err = CountfireConfig::from_file("/nonexistent/path/countfire.toml").unwrap_err();
        assert!(matches!(
            err,
            CountfireError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
