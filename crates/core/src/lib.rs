//! countfire 공통 타입, trait, 에러, 설정
//!
//! - [`config`]: `countfire.toml` 파싱, 환경변수 오버라이드, 유효성 검증
//! - [`error`]: 도메인별 에러 타입
//! - [`action`]: 규칙 발동 시 실행되는 [`Action`] capability

pub mod action;
pub mod config;
pub mod error;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ActionError, ConfigError, CountfireError};

// 설정
pub use config::{
    ConditionConfig, CountfireConfig, GeneralConfig, ParserNodeConfig, RuleBindingConfig,
};

// Action
pub use action::{Action, ActionContext};
