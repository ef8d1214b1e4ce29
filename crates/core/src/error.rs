//! 에러 타입 -- 도메인별 에러 정의

/// countfire 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CountfireError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파서 트리 / 규칙 엔진 에러
    #[error("engine error: {0}")]
    Engine(String),

    /// Action 준비/실행 에러
    #[error("action error: {0}")]
    Action(#[from] ActionError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Action 에러
///
/// `prepare` 단계의 에러는 규칙 평가 전에 실행을 중단시키고,
/// `execute` 단계의 에러는 잡히지 않고 그대로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// 설정 섹션 없음
    #[error("missing config section [actions.{section}]")]
    MissingSection { section: String },

    /// 필수 필드 없음
    #[error("missing field '{field}' in [actions.{section}]")]
    MissingField { section: String, field: String },

    /// 필드 타입/값 오류
    #[error("invalid field '{field}' in [actions.{section}]: {reason}")]
    InvalidField {
        section: String,
        field: String,
        reason: String,
    },

    /// 알 수 없는 action 종류
    #[error("unknown action kind '{kind}' for '{name}'")]
    UnknownKind { name: String, kind: String },

    /// prepare 없이 execute 호출
    #[error("action '{0}' used before prepare")]
    NotPrepared(String),

    /// 리소스 획득 실패
    #[error("action '{name}' prepare failed: {reason}")]
    Prepare { name: String, reason: String },

    /// 외부 효과 실행 실패
    #[error("action '{name}' failed for key '{key}': {reason}")]
    Execute {
        name: String,
        key: String,
        reason: String,
    },
}

impl ActionError {
    /// prepare 단계 에러인지 여부 (설정/리소스 문제)
    ///
    /// `NotPrepared`와 `Execute`는 `execute` 호출에서만 발생합니다.
    pub fn is_prepare_error(&self) -> bool {
        match self {
            Self::MissingSection { .. }
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::UnknownKind { .. }
            | Self::Prepare { .. } => true,
            Self::NotPrepared(_) | Self::Execute { .. } => false,
        }
    }
}
