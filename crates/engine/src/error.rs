//! 엔진 에러 타입
//!
//! [`EngineError`]는 파서 트리 구성, 규칙 바인딩, 발동 단계의 에러를 표현합니다.
//! `From<EngineError> for CountfireError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.
//!
//! 매칭 실패(NoMatch)는 에러가 아닙니다. `parse`가 `false`를 반환할 뿐입니다.

use countfire_core::error::{ActionError, CountfireError};

/// 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 패턴 컴파일 실패 (시작 시 치명적)
    #[error("pattern compile error in node '{node}': {reason}")]
    PatternCompile {
        /// 노드 이름
        node: String,
        /// 컴파일 실패 사유
        reason: String,
    },

    /// 캡처 그룹 수가 2가 아님
    #[error("pattern for node '{node}' must have exactly 2 capture groups, found {found}")]
    GroupCount {
        /// 노드 이름
        node: String,
        /// 실제 캡처 그룹 수
        found: usize,
    },

    /// 잘못된 노드 정의
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// 트리 내 중복 노드 이름
    #[error("duplicate parser node name '{0}'")]
    DuplicateNode(String),

    /// 존재하지 않거나 카운팅하지 않는 노드
    #[error("no counting parser node named '{0}'")]
    UnknownNode(String),

    /// 알 수 없는 비교 연산자
    #[error("unknown comparator '{0}'")]
    UnknownComparator(String),

    /// 규칙이 참조한 action이 준비되지 않음
    #[error("rule '{rule}' references unprepared action '{action}'")]
    UnknownAction {
        /// 규칙 이름
        rule: String,
        /// action 이름
        action: String,
    },

    /// action 준비/실행 에러
    #[error(transparent)]
    Action(#[from] ActionError),

    /// 입력 읽기 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EngineError> for CountfireError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Action(e) => CountfireError::Action(e),
            EngineError::Io(e) => CountfireError::Io(e),
            other => CountfireError::Engine(other.to_string()),
        }
    }
}
