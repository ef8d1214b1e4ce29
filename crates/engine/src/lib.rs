//! countfire 엔진 -- 로그 줄을 패턴 트리로 분해해 key를 세고, 임계값 규칙으로 action을 발동
//!
//! # 모듈 구성
//!
//! - [`parser`]: 두 그룹 정규식 노드로 이루어진 파서 트리
//! - [`counter`]: key별 발생 횟수 카운터
//! - [`rule`]: 임계값 규칙 집합과 설정 바인딩
//! - [`action`]: 기본 제공 action (log, access_map) 및 레지스트리
//! - [`presets`]: amavis 스팸 IP 카운팅 트리
//! - [`pipeline`]: 카운팅 후 발동하는 2단계 실행
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! lines -> ParserNode tree -> Counter (per counting node)
//!                                 |
//!                         [end of input]
//!                                 |
//!                           RuleSet -> Action
//! ```

pub mod action;
pub mod counter;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod presets;
pub mod rule;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{CounterReport, FireSummary, FiredKey, KeyCount, ScanStats, TallyPipeline};

// 에러
pub use error::EngineError;

// 파서
pub use counter::Counter;
pub use parser::ParserNode;

// 규칙 엔진
pub use rule::{Comparator, RuleBinding, RuleSet, ThresholdRule};

// action
pub use action::{AccessMapAction, ActionRegistry, LogAction};
