//! 패턴 트리 파서
//!
//! [`ParserNode`]를 책임 연쇄(chain of responsibility)로 엮어
//! 한 줄을 계층적인 (key, rest) 쌍으로 분해하고, 지정한 단계에서 key를 셉니다.
//!
//! # 아키텍처
//! - [`node`]: 단일 매칭 단계, 카운터 소유, 자식 순회

pub mod node;

pub use node::ParserNode;
