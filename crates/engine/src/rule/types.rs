//! 임계값 규칙 데이터 타입

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// 비교 연산자
///
/// 임의의 함수 대신 닫힌 enum으로 표현하여 규칙을 순수 데이터로 다룹니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// `value < threshold`
    Lt,
    /// `value <= threshold`
    Le,
    /// `value > threshold`
    Gt,
    /// `value >= threshold`
    Ge,
    /// `value == threshold`
    Eq,
    /// `value != threshold`
    Ne,
}

impl Comparator {
    /// `value (op) threshold`가 성립하는지 평가합니다.
    pub fn holds(self, value: u64, threshold: u64) -> bool {
        match self {
            Self::Lt => value < threshold,
            Self::Le => value <= threshold,
            Self::Gt => value > threshold,
            Self::Ge => value >= threshold,
            Self::Eq => value == threshold,
            Self::Ne => value != threshold,
        }
    }

    /// 연산자 기호
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lt" | "<" => Ok(Self::Lt),
            "le" | "<=" => Ok(Self::Le),
            "gt" | ">" => Ok(Self::Gt),
            "ge" | ">=" => Ok(Self::Ge),
            "eq" | "==" => Ok(Self::Eq),
            "ne" | "!=" => Ok(Self::Ne),
            other => Err(EngineError::UnknownComparator(other.to_owned())),
        }
    }
}

/// 임계값 규칙 -- (비교 연산자, 임계값) 쌍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// 비교 연산자
    pub op: Comparator,
    /// 임계값
    pub threshold: u64,
}

impl ThresholdRule {
    /// 새 규칙을 생성합니다.
    pub fn new(op: Comparator, threshold: u64) -> Self {
        Self { op, threshold }
    }

    /// 카운트가 이 규칙을 만족하는지 평가합니다.
    pub fn matches(&self, value: u64) -> bool {
        self.op.holds(value, self.threshold)
    }
}

impl fmt::Display for ThresholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count {} {}", self.op, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparators_hold() {
        assert!(Comparator::Lt.holds(4, 5));
        assert!(!Comparator::Lt.holds(5, 5));
        assert!(Comparator::Le.holds(5, 5));
        assert!(Comparator::Gt.holds(6, 5));
        assert!(!Comparator::Gt.holds(5, 5));
        assert!(Comparator::Ge.holds(5, 5));
        assert!(Comparator::Eq.holds(5, 5));
        assert!(!Comparator::Eq.holds(4, 5));
        assert!(Comparator::Ne.holds(4, 5));
        assert!(!Comparator::Ne.holds(5, 5));
    }

    #[test]
    fn parses_names_and_symbols() {
        for (text, expected) in [
            ("lt", Comparator::Lt),
            ("<=", Comparator::Le),
            ("gt", Comparator::Gt),
            (">=", Comparator::Ge),
            ("==", Comparator::Eq),
            ("ne", Comparator::Ne),
        ] {
            assert_eq!(text.parse::<Comparator>().unwrap(), expected);
        }
        assert!(matches!(
            "~=".parse::<Comparator>(),
            Err(EngineError::UnknownComparator(_))
        ));
    }

    #[test]
    fn display_uses_symbol() {
        let rule = ThresholdRule::new(Comparator::Gt, 5);
        assert_eq!(rule.to_string(), "count > 5");
        assert!(rule.matches(6));
        assert!(!rule.matches(5));
    }

    #[test]
    fn deserializes_lowercase_names() {
        let rule: ThresholdRule = serde_json::from_str(r#"{"op":"ge","threshold":3}"#).unwrap();
        assert_eq!(rule, ThresholdRule::new(Comparator::Ge, 3));
    }
}
