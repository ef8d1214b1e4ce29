//! 파서 노드 -- 두 그룹 정규식 하나로 이루어진 매칭 단계
//!
//! 노드는 줄을 `(key, rest)`로 분해하고, 필요하면 key를 세고,
//! rest를 모든 자식 노드에 순서대로 넘깁니다.
//!
//! ```text
//! "Sep 13 10:52:53 host amavis[15415]: (15415-07) Blocked SPAM, [1.2.3.4] ..."
//!    timestamp  -> key "Sep 13 10:52:53",                rest "host amavis[...] ..."
//!    amavis     -> key "host amavis[15415]: (15415-07)", rest "Blocked SPAM, ..."
//!    spam       -> key "1.2.3.4" (counted),              rest "[5.6.7.8] ..."
//! ```

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use countfire_core::config::ParserNodeConfig;

use crate::counter::Counter;
use crate::error::EngineError;

/// 파서 노드
///
/// 생성 후 구조는 변하지 않으며, 내부의 [`Counter`]만 `parse` 중에 변경됩니다.
/// 자식은 항상 순서 있는 목록으로 소유합니다 (0개면 leaf).
#[derive(Debug, Clone)]
pub struct ParserNode {
    /// 노드 이름
    name: String,
    /// 사용자가 준 패턴 문자열
    source: String,
    /// 컴파일된 패턴 (앵커는 `parse`에서 매칭 시작 위치로 강제)
    pattern: Regex,
    /// 카운팅 노드일 때만 존재
    counter: Option<Counter>,
    /// 자식 노드
    children: Vec<ParserNode>,
}

impl ParserNode {
    /// 새 노드를 생성합니다.
    ///
    /// 패턴은 그대로 컴파일되며, 매칭은 입력의 시작에서만 인정됩니다.
    /// 끝에는 앵커되지 않습니다.
    ///
    /// # Errors
    /// - 이름이 비어 있는 경우
    /// - 패턴 컴파일 실패
    /// - 캡처 그룹이 정확히 2개가 아닌 경우
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        count_matches: bool,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EngineError::InvalidNode(
                "node name must not be empty".to_owned(),
            ));
        }

        let compiled = Regex::new(pattern).map_err(|e| {
            EngineError::PatternCompile {
                node: name.clone(),
                reason: e.to_string(),
            }
        })?;

        // captures_len()은 전체 매치(그룹 0)를 포함합니다
        let found = compiled.captures_len() - 1;
        if found != 2 {
            return Err(EngineError::GroupCount { node: name, found });
        }

        Ok(Self {
            name,
            source: pattern.to_owned(),
            pattern: compiled,
            counter: count_matches.then(Counter::new),
            children: Vec::new(),
        })
    }

    /// 자식 노드를 추가합니다.
    pub fn with_child(mut self, child: ParserNode) -> Self {
        self.children.push(child);
        self
    }

    /// 여러 자식 노드를 순서대로 추가합니다.
    pub fn with_children(mut self, children: impl IntoIterator<Item = ParserNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// 설정에서 트리 전체를 생성합니다.
    ///
    /// 트리 안에서 노드 이름은 유일해야 합니다.
    pub fn from_config(config: &ParserNodeConfig) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        Self::build(config, &mut seen)
    }

    fn build(config: &ParserNodeConfig, seen: &mut HashSet<String>) -> Result<Self, EngineError> {
        if !seen.insert(config.name.clone()) {
            return Err(EngineError::DuplicateNode(config.name.clone()));
        }

        let mut node = Self::new(config.name.clone(), &config.pattern, config.count)?;
        for child in &config.children {
            node.children.push(Self::build(child, seen)?);
        }

        debug!(
            node = %node.name,
            counts = config.count,
            children = node.children.len(),
            "parser node built"
        );
        Ok(node)
    }

    /// 한 줄을 매칭합니다.
    ///
    /// 이 노드의 패턴이 매칭되면 `true`를 반환합니다. 자식의 매칭 결과는
    /// 반환값에 반영되지 않습니다. 빈 줄이나 매칭 실패는 아무 상태도 바꾸지 않습니다.
    pub fn parse(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }

        let Some(caps) = self.pattern.captures(line) else {
            return false;
        };

        // leftmost 매칭이 0에서 시작하지 않으면 시작 위치 매칭은 없음
        if caps.get(0).is_none_or(|m| m.start() != 0) {
            return false;
        }

        // 참여하지 않은 그룹은 빈 문자열로 취급
        let key = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());

        if let Some(counter) = self.counter.as_mut() {
            counter.increment(key);
        }

        for child in &mut self.children {
            child.parse(rest);
        }

        true
    }

    /// 노드 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 원본 패턴
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// 카운팅 노드 여부
    pub fn counts_matches(&self) -> bool {
        self.counter.is_some()
    }

    /// 카운터 (카운팅 노드일 때만)
    pub fn counter(&self) -> Option<&Counter> {
        self.counter.as_ref()
    }

    /// 자식 노드
    pub fn children(&self) -> &[ParserNode] {
        &self.children
    }

    /// leaf 여부
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 이름으로 노드를 찾습니다 (깊이 우선).
    pub fn find(&self, name: &str) -> Option<&ParserNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// 카운팅 노드의 카운터를 이름으로 찾습니다.
    pub fn counter_for(&self, name: &str) -> Option<&Counter> {
        self.find(name).and_then(ParserNode::counter)
    }

    /// 모든 카운팅 노드의 (이름, 카운터) 목록 (깊이 우선)
    pub fn counting_nodes(&self) -> Vec<(&str, &Counter)> {
        let mut out = Vec::new();
        self.collect_counting(&mut out);
        out
    }

    fn collect_counting<'a>(&'a self, out: &mut Vec<(&'a str, &'a Counter)>) {
        if let Some(counter) = self.counter.as_ref() {
            out.push((self.name.as_str(), counter));
        }
        for child in &self.children {
            child.collect_counting(out);
        }
    }
}
