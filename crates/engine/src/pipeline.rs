//! 2단계 실행 파이프라인 -- 카운팅 후 규칙 발동
//!
//! ```text
//! lines ──> ParserNode::parse (카운터 누적) ──> [입력 종료] ──> RuleSet::fire_against_counter ──> Action::execute
//!           1단계: ingest                                      2단계: fire
//! ```
//!
//! 규칙 평가는 모든 입력을 소비한 뒤의 최종 카운터 스냅샷에 대해서만 수행됩니다.

use std::io::BufRead;

use serde::Serialize;
use tracing::{info, warn};

use countfire_core::config::CountfireConfig;

use crate::counter::Counter;
use crate::error::EngineError;
use crate::parser::ParserNode;
use crate::presets::amavis_tree;
use crate::rule::RuleBinding;

/// 입력 처리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// 읽은 줄 수
    pub lines_read: u64,
    /// 루트 패턴에 매칭된 줄 수
    pub lines_matched: u64,
    /// 매칭되지 않은 줄 수
    pub lines_unmatched: u64,
}

/// 카운팅 노드 하나의 리포트
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterReport {
    /// 노드 이름
    pub node: String,
    /// 서로 다른 key 수
    pub distinct_keys: usize,
    /// 카운트 합계
    pub total: u64,
    /// count 내림차순 정렬된 항목
    pub entries: Vec<KeyCount>,
}

/// (key, count) 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

/// 발동(또는 dry-run에서 발동 예정)한 key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredKey {
    /// 규칙 이름
    pub rule: String,
    /// 카운팅 노드 이름
    pub counter: String,
    /// action 이름
    pub action: String,
    /// key
    pub key: String,
    /// 평가된 카운트
    pub count: u64,
}

/// 발동 단계 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FireSummary {
    /// 실제로 action을 실행했는지 (dry-run이면 false)
    pub executed: bool,
    /// 발동한 key 목록
    pub fired: Vec<FiredKey>,
}

impl FireSummary {
    /// 하나라도 발동했는지 여부
    pub fn fired_any(&self) -> bool {
        !self.fired.is_empty()
    }
}

/// 카운팅 + 규칙 발동 파이프라인
#[derive(Debug)]
pub struct TallyPipeline {
    root: ParserNode,
    stats: ScanStats,
}

impl TallyPipeline {
    /// 파서 트리로 파이프라인을 생성합니다.
    pub fn new(root: ParserNode) -> Self {
        Self {
            root,
            stats: ScanStats::default(),
        }
    }

    /// 설정의 `[parser]` 트리로 파이프라인을 생성합니다.
    /// `[parser]`가 없으면 amavis 프리셋을 사용합니다.
    pub fn from_config(config: &CountfireConfig) -> Result<Self, EngineError> {
        let root = match config.parser {
            Some(ref parser) => ParserNode::from_config(parser)?,
            None => {
                info!("no [parser] section, using amavis preset");
                amavis_tree()?
            }
        };
        Ok(Self::new(root))
    }

    /// 파서 트리 루트
    pub fn root(&self) -> &ParserNode {
        &self.root
    }

    /// 현재까지의 입력 통계
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// 이름으로 카운터를 찾습니다.
    pub fn counter(&self, node: &str) -> Option<&Counter> {
        self.root.counter_for(node)
    }

    /// 한 줄을 처리합니다.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        let matched = self.root.parse(line);
        self.stats.lines_read += 1;
        if matched {
            self.stats.lines_matched += 1;
        } else {
            self.stats.lines_unmatched += 1;
        }
        matched
    }

    /// 여러 줄을 입력 순서대로 처리합니다.
    pub fn ingest<I, S>(&mut self, lines: I) -> ScanStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.ingest_line(line.as_ref());
        }
        self.stats
    }

    /// reader의 모든 줄을 처리합니다.
    ///
    /// 줄 끝의 `\n`/`\r\n`은 제거하며, UTF-8이 아닌 바이트는 대체 문자로 바꿉니다.
    pub fn ingest_reader<R: BufRead>(&mut self, mut reader: R) -> Result<ScanStats, EngineError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf);
            self.ingest_line(&line);
        }

        info!(
            lines_read = self.stats.lines_read,
            lines_matched = self.stats.lines_matched,
            lines_unmatched = self.stats.lines_unmatched,
            "input consumed"
        );
        Ok(self.stats)
    }

    /// 카운팅 노드별 리포트 (깊이 우선 순서)
    pub fn report(&self) -> Vec<CounterReport> {
        self.root
            .counting_nodes()
            .into_iter()
            .map(|(node, counter)| CounterReport {
                node: node.to_owned(),
                distinct_keys: counter.len(),
                total: counter.total(),
                entries: counter
                    .sorted_entries()
                    .into_iter()
                    .map(|(key, count)| KeyCount { key, count })
                    .collect(),
            })
            .collect()
    }

    /// 바인딩이 참조하는 카운터가 모두 존재하는지 확인합니다.
    pub fn check_bindings(&self, bindings: &[RuleBinding]) -> Result<(), EngineError> {
        for binding in bindings {
            for name in &binding.counters {
                if self.counter(name).is_none() {
                    return Err(EngineError::UnknownNode(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// 최종 카운터에 대해 규칙을 평가하고 action을 실행합니다.
    ///
    /// 실행 전에 모든 바인딩의 카운터 이름을 확인하므로, 설정 오류로 인해
    /// 일부 action만 실행되는 일은 없습니다. action 에러는 즉시 전파됩니다.
    pub fn fire(&self, bindings: &[RuleBinding]) -> Result<FireSummary, EngineError> {
        self.check_bindings(bindings)?;

        let mut summary = FireSummary {
            executed: true,
            fired: Vec::new(),
        };

        for binding in bindings {
            for name in &binding.counters {
                let counter = self
                    .counter(name)
                    .ok_or_else(|| EngineError::UnknownNode(name.clone()))?;
                for key in binding.rules.fired_keys(counter)? {
                    summary.fired.push(FiredKey {
                        rule: binding.name.clone(),
                        counter: name.clone(),
                        action: binding.rules.action_name().to_owned(),
                        count: counter.get(&key),
                        key,
                    });
                }
            }
        }

        if !summary.fired_any() {
            info!("no rule fired");
        }
        Ok(summary)
    }

    /// action을 실행하지 않고 발동 대상만 계산합니다.
    pub fn dry_run(&self, bindings: &[RuleBinding]) -> Result<FireSummary, EngineError> {
        self.check_bindings(bindings)?;

        let mut summary = FireSummary::default();
        for binding in bindings {
            for name in &binding.counters {
                let Some(counter) = self.counter(name) else {
                    warn!(counter = %name, "counter vanished during dry run");
                    continue;
                };
                for (key, count) in binding.rules.matching_keys(counter) {
                    summary.fired.push(FiredKey {
                        rule: binding.name.clone(),
                        counter: name.clone(),
                        action: binding.rules.action_name().to_owned(),
                        key,
                        count,
                    });
                }
            }
        }
        Ok(summary)
    }
}
