//! 기본 제공 파서 트리 프리셋
//!
//! amavis 메일 로그에서 스팸을 보낸 클라이언트 IP를 셉니다.
//!
//! ```text
//! timestamp                "Sep 13 10:52:53 ..."
//!   └─ amavis              "host amavis[15415]: (15415-07) ..."
//!        ├─ spam   (count) "Blocked SPAM, [IP] ..."
//!        └─ spammy (count) "Passed SPAMMY, [IP] ..."
//! ```

use crate::error::EngineError;
use crate::parser::ParserNode;

/// IPv4 주소 패턴
pub const IPV4: &str = r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+";

/// 타임스탬프 제거 노드 이름
pub const TIMESTAMP_NODE: &str = "timestamp";
/// amavis 헤더 제거 노드 이름
pub const AMAVIS_NODE: &str = "amavis";
/// "Blocked SPAM" 카운팅 노드 이름
pub const SPAM_NODE: &str = "spam";
/// "Passed SPAMMY" 카운팅 노드 이름
pub const SPAMMY_NODE: &str = "spammy";

/// amavis 스팸 IP 카운팅 트리를 생성합니다.
pub fn amavis_tree() -> Result<ParserNode, EngineError> {
    let spam = ParserNode::new(
        SPAM_NODE,
        &format!(r"Blocked SPAM, \[({IPV4})\] (\[{IPV4}\] .*)"),
        true,
    )?;
    let spammy = ParserNode::new(
        SPAMMY_NODE,
        &format!(r"Passed SPAMMY, \[({IPV4})\] (\[{IPV4}\] .*)"),
        true,
    )?;

    let amavis = ParserNode::new(AMAVIS_NODE, r"(.+ amavis\[[0-9]+\]: \(.*\)) (.*)", false)?
        .with_children([spam, spammy]);

    Ok(ParserNode::new(
        TIMESTAMP_NODE,
        r"(.+ [0-9]+ [0-9]{2}:[0-9]{2}:[0-9]{2}) (.+)",
        false,
    )?
    .with_child(amavis))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAM_LINE: &str =
        "Sep 13 10:52:53 host amavis[15415]: (15415-07) Blocked SPAM, [1.2.3.4] [5.6.7.8] foo";
    const SPAMMY_LINE: &str =
        "Sep 13 11:02:10 host amavis[15502]: (15502-01) Passed SPAMMY, [9.9.9.9] [5.6.7.8] bar";

    #[test]
    fn builds_three_levels() {
        let tree = amavis_tree().unwrap();
        assert_eq!(tree.name(), TIMESTAMP_NODE);
        let amavis = tree.find(AMAVIS_NODE).unwrap();
        assert_eq!(amavis.children().len(), 2);
        assert!(tree.find(SPAM_NODE).unwrap().is_leaf());
        let names: Vec<&str> = tree.counting_nodes().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![SPAM_NODE, SPAMMY_NODE]);
    }

    #[test]
    fn nested_decomposition_counts_client_ip() {
        let mut tree = amavis_tree().unwrap();
        assert!(tree.parse(SPAM_LINE));
        assert_eq!(tree.counter_for(SPAM_NODE).unwrap().get("1.2.3.4"), 1);
        assert!(tree.counter_for(SPAMMY_NODE).unwrap().is_empty());
    }

    #[test]
    fn nested_result_equals_direct_leaf_match() {
        let mut tree = amavis_tree().unwrap();
        tree.parse(SPAM_LINE);

        // 두 번 벗겨낸 뒤의 부분 문자열을 leaf 패턴에 직접 매칭
        let mut direct = ParserNode::new(
            SPAM_NODE,
            &format!(r"Blocked SPAM, \[({IPV4})\] (\[{IPV4}\] .*)"),
            true,
        )
        .unwrap();
        assert!(direct.parse("Blocked SPAM, [1.2.3.4] [5.6.7.8] foo"));

        assert_eq!(tree.counter_for(SPAM_NODE), direct.counter());
    }

    #[test]
    fn spammy_lines_go_to_spammy_leaf() {
        let mut tree = amavis_tree().unwrap();
        assert!(tree.parse(SPAMMY_LINE));
        assert_eq!(tree.counter_for(SPAMMY_NODE).unwrap().get("9.9.9.9"), 1);
        assert!(tree.counter_for(SPAM_NODE).unwrap().is_empty());
    }

    #[test]
    fn other_amavis_lines_match_root_but_count_nothing() {
        let mut tree = amavis_tree().unwrap();
        let line = "Sep 13 10:52:53 host amavis[15415]: (15415-07) Passed CLEAN, [1.2.3.4] [5.6.7.8]";
        assert!(tree.parse(line));
        assert!(tree.counting_nodes().iter().all(|(_, c)| c.is_empty()));
    }

    #[test]
    fn unrelated_line_does_not_match() {
        let mut tree = amavis_tree().unwrap();
        assert!(!tree.parse("no timestamp here"));
    }
}
