//! Rule matching against a masked sentence: enumerate every rule match,
//! chain adjacent matches, filter chains by position and span-kind
//! restrictions, and pick one chain per candidate span.

use timex_types::{CandidateSpan, TimexKind};

use crate::rules::{ApplicableType, PosLimit, RuleSet};

/// One rule match, in character offsets of the masked sentence. `begin`
/// and `end` reflect the rule's span adjustment; capture-group spans do
/// not.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: usize,
    pub begin: usize,
    pub end: usize,
    groups: Vec<Option<(usize, usize)>>,
}

impl RuleMatch {
    /// Character span of capture group `i` (0 = whole match).
    pub fn group(&self, i: usize) -> Option<(usize, usize)> {
        self.groups.get(i).copied().flatten()
    }
}

/// All matches of every rule against one masked sentence.
pub fn all_matches(rules: &RuleSet, masked: &[char]) -> Vec<RuleMatch> {
    let text: String = masked.iter().collect();
    // Byte offset -> character offset, for translating regex spans.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (ci, (bi, c)) in text.char_indices().enumerate() {
        for b in bi..bi + c.len_utf8() {
            byte_to_char[b] = ci;
        }
    }
    byte_to_char[text.len()] = masked.len();

    let mut matches = Vec::new();
    for (rule_id, rule) in rules.rules().iter().enumerate() {
        for caps in rule.regex.captures_iter(&text) {
            let whole = caps.get(0).map(|m| (byte_to_char[m.start()], byte_to_char[m.end()]));
            let Some((mut begin, mut end)) = whole else {
                continue;
            };
            if let Some(adj) = rule.def.range {
                begin = begin.saturating_add_signed(adj.start as isize);
                end = end.saturating_add_signed(adj.end as isize);
            }
            let groups = caps
                .iter()
                .map(|g| g.map(|m| (byte_to_char[m.start()], byte_to_char[m.end()])))
                .collect();
            matches.push(RuleMatch {
                rule_id,
                begin,
                end,
                groups,
            });
        }
    }
    matches
}

fn poslimit_ok(chain: &[&RuleMatch], rules: &RuleSet) -> bool {
    let defs = rules.rules();
    if chain[..chain.len() - 1]
        .iter()
        .any(|rm| defs[rm.rule_id].def.poslimit == Some(PosLimit::Tail))
    {
        return false;
    }
    if chain.len() != 1
        && chain
            .iter()
            .any(|rm| defs[rm.rule_id].def.poslimit == Some(PosLimit::Single))
    {
        return false;
    }
    true
}

fn span_kind_ok(chain: &[&RuleMatch], rules: &RuleSet, kind: TimexKind) -> bool {
    let defs = rules.rules();
    match kind {
        TimexKind::Duration => chain.iter().all(|rm| {
            matches!(
                defs[rm.rule_id].def.applicable_type,
                None | Some(
                    ApplicableType::Duration
                        | ApplicableType::Mod
                        | ApplicableType::Fun
                        | ApplicableType::Num
                )
            )
        }),
        TimexKind::Date => chain.iter().any(|rm| {
            match defs[rm.rule_id].def.applicable_type {
                // Unset counts as the span's own kind.
                None => true,
                Some(t) => t.matches_kind(kind),
            }
        }),
        TimexKind::Time | TimexKind::Set => true,
    }
}

/// Pick the match chain for one candidate span: every chain of adjacent
/// matches fully inside the span that survives both filters, preferring
/// the longest total character span, then the fewest matches.
pub fn select_chain(matches: &[RuleMatch], span: &CandidateSpan, rules: &RuleSet) -> Vec<RuleMatch> {
    let cands: Vec<&RuleMatch> = matches
        .iter()
        .filter(|rm| rm.begin >= span.begin && rm.end <= span.end && rm.begin < rm.end)
        .collect();
    if cands.is_empty() {
        return Vec::new();
    }

    // Enumerate chains by extending each match with matches that begin
    // where it ends. Matches are non-empty, so chains cannot cycle.
    let mut chains: Vec<Vec<&RuleMatch>> = Vec::new();
    let mut stack: Vec<Vec<&RuleMatch>> = cands.iter().map(|rm| vec![*rm]).collect();
    while let Some(chain) = stack.pop() {
        let tail_end = chain.last().map(|rm| rm.end).unwrap_or_default();
        for next in cands.iter().filter(|rm| rm.begin == tail_end) {
            let mut extended = chain.clone();
            extended.push(next);
            stack.push(extended);
        }
        chains.push(chain);
    }

    chains.retain(|c| poslimit_ok(c, rules) && span_kind_ok(c, rules, span.kind));

    let best_len = chains
        .iter()
        .map(|c| c.last().unwrap().end - c.first().unwrap().begin)
        .max();
    let Some(best_len) = best_len else {
        return Vec::new();
    };
    let best = chains
        .iter()
        .filter(|c| c.last().unwrap().end - c.first().unwrap().begin == best_len)
        .min_by_key(|c| c.len());
    match best {
        Some(chain) => {
            tracing::debug!(
                span = %span.text,
                chain_len = chain.len(),
                begin = chain.first().unwrap().begin,
                end = chain.last().unwrap().end,
                "selected rule chain"
            );
            chain.iter().map(|rm| (*rm).clone()).collect()
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::era::EraTable;
    use crate::mask::mask_sentence;

    fn setup(sentence: &str, spans: &[CandidateSpan]) -> (Vec<char>, RuleSet) {
        let chars: Vec<char> = sentence.chars().collect();
        let masked = mask_sentence(&chars, spans, &EraTable::builtin());
        (masked, RuleSet::builtin())
    }

    fn span(text: &str, begin: usize, end: usize, kind: TimexKind) -> CandidateSpan {
        CandidateSpan {
            text: text.to_string(),
            begin,
            end,
            kind,
        }
    }

    #[test]
    fn test_chain_covers_year_month_day() {
        let sp = span("2020年3月15日", 0, 10, TimexKind::Date);
        let (masked, rules) = setup("2020年3月15日に開幕", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let chain = select_chain(&matches, &sp, &rules);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.first().unwrap().begin, 0);
        assert_eq!(chain.last().unwrap().end, 10);
    }

    #[test]
    fn test_longest_chain_preferred() {
        // 去年 must win over the PHRASE rule matching bare 今 elsewhere.
        let sp = span("去年", 0, 2, TimexKind::Date);
        let (masked, rules) = setup("去年の夏", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let chain = select_chain(&matches, &sp, &rules);
        assert_eq!(chain.len(), 1);
        assert_eq!((chain[0].begin, chain[0].end), (0, 2));
    }

    #[test]
    fn test_matches_outside_span_ignored() {
        let sp = span("3月", 3, 5, TimexKind::Date);
        let (masked, rules) = setup("その後3月に入った", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let chain = select_chain(&matches, &sp, &rules);
        assert_eq!(chain.len(), 1);
        assert_eq!((chain[0].begin, chain[0].end), (3, 5));
    }

    #[test]
    fn test_tail_rule_rejected_mid_chain() {
        // 半 may only close a chain: 半年間 must use the dedicated rule,
        // not [半][年間].
        let sp = span("半年間", 0, 3, TimexKind::Duration);
        let (masked, rules) = setup("半年間の休み", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let chain = select_chain(&matches, &sp, &rules);
        assert_eq!(chain.len(), 1);
        assert_eq!((chain[0].begin, chain[0].end), (0, 3));
        let rule = &rules.rules()[chain[0].rule_id];
        assert_eq!(rule.def.pattern, "半年間?");
    }

    #[test]
    fn test_single_rule_allowed_alone() {
        let sp = span("17", 0, 2, TimexKind::Date);
        let (masked, rules) = setup("17、18日の両日", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let chain = select_chain(&matches, &sp, &rules);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_duration_span_rejects_date_only_rules() {
        // A DURATION span where only a date-typed chain is available
        // yields nothing.
        let rules = RuleSet::from_json(
            r#"[{"pattern": "(#+)日",
                 "datetypes": [{"timeclass": "DAY", "num": 1}],
                 "type": "DATE"}]"#,
        )
        .unwrap();
        let sp = span("3日", 0, 2, TimexKind::Duration);
        let chars: Vec<char> = "3日".chars().collect();
        let masked = mask_sentence(&chars, std::slice::from_ref(&sp), &EraTable::builtin());
        let matches = all_matches(&rules, &masked);
        assert_eq!(matches.len(), 1);
        let chain = select_chain(&matches, &sp, &rules);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_range_adjustment_shrinks_match() {
        let sp = span("10年ぶり", 0, 5, TimexKind::Duration);
        let (masked, rules) = setup("10年ぶりの再会", &[sp.clone()]);
        let matches = all_matches(&rules, &masked);
        let adjusted = matches
            .iter()
            .find(|rm| {
                rules.rules()[rm.rule_id].def.pattern == "([#&]+)年ぶり"
            })
            .unwrap();
        assert_eq!((adjusted.begin, adjusted.end), (0, 3));
    }
}
