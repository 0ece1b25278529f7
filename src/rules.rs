//! Rule table: pattern + directive schema, JSON loading, and regex
//! compilation. Patterns are written against the masked alphabet
//! (`#` digit, `&` unknown quantity, `%` era name) plus literal text.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use timex_types::TimexKind;

use crate::composition::TimeClass;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rule pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: Box<regex::Error>,
    },
}

/// Positional restriction on a rule within a match chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosLimit {
    /// Only legal as the last match of a chain.
    Tail,
    /// Only legal as a whole single-match chain.
    Single,
}

/// What kind of span a rule may apply to. Unset means "any" (and counts
/// as the span's own kind in the type filters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicableType {
    Date,
    Time,
    Duration,
    Set,
    Mod,
    Fun,
    Num,
}

impl ApplicableType {
    pub fn matches_kind(self, kind: TimexKind) -> bool {
        matches!(
            (self, kind),
            (ApplicableType::Date, TimexKind::Date)
                | (ApplicableType::Time, TimexKind::Time)
                | (ApplicableType::Duration, TimexKind::Duration)
                | (ApplicableType::Set, TimexKind::Set)
        )
    }
}

/// One output directive of a rule.
#[derive(Debug, Clone, Deserialize)]
pub struct Directive {
    pub timeclass: TimeClass,
    /// Capture-group index of the numeral text.
    #[serde(default)]
    pub num: Option<usize>,
    /// Literal normalized value.
    #[serde(default)]
    pub norm: Option<String>,
    /// Fixed fraction (半 = "0.5").
    #[serde(default)]
    pub fixnum: Option<String>,
    /// Capture-group index of an era name.
    #[serde(default)]
    pub gengo: Option<usize>,
    /// Offset relative to a preceding expression (−1/0/+1).
    #[serde(default)]
    pub relation: Option<i64>,
    /// Offset relative to the document creation time.
    #[serde(default)]
    pub dct_relation: Option<i64>,
}

/// Shrinks or grows the matched span before chaining/containment checks.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RangeAdjust {
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub pattern: String,
    pub datetypes: Vec<Directive>,
    #[serde(default)]
    pub poslimit: Option<PosLimit>,
    #[serde(default, rename = "type")]
    pub applicable_type: Option<ApplicableType>,
    #[serde(default)]
    pub range: Option<RangeAdjust>,
}

/// A rule with its compiled pattern.
#[derive(Debug, Clone)]
pub struct Rule {
    pub def: RuleDef,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

static BUILTIN_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::from_json(include_str!("../rules/rules.json"))
        .expect("builtin rule table is valid")
});

impl RuleSet {
    pub fn builtin() -> Self {
        BUILTIN_RULES.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let defs: Vec<RuleDef> = serde_json::from_str(json)?;
        let mut rules = Vec::with_capacity(defs.len());
        for def in defs {
            let regex = Regex::new(&def.pattern).map_err(|e| ConfigError::Pattern {
                pattern: def.pattern.clone(),
                source: Box::new(e),
            })?;
            rules.push(Rule { def, regex });
        }
        Ok(RuleSet { rules })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_compiles() {
        let rs = RuleSet::builtin();
        assert!(!rs.rules().is_empty());
    }

    #[test]
    fn test_rule_parsing() {
        let rs = RuleSet::from_json(
            r#"[{"pattern": "(#+)年前",
                 "datetypes": [{"timeclass": "FUN", "relation": -1},
                               {"timeclass": "YEAR", "num": 1}],
                 "poslimit": "SINGLE",
                 "type": "DATE",
                 "range": {"end": -1}}]"#,
        )
        .unwrap();
        let rule = &rs.rules()[0];
        assert_eq!(rule.def.datetypes.len(), 2);
        assert_eq!(rule.def.datetypes[0].relation, Some(-1));
        assert_eq!(rule.def.datetypes[1].num, Some(1));
        assert_eq!(rule.def.poslimit, Some(PosLimit::Single));
        assert!(matches!(
            rule.def.applicable_type,
            Some(ApplicableType::Date)
        ));
        assert_eq!(rule.def.range.unwrap().end, -1);
    }

    #[test]
    fn test_bad_pattern_reported() {
        let err = RuleSet::from_json(
            r#"[{"pattern": "([#+", "datetypes": [{"timeclass": "YEAR"}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }
}
