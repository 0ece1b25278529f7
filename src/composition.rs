//! Time classes, time data, and the composition builder that turns a
//! selected rule-match chain into a `TimeComposition`.

use serde::{Deserialize, Serialize};
use timex_types::{CandidateSpan, TimexKind};

use crate::era::EraTable;
use crate::matcher::RuleMatch;
use crate::numeral::parse_numeral;
use crate::rules::RuleSet;
use crate::surface::replace_last_with_x;

// ── Time classes ─────────────────────────────────────────────────────────

/// The granularity (or role) of one datum in a composition, ordered
/// roughly coarse → fine. `Gyear`/`Gfyear` are era-relative years,
/// `Yearx`/`Gyearx` decade forms, `Jun` a ten-day period (上旬/中旬/下旬),
/// `Youbi` a weekday, `Fun` a relative/fractional function word, `Mod` a
/// modifier, `Num` a bare numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeClass {
    Century,
    Fyear,
    Gyear,
    Gyearx,
    Gfyear,
    Yearx,
    Year,
    Season,
    Month,
    Jun,
    Week,
    Youbi,
    Day,
    Hour,
    Minute,
    Second,
    Phrase,
    Fun,
    Mod,
    Num,
}

impl TimeClass {
    /// Single-letter duration designator (FYEAR renders as literal "FY"
    /// and is special-cased by the surface calculator).
    pub fn initial(self) -> char {
        match self {
            TimeClass::Century => 'C',
            TimeClass::Fyear | TimeClass::Fun => 'F',
            TimeClass::Gyear | TimeClass::Gyearx | TimeClass::Gfyear => 'G',
            TimeClass::Yearx | TimeClass::Year | TimeClass::Youbi => 'Y',
            TimeClass::Season | TimeClass::Second => 'S',
            TimeClass::Month | TimeClass::Minute | TimeClass::Mod => 'M',
            TimeClass::Jun => 'J',
            TimeClass::Week => 'W',
            TimeClass::Day => 'D',
            TimeClass::Hour => 'H',
            TimeClass::Phrase => 'P',
            TimeClass::Num => 'N',
        }
    }

    /// True for the decade forms whose last digit is unknown.
    pub fn is_decade(self) -> bool {
        matches!(self, TimeClass::Yearx | TimeClass::Gyearx)
    }
}

/// Which prior time a relative datum is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// A preceding expression in the text.
    Ref,
    /// The document creation time.
    Dct,
}

// ── Time data ────────────────────────────────────────────────────────────

/// One datum: a class with its value and optional anchoring information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeData {
    pub class: TimeClass,
    pub value: String,
    pub ref_kind: Option<RefKind>,
    pub rel: Option<i64>,
}

impl TimeData {
    pub fn new(class: TimeClass, value: impl Into<String>) -> Self {
        TimeData {
            class,
            value: value.into(),
            ref_kind: None,
            rel: None,
        }
    }

    pub fn anchored(
        class: TimeClass,
        value: impl Into<String>,
        ref_kind: Option<RefKind>,
        rel: i64,
    ) -> Self {
        TimeData {
            class,
            value: value.into(),
            ref_kind,
            rel: Some(rel),
        }
    }
}

// ── Time composition ─────────────────────────────────────────────────────

/// All data extracted from one candidate span: an insertion-ordered set of
/// class/value pairs. Adding a class that is already present overwrites
/// its value in place, keeping the original position.
#[derive(Debug, Clone)]
pub struct TimeComposition {
    pub kind: TimexKind,
    pub sent_id: usize,
    pub begin: usize,
    pub end: usize,
    data: Vec<TimeData>,
}

impl TimeComposition {
    pub fn new(kind: TimexKind, sent_id: usize, begin: usize, end: usize) -> Self {
        TimeComposition {
            kind,
            sent_id,
            begin,
            end,
            data: Vec::new(),
        }
    }

    pub fn add(&mut self, td: TimeData) {
        match self.data.iter_mut().find(|d| d.class == td.class) {
            Some(slot) => *slot = td,
            None => self.data.push(td),
        }
    }

    pub fn get(&self, class: TimeClass) -> Option<&TimeData> {
        self.data.iter().find(|d| d.class == class)
    }

    /// Value for a class, or "" when absent.
    pub fn value_of(&self, class: TimeClass) -> &str {
        self.get(class).map(|d| d.value.as_str()).unwrap_or("")
    }

    /// The most recently added datum (the finest so far during building).
    pub fn finest(&self) -> Option<&TimeData> {
        self.data.last()
    }

    pub fn data(&self) -> &[TimeData] {
        &self.data
    }

    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn has(&self, class: TimeClass) -> bool {
        self.get(class).is_some()
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Numeral value for a captured group, honoring the masked alphabet:
/// a bare `&` run is a single unknown digit, a `#`-prefixed `&` (十数年)
/// parses the prefix and makes its last digit unknown. Any other shape
/// parses the raw text, so 数十 keeps its magnitude (`X0`).
fn numeral_value(raw: &str, masked: &str) -> String {
    if masked.contains('&') {
        if !masked.contains('#') {
            return "X".to_string();
        }
        let prefix_len = masked.chars().take_while(|&c| c == '#').count();
        if prefix_len > 0 && masked.chars().nth(prefix_len) == Some('&') {
            let prefix: String = raw.chars().take(prefix_len).collect();
            if let Some(parsed) = parse_numeral(&prefix) {
                return replace_last_with_x(&parsed);
            }
        }
    }
    parse_numeral(raw).unwrap_or_default()
}

fn slice(chars: &[char], begin: usize, end: usize) -> String {
    chars[begin.min(chars.len())..end.min(chars.len())]
        .iter()
        .collect()
}

/// Build a composition for one span from its selected rule-match chain.
pub fn build_composition(
    span: &CandidateSpan,
    chain: &[RuleMatch],
    sent_chars: &[char],
    masked_chars: &[char],
    rules: &RuleSet,
    eras: &EraTable,
    sent_id: usize,
) -> TimeComposition {
    let mut comp = TimeComposition::new(span.kind, sent_id, span.begin, span.end);

    for rm in chain {
        let rule = &rules.rules()[rm.rule_id];
        for dt in &rule.def.datetypes {
            let tc = dt.timeclass;
            if tc == TimeClass::Mod {
                continue;
            }

            let mut val = String::new();
            if let Some(group) = dt.num {
                if let Some((gb, ge)) = rm.group(group) {
                    let raw = slice(sent_chars, gb, ge);
                    let masked = slice(masked_chars, gb, ge);
                    val = numeral_value(&raw, &masked);
                }
            }
            if let Some(group) = dt.gengo {
                if !val.is_empty() || dt.norm.is_some() {
                    if let Some(n) = &dt.norm {
                        val = n.clone();
                    }
                    if let Some((gb, ge)) = rm.group(group) {
                        let era_name = slice(sent_chars, gb, ge);
                        if let Some(converted) = eras.convert(&era_name, &val) {
                            val = converted;
                        }
                    }
                }
            }

            match tc {
                TimeClass::Phrase | TimeClass::Jun | TimeClass::Season | TimeClass::Youbi => {
                    comp.add(TimeData::new(tc, dt.norm.clone().unwrap_or_default()));
                }
                TimeClass::Yearx => {
                    comp.add(TimeData::new(tc, replace_last_with_x(&val)));
                }
                TimeClass::Fun => build_fun(&mut comp, dt, span.kind),
                _ => build_default(&mut comp, dt, tc, val, span.kind),
            }
        }
    }
    comp
}

/// FUN directives: the fixed fraction 半, or a pure relative marker
/// (昨/来/翌/前 words, N-units-ago words).
fn build_fun(comp: &mut TimeComposition, dt: &crate::rules::Directive, kind: TimexKind) {
    if let Some(fixnum) = &dt.fixnum {
        match kind {
            TimexKind::Duration | TimexKind::Set => {
                let finest = comp.finest().cloned();
                match finest {
                    // 1時間半 --> the finest datum becomes 1.5
                    Some(prev) if prev.value.chars().all(|c| c.is_ascii_digit())
                        && !prev.value.is_empty() =>
                    {
                        if let (Ok(n), Ok(f)) = (prev.value.parse::<i64>(), fixnum.parse::<f64>())
                        {
                            comp.add(TimeData {
                                class: prev.class,
                                value: format!("{}", n as f64 + f),
                                ref_kind: prev.ref_kind,
                                rel: prev.rel,
                            });
                        }
                    }
                    // 半年間 --> keep the fraction for the half-unit pass
                    _ => {
                        comp.add(TimeData::new(TimeClass::Fun, fixnum.clone()));
                    }
                }
            }
            TimexKind::Time if fixnum == "0.5" => {
                // 1時半 --> XXXX-XX-XXT01:30
                match comp.finest().map(|d| d.class) {
                    Some(TimeClass::Hour) => {
                        comp.add(TimeData::new(TimeClass::Minute, "30"));
                    }
                    Some(TimeClass::Minute) => {
                        comp.add(TimeData::new(TimeClass::Second, "30"));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        return;
    }
    if let Some(rel) = dt.dct_relation {
        comp.add(TimeData::anchored(TimeClass::Fun, "1", None, rel));
    } else if let Some(rel) = dt.relation {
        comp.add(TimeData::anchored(TimeClass::Fun, "1", Some(RefKind::Ref), rel));
    }
}

/// Everything that is not PHRASE/JUN/SEASON/YOUBI/YEARX/FUN/MOD.
fn build_default(
    comp: &mut TimeComposition,
    dt: &crate::rules::Directive,
    tc: TimeClass,
    val: String,
    kind: TimexKind,
) {
    match kind {
        TimexKind::Duration | TimexKind::Set => {
            // Default values apply: 年間 --> P1Y.
            let val = match (&dt.norm, val.is_empty()) {
                (Some(n), true) => n.clone(),
                (_, false) => val,
                _ => "1".to_string(),
            };
            comp.add(TimeData::new(tc, val));
        }
        TimexKind::Date | TimexKind::Time => {
            if let Some(rel) = dt.dct_relation {
                comp.add(TimeData::anchored(tc, "1", Some(RefKind::Dct), rel));
            } else if let Some(rel) = dt.relation {
                comp.add(TimeData::anchored(tc, "1", Some(RefKind::Ref), rel));
            } else if tc == TimeClass::Hour
                && matches!(comp.value_of(TimeClass::Hour), "AF" | "NI")
                && val.parse::<i64>().is_ok()
            {
                // An hour following a stored afternoon/night marker.
                let n = val.parse::<i64>().unwrap_or(0);
                comp.add(TimeData::new(tc, (12 + n).to_string()));
            } else if dt.norm.is_some() && !matches!(tc, TimeClass::Gyear | TimeClass::Gyearx) {
                let norm = dt.norm.as_deref().unwrap_or_default();
                let digits = !val.is_empty() && val.chars().all(|c| c.is_ascii_digit());
                if norm == "AF" && tc == TimeClass::Hour && digits {
                    // 午後X時
                    let n = val.parse::<i64>().unwrap_or(0);
                    comp.add(TimeData::new(tc, (12 + n).to_string()));
                } else if norm == "MO" && tc == TimeClass::Hour && digits {
                    // 午前X時
                    comp.add(TimeData::new(tc, val));
                } else {
                    comp.add(TimeData::new(tc, norm.to_string()));
                }
            } else if !val.is_empty() {
                comp.add(TimeData::new(tc, val));
            }
        }
    }
}
