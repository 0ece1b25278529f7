//! Absolute-value resolution: era-code substitution, reference lookup
//! (document creation time and preceding expressions), relative and
//! slot-wise calendar arithmetic, weekday-consistency merging, and the
//! list (17、18日) and half-unit (半日) rewrite passes.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::{NoExpand, Regex};
use timex_types::TimexKind;

use crate::composition::{RefKind, TimeClass, TimeComposition, TimeData};
use crate::surface::{Slots, replace_last_with_x, slots2format};

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn pad2(s: &str) -> String {
    let len = s.chars().count();
    format!("{}{s}", "0".repeat(2usize.saturating_sub(len)))
}

// ── Rewrite passes ───────────────────────────────────────────────────────

/// Merge list constructions: a numeral-only composition immediately
/// followed (same sentence, at most one separator character) by a
/// single-datum composition takes over that datum's class. Runs right to
/// left so runs like 15、16、17日 cascade.
pub fn resolve_parallel_lists(cps: &mut [TimeComposition]) {
    if cps.is_empty() {
        return;
    }
    for cpid in (0..cps.len() - 1).rev() {
        let cp = &cps[cpid];
        let next = &cps[cpid + 1];
        if !cp.is_valid()
            || !cp.data().iter().all(|td| td.class == TimeClass::Num)
            || next.sent_id != cp.sent_id
            || next.data().len() != 1
            || next.begin < cp.end
            || next.begin - cp.end > 1
        {
            continue;
        }
        let class = next.data()[0].class;
        let num = cp.value_of(TimeClass::Num).to_string();
        let value = if class.is_decade() {
            replace_last_with_x(&num)
        } else {
            num
        };
        let mut new_cp = TimeComposition::new(cp.kind, cp.sent_id, cp.begin, cp.end);
        new_cp.add(TimeData::new(class, value));
        cps[cpid] = new_cp;
    }
}

/// Apply the 0.5 fraction of 半 to duration/set compositions whose other
/// values are all whole numbers: each is halved (1 decimal place when not
/// whole) and the fraction datum dropped.
pub fn resolve_half_units(cps: &mut [TimeComposition]) {
    for cp in cps.iter_mut() {
        if !matches!(cp.kind, TimexKind::Duration | TimexKind::Set) {
            continue;
        }
        if cp.value_of(TimeClass::Fun) != "0.5" {
            continue;
        }
        if !cp
            .data()
            .iter()
            .filter(|td| td.class != TimeClass::Fun)
            .all(|td| is_digits(&td.value))
        {
            continue;
        }
        let mut new_cp = TimeComposition::new(cp.kind, cp.sent_id, cp.begin, cp.end);
        for td in cp.data() {
            if td.class == TimeClass::Fun {
                continue;
            }
            let val = td.value.parse::<f64>().unwrap_or(0.0) / 2.0;
            let value = if val.fract() == 0.0 {
                format!("{}", val as i64)
            } else {
                format!("{val:.1}")
            };
            new_cp.add(TimeData::new(td.class, value));
        }
        *cp = new_cp;
    }
}

// ── Era-code substitution ────────────────────────────────────────────────

static RE_H_FULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"H(\d\d)").expect("era regex"));
static RE_H_DEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"H(\d)X").expect("era regex"));
static RE_H_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"H(\d)").expect("era regex"));
static RE_S_FULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"S(\d\d)").expect("era regex"));
static RE_S_DEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"S(\d)X").expect("era regex"));
static RE_S_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"S(\d)").expect("era regex"));
static RE_R_FULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R(\d\d)").expect("era regex"));
static RE_R_DEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R(\d)X").expect("era regex"));
static RE_R_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R(\d)").expect("era regex"));

fn drop_last(s: String) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars.pop();
    chars.into_iter().collect()
}

/// Replace recent-era year codes (H/S/R) with western years. Decade forms
/// keep their trailing `X`; the 平成 decade offset reproduces the
/// original arithmetic verbatim.
pub fn substitute_era_codes(v: &str) -> String {
    let first = |re: &Regex| -> Option<i64> {
        re.captures(v).and_then(|c| c[1].parse().ok())
    };
    if let Some(n) = first(&RE_H_FULL) {
        let rep = (n + 1988).to_string();
        return RE_H_FULL.replace_all(v, NoExpand(&rep)).into_owned();
    }
    if RE_H_DEC.is_match(v) {
        if let Some(n) = first(&RE_H_DEC) {
            let rep = drop_last((n + 1988 + 5).to_string());
            return RE_H_ANY.replace_all(v, NoExpand(&rep)).into_owned();
        }
    }
    if let Some(n) = first(&RE_S_FULL) {
        let rep = (n + 1925).to_string();
        return RE_S_FULL.replace_all(v, NoExpand(&rep)).into_owned();
    }
    if RE_S_DEC.is_match(v) {
        if let Some(n) = first(&RE_S_DEC) {
            let rep = drop_last((n * 10 + 1925 + 5).to_string());
            return RE_S_ANY.replace_all(v, NoExpand(&rep)).into_owned();
        }
    }
    if let Some(n) = first(&RE_R_FULL) {
        let rep = (n + 2018).to_string();
        return RE_R_FULL.replace_all(v, NoExpand(&rep)).into_owned();
    }
    if RE_R_DEC.is_match(v) {
        if let Some(n) = first(&RE_R_DEC) {
            let rep = drop_last((n * 10 + 2018 + 5).to_string());
            return RE_R_ANY.replace_all(v, NoExpand(&rep)).into_owned();
        }
    }
    v.to_string()
}

// ── References ───────────────────────────────────────────────────────────

/// Reference compositions for one span: the document creation time plus
/// any usable preceding expressions, nearest first.
struct Refs {
    dct: TimeComposition,
    refs: Vec<TimeComposition>,
}

impl Refs {
    /// Candidates in preference order. An explicit DCT anchor, or an
    /// empty context, yields just the DCT.
    fn candidates(&self, prefer: Option<RefKind>) -> Vec<&TimeComposition> {
        if prefer == Some(RefKind::Dct) || self.refs.is_empty() {
            vec![&self.dct]
        } else {
            self.refs.iter().chain(std::iter::once(&self.dct)).collect()
        }
    }

    fn primary(&self, prefer: Option<RefKind>) -> &TimeComposition {
        self.candidates(prefer)[0]
    }
}

const YMD: [TimeClass; 3] = [TimeClass::Year, TimeClass::Month, TimeClass::Day];
const HMS: [TimeClass; 3] = [TimeClass::Hour, TimeClass::Minute, TimeClass::Second];

/// Rebuild a reference composition from an already resolved value.
/// Fields are consumed coarse to fine and stop at the first unusable one;
/// `FY`-prefixed years count as years.
fn reconstruct(v: &str, with_time: bool) -> Option<TimeComposition> {
    let mut rc = TimeComposition::new(TimexKind::Date, usize::MAX, 0, 0);
    let date_part = v.split('T').next().unwrap_or("");
    for (&tc, field) in YMD.iter().zip(date_part.split('-')) {
        if is_digits(field) {
            rc.add(TimeData::new(tc, field));
        } else if field.len() > 2 && field.starts_with("FY") && is_digits(&field[2..]) {
            rc.add(TimeData::new(tc, &field[2..]));
        } else {
            break;
        }
    }
    if !rc.is_valid() {
        return None;
    }
    if with_time {
        if let Some(time_part) = v.split('T').nth(1) {
            for (&tc, field) in HMS.iter().zip(time_part.split(':')) {
                if is_digits(field) {
                    rc.add(TimeData::new(tc, field));
                } else {
                    break;
                }
            }
        }
    }
    Some(rc)
}

fn find_refs(cpid: usize, cps: &[TimeComposition], v_list: &[String], dct: &str) -> Refs {
    let cp = &cps[cpid];

    let mut dct_cp = TimeComposition::new(TimexKind::Date, usize::MAX, 0, 0);
    let date_part = dct.split('T').next().unwrap_or("");
    for (&tc, field) in YMD.iter().zip(date_part.split('-')) {
        dct_cp.add(TimeData::new(tc, field));
    }

    let mut refs = Vec::new();
    for i in (0..cpid).rev() {
        let bef = &cps[i];
        if bef.sent_id == cp.sent_id {
            // A resolved DATE/TIME earlier in the same sentence.
            if matches!(bef.kind, TimexKind::Date | TimexKind::Time) {
                if let Some(rc) = reconstruct(&v_list[i], true) {
                    refs.push(rc);
                }
            }
        } else if refs.is_empty()
            && i + 1 == cpid
            && cp.data().iter().any(|td| td.ref_kind == Some(RefKind::Ref))
        {
            // Sentence-initial contextual expression: look one step into
            // the previous sentence.
            if !matches!(bef.kind, TimexKind::Date | TimexKind::Time)
                || !bef.is_valid()
                || cp.sent_id.saturating_sub(bef.sent_id) > 1
            {
                break;
            }
            let date_part = v_list[i].split('T').next().unwrap_or("");
            let mut rc = TimeComposition::new(TimexKind::Date, usize::MAX, 0, 0);
            for (&tc, field) in YMD.iter().zip(date_part.split('-')) {
                if is_digits(field) {
                    rc.add(TimeData::new(tc, field));
                }
            }
            if rc.is_valid() {
                refs.push(rc);
            }
            break;
        } else {
            break;
        }
    }

    tracing::debug!(cpid, n_refs = refs.len(), "collected references");
    Refs { dct: dct_cp, refs }
}

// ── Weekday consistency ──────────────────────────────────────────────────

/// Index of an immediately following weekday-only composition, if any.
fn weekday_target(cps: &[TimeComposition], cpid: usize) -> Option<usize> {
    let cp = &cps[cpid];
    let next = cps.get(cpid + 1)?;
    if next.sent_id == cp.sent_id
        && next.data().len() == 1
        && next.has(TimeClass::Youbi)
        && next.begin >= cp.end
        && next.begin - cp.end <= 1
    {
        Some(cpid + 1)
    } else {
        None
    }
}

/// `WXX-n` for the weekday of a full `Y-M-D` value, when it has one.
fn weekday_of(value: &str) -> Option<String> {
    let date = value.split('T').next()?;
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 3 || !parts.iter().all(|p| is_digits(p)) {
        return None;
    }
    let d = NaiveDate::from_ymd_opt(
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    )?;
    Some(format!("WXX-{}", d.weekday().number_from_monday()))
}

fn merge_weekday_final(
    cps: &[TimeComposition],
    v_list: &mut [String],
    cpid: usize,
    v: &str,
) -> bool {
    let Some(next_id) = weekday_target(cps, cpid) else {
        return false;
    };
    let Some(w) = weekday_of(v) else {
        return false;
    };
    if w == cps[next_id].value_of(TimeClass::Youbi) {
        v_list[cpid] = v.to_string();
        v_list[next_id] = v.to_string();
        return true;
    }
    false
}

fn merge_weekday_slots(
    cps: &[TimeComposition],
    v_list: &mut [String],
    cpid: usize,
    refs: &Refs,
    slots: &Slots,
) -> bool {
    let Some(next_id) = weekday_target(cps, cpid) else {
        return false;
    };
    for ref_cp in refs.candidates(None) {
        let tmp = slots2format(slots, Some(ref_cp));
        if let Some(w) = weekday_of(&tmp) {
            if w == cps[next_id].value_of(TimeClass::Youbi) {
                v_list[cpid] = tmp.clone();
                v_list[next_id] = tmp;
                return true;
            }
        }
    }
    false
}

// ── Value calculation ────────────────────────────────────────────────────

static RE_FINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\d[\dX]X").expect("finality regex"));

/// Resolve surface values into absolute values. Durations and sets pass
/// through unchanged; everything else is anchored against the document
/// creation time or preceding expressions.
pub fn calc_value(cps: &[TimeComposition], vfs_list: &[String], dct: &str) -> Vec<String> {
    let mut v_list = vfs_list.to_vec();

    for (cpid, cp) in cps.iter().enumerate() {
        if matches!(cp.kind, TimexKind::Duration | TimexKind::Set) {
            continue;
        }

        let v = substitute_era_codes(&v_list[cpid]);

        // Already absolute (decade forms count as final).
        if RE_FINAL.is_match(&v) || (!v.contains('X') && !v.starts_with('Q')) {
            v_list[cpid] = v.clone();
            merge_weekday_final(cps, &mut v_list, cpid, &v);
            continue;
        }

        let refs = find_refs(cpid, cps, &v_list, dct);

        // N年前 and friends: unit-by-unit offset from the reference.
        if cp.data().len() > 1 && cp.has(TimeClass::Fun) {
            v_list[cpid] = resolve_relative(cp, &refs).unwrap_or(v);
            continue;
        }

        let (slots, phrase) = fill_slots(cp, &refs);
        if merge_weekday_slots(cps, &mut v_list, cpid, &refs, &slots) {
            continue;
        }
        v_list[cpid] = if slots.iter().all(Option::is_none) {
            match phrase {
                Some(p) => p,
                None => slots2format(&slots, Some(refs.primary(None))),
            }
        } else {
            slots2format(&slots, Some(refs.primary(None)))
        };
    }
    v_list
}

/// Offset arithmetic for compositions holding a relative function datum:
/// walk units coarse to fine, copying reference slots and applying the
/// signed offset at each unit the composition names. Weeks are folded
/// into a day count first. `None` when the arithmetic cannot proceed.
fn resolve_relative(cp: &TimeComposition, refs: &Refs) -> Option<String> {
    let ref_cp = refs.primary(None);
    let rel = cp.get(TimeClass::Fun).and_then(|td| td.rel).unwrap_or(0);
    let min_class = cp
        .data()
        .iter()
        .filter(|td| td.class != TimeClass::Fun)
        .next_back()?
        .class;

    // N週間前: convert the week count to 7N days.
    let mut day_value: Option<String> = None;
    if let Some(week) = cp.get(TimeClass::Week) {
        if is_digits(&week.value) {
            let w: i64 = week.value.parse().ok()?;
            match cp.get(TimeClass::Day) {
                Some(d) if is_digits(&d.value) => {
                    let base: i64 = d.value.parse().ok()?;
                    day_value = Some((base + 7 * w).to_string());
                }
                Some(_) => {}
                None => day_value = Some((7 * w).to_string()),
            }
        }
    }

    let classes = [
        TimeClass::Year,
        TimeClass::Month,
        TimeClass::Day,
        TimeClass::Hour,
        TimeClass::Minute,
        TimeClass::Second,
    ];
    let mut slots: Slots = Default::default();
    for (i, &tc) in classes.iter().enumerate() {
        let ref_val = ref_cp.value_of(tc);
        let cp_val: &str = if tc == TimeClass::Day {
            day_value.as_deref().unwrap_or_else(|| cp.value_of(tc))
        } else {
            cp.value_of(tc)
        };
        if !is_digits(ref_val) && cp_val != "X" {
            break;
        }
        if is_digits(cp_val) {
            let diff = cp_val.parse::<i64>().ok()? * rel;
            let new_val = ref_val.parse::<i64>().ok()? + diff;
            if tc == TimeClass::Month && !(1..=12).contains(&new_val) {
                let year: i64 = slots[0].as_deref()?.parse().ok()?;
                slots[0] = Some((year + new_val.div_euclid(12)).to_string());
                slots[1] = Some(format!("{:02}", new_val.rem_euclid(12)));
            } else if tc == TimeClass::Day {
                let y: i32 = slots[0].as_deref()?.parse().ok()?;
                let m: u32 = slots[1].as_deref()?.parse().ok()?;
                let d: u32 = ref_val.parse().ok()?;
                let date = NaiveDate::from_ymd_opt(y, m, d)?
                    .checked_add_signed(Duration::days(diff))?;
                slots[0] = Some(format!("{:04}", date.year()));
                slots[1] = Some(format!("{:02}", date.month()));
                slots[2] = Some(format!("{:02}", date.day()));
            } else {
                slots[i] = Some(new_val.to_string());
            }
        } else if cp_val == "X" {
            slots[i] = Some(if tc == TimeClass::Year {
                "XXXX".to_string()
            } else {
                "XX".to_string()
            });
        } else {
            slots[i] = Some(ref_val.to_string());
        }
        if tc == min_class {
            break;
        }
    }
    Some(slots2format(&slots, None))
}

/// Slot filling for non-relative compositions that still carry unknowns.
fn fill_slots(cp: &TimeComposition, refs: &Refs) -> (Slots, Option<String>) {
    let mut slots: Slots = Default::default();
    let mut phrase: Option<String> = None;

    for td in cp.data() {
        match td.class {
            TimeClass::Century if slots[0].is_none() => {
                if let Some(rel) = td.rel {
                    let ref_year: String = refs
                        .primary(td.ref_kind)
                        .value_of(TimeClass::Year)
                        .chars()
                        .take(2)
                        .collect();
                    if let Ok(century) = ref_year.parse::<i64>() {
                        if is_digits(&td.value) {
                            let n: i64 = td.value.parse().unwrap_or(0);
                            slots[0] = Some(format!("{}XX", century + rel * n));
                        } else if rel == 0 {
                            slots[0] = Some(format!("{century}XX"));
                        }
                    }
                }
            }
            TimeClass::Gyear
            | TimeClass::Gyearx
            | TimeClass::Year
            | TimeClass::Yearx
            | TimeClass::Fyear
                if slots[0].is_none() =>
            {
                let ref_year = refs.primary(td.ref_kind).value_of(TimeClass::Year).to_string();
                if let Some(rel) = td.rel {
                    if is_digits(&td.value) {
                        if let (Ok(r), Ok(n)) =
                            (ref_year.parse::<i64>(), td.value.parse::<i64>())
                        {
                            slots[0] = Some((r + rel * n).to_string());
                        }
                    } else if rel == 0 && !ref_year.is_empty() {
                        slots[0] = Some(ref_year.clone());
                    }
                } else if td.value.chars().count() == 2 {
                    // 02年 / 30年代: try this century and its neighbors,
                    // keep the candidate closest to the reference year.
                    let century: String = ref_year.chars().take(2).collect();
                    if let (Ok(c), Ok(r)) = (century.parse::<i64>(), ref_year.parse::<i64>()) {
                        let body = td.value.replace('X', "0");
                        let cands = [
                            format!("{c}{body}"),
                            format!("{}{body}", c + 1),
                            format!("{}{body}", c - 1),
                        ];
                        let val = cands
                            .iter()
                            .min_by_key(|k| {
                                k.parse::<i64>().map(|n| (n - r).abs()).unwrap_or(i64::MAX)
                            })
                            .cloned();
                        if let Some(val) = val {
                            slots[0] = Some(if td.value.contains('X') {
                                replace_last_with_x(&val)
                            } else {
                                val
                            });
                        }
                    }
                } else {
                    slots[0] = Some(td.value.clone());
                }
                if td.class == TimeClass::Fyear {
                    if let Some(y) = slots[0].take() {
                        slots[0] = Some(format!("FY{y}"));
                    }
                }
            }
            TimeClass::Week if slots[1].is_none() => {
                slots[1] = Some("WXX".to_string());
            }
            TimeClass::Month | TimeClass::Season | TimeClass::Youbi if slots[1].is_none() => {
                if td.value == "X" {
                    slots[1] = Some("XX".to_string());
                } else if td.class == TimeClass::Month && td.ref_kind.is_some() {
                    let mut visited = false;
                    for ref_cp in refs.candidates(td.ref_kind) {
                        let ref_year = ref_cp.value_of(TimeClass::Year);
                        let ref_month = ref_cp.value_of(TimeClass::Month);
                        if ref_year.is_empty() || ref_month.is_empty() {
                            continue;
                        }
                        visited = true;
                        if td.rel == Some(0) {
                            if let Ok(m) = ref_month.parse::<i64>() {
                                slots[0] = Some(ref_year.to_string());
                                slots[1] = Some(format!("{m:02}"));
                            }
                        } else if is_digits(&td.value) {
                            if let (Ok(rm), Ok(n)) =
                                (ref_month.parse::<i64>(), td.value.parse::<i64>())
                            {
                                let m = rm + td.rel.unwrap_or(0) * n;
                                if !(1..=12).contains(&m) {
                                    if let Ok(ry) = ref_year.parse::<i64>() {
                                        slots[0] =
                                            Some((ry + m.div_euclid(12)).to_string());
                                        slots[1] = Some(format!("{:02}", m.rem_euclid(12)));
                                    }
                                } else {
                                    slots[1] = Some(format!("{m:02}"));
                                    slots[0] = Some(ref_year.to_string());
                                }
                            }
                        }
                        break;
                    }
                    if !visited {
                        slots[1] = Some("XX".to_string());
                    }
                } else {
                    slots[1] = Some(pad2(&td.value));
                }
            }
            TimeClass::Day if slots[2].is_none() => {
                if td.value == "X" {
                    slots[2] = Some("XX".to_string());
                } else if td.ref_kind.is_some() {
                    let mut visited = false;
                    for ref_cp in refs.candidates(td.ref_kind) {
                        let ref_year = ref_cp.value_of(TimeClass::Year);
                        let ref_month = ref_cp.value_of(TimeClass::Month);
                        let ref_day = ref_cp.value_of(TimeClass::Day);
                        if ref_year.is_empty() || ref_month.is_empty() || ref_day.is_empty() {
                            continue;
                        }
                        visited = true;
                        if td.rel == Some(0) {
                            if let Ok(d) = ref_day.parse::<i64>() {
                                slots[0] = Some(ref_year.to_string());
                                slots[1] = Some(ref_month.to_string());
                                slots[2] = Some(format!("{d:02}"));
                            }
                        } else if is_digits(&td.value) {
                            let date = NaiveDate::from_ymd_opt(
                                ref_year.parse().unwrap_or(0),
                                ref_month.parse().unwrap_or(0),
                                ref_day.parse().unwrap_or(0),
                            );
                            if let (Some(date), Ok(n)) = (date, td.value.parse::<i64>()) {
                                if let Some(nd) = date.checked_add_signed(Duration::days(
                                    td.rel.unwrap_or(0) * n,
                                )) {
                                    slots[0] = Some(format!("{:04}", nd.year()));
                                    slots[1] = Some(format!("{:02}", nd.month()));
                                    slots[2] = Some(format!("{:02}", nd.day()));
                                }
                            }
                        }
                        break;
                    }
                    if !visited {
                        slots[2] = Some("XX".to_string());
                    }
                } else {
                    slots[2] = Some(pad2(&td.value));
                }
            }
            TimeClass::Jun if slots[2].is_none() => {
                slots[2] = Some(if td.value == "X" || td.ref_kind.is_some() {
                    "XX".to_string()
                } else {
                    pad2(&td.value)
                });
            }
            TimeClass::Hour if slots[3].is_none() => {
                if td.value == "X" {
                    slots[3] = Some("XX".to_string());
                } else {
                    let mut strnum = td.value.clone();
                    if let Ok(h) = strnum.parse::<i64>() {
                        if h >= 24 {
                            strnum = (h - 24).to_string();
                        }
                    }
                    slots[3] = Some(pad2(&strnum));
                }
            }
            TimeClass::Minute if slots[4].is_none() => {
                slots[4] = Some(if td.value == "X" {
                    "XX".to_string()
                } else {
                    pad2(&td.value)
                });
            }
            TimeClass::Second if slots[5].is_none() => {
                slots[5] = Some(if td.value == "X" {
                    "XX".to_string()
                } else {
                    pad2(&td.value)
                });
            }
            TimeClass::Phrase => phrase = Some(td.value.clone()),
            _ => {}
        }
    }
    (slots, phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comp(kind: TimexKind, sent_id: usize, begin: usize, end: usize, data: Vec<TimeData>) -> TimeComposition {
        let mut c = TimeComposition::new(kind, sent_id, begin, end);
        for td in data {
            c.add(td);
        }
        c
    }

    #[test]
    fn test_era_code_substitution() {
        assert_eq!(substitute_era_codes("H02-03"), "1990-03");
        assert_eq!(substitute_era_codes("S63"), "1988");
        assert_eq!(substitute_era_codes("R02"), "2020");
        // Decade forms keep the trailing X.
        assert_eq!(substitute_era_codes("S3X"), "196X");
        assert_eq!(substitute_era_codes("R0X"), "202X");
        assert_eq!(substitute_era_codes("2020-03"), "2020-03");
    }

    #[test]
    fn test_relative_year_from_dct() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            2,
            vec![
                TimeData::anchored(TimeClass::Fun, "1", None, 1),
                TimeData::anchored(TimeClass::Year, "1", Some(RefKind::Dct), 1),
            ],
        );
        let v = calc_value(&[cp], &["Q+1Y".to_string()], "2020-06-15");
        assert_eq!(v, vec!["2021"]);
    }

    #[test]
    fn test_day_offset_crosses_month() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            4,
            vec![
                TimeData::anchored(TimeClass::Fun, "1", Some(RefKind::Ref), 1),
                TimeData::new(TimeClass::Day, "32"),
            ],
        );
        let v = calc_value(&[cp], &["Q+32D".to_string()], "2020-01-20");
        assert_eq!(v, vec!["2020-02-21"]);
    }

    #[test]
    fn test_week_converted_to_days() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            3,
            vec![
                TimeData::anchored(TimeClass::Fun, "1", Some(RefKind::Ref), -1),
                TimeData::new(TimeClass::Week, "2"),
            ],
        );
        let v = calc_value(&[cp], &["Q-2W".to_string()], "2020-06-15");
        assert_eq!(v, vec!["2020-06-01"]);
    }

    #[test]
    fn test_day_only_filled_from_dct() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            3,
            vec![TimeData::new(TimeClass::Day, "10")],
        );
        let v = calc_value(&[cp], &["XXXX-XX-10".to_string()], "2020-06-15");
        assert_eq!(v, vec!["2020-06-10"]);
    }

    #[test]
    fn test_two_digit_year_nearest_century() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            3,
            vec![TimeData::new(TimeClass::Year, "98")],
        );
        let v = calc_value(&[cp], &["XX98".to_string()], "2020-06-15");
        assert_eq!(v, vec!["1998"]);
    }

    #[test]
    fn test_decade_resolution() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            4,
            vec![TimeData::new(TimeClass::Yearx, "3X")],
        );
        let v = calc_value(&[cp], &["XX3X".to_string()], "2020-06-15");
        assert_eq!(v, vec!["203X"]);
    }

    #[test]
    fn test_weekday_merge_on_match() {
        let day = comp(
            TimexKind::Date,
            0,
            0,
            3,
            vec![TimeData::new(TimeClass::Day, "10")],
        );
        // 2020-06-10 is a Wednesday.
        let youbi = comp(
            TimexKind::Date,
            0,
            3,
            6,
            vec![TimeData::new(TimeClass::Youbi, "WXX-3")],
        );
        let v = calc_value(
            &[day, youbi],
            &["XXXX-XX-10".to_string(), "XXXX-WXX-3".to_string()],
            "2020-06-08",
        );
        assert_eq!(v, vec!["2020-06-10", "2020-06-10"]);
    }

    #[test]
    fn test_weekday_mismatch_stays_independent() {
        let day = comp(
            TimexKind::Date,
            0,
            0,
            3,
            vec![TimeData::new(TimeClass::Day, "10")],
        );
        let youbi = comp(
            TimexKind::Date,
            0,
            3,
            6,
            vec![TimeData::new(TimeClass::Youbi, "WXX-5")],
        );
        let v = calc_value(
            &[day, youbi],
            &["XXXX-XX-10".to_string(), "XXXX-WXX-5".to_string()],
            "2020-06-08",
        );
        assert_eq!(v[0], "2020-06-10");
        assert_eq!(v[1], "2020-WXX-5");
    }

    #[test]
    fn test_parallel_list_merge() {
        // 17、18日: the bare numeral inherits the day class.
        let mut cps = vec![
            comp(
                TimexKind::Date,
                0,
                0,
                2,
                vec![TimeData::new(TimeClass::Num, "17")],
            ),
            comp(
                TimexKind::Date,
                0,
                3,
                6,
                vec![TimeData::new(TimeClass::Day, "18")],
            ),
        ];
        resolve_parallel_lists(&mut cps);
        assert_eq!(cps[0].value_of(TimeClass::Day), "17");
        assert_eq!(cps[0].sent_id, 0);
        assert_eq!((cps[0].begin, cps[0].end), (0, 2));
    }

    #[test]
    fn test_parallel_list_cascades() {
        let mut cps = vec![
            comp(TimexKind::Date, 0, 0, 2, vec![TimeData::new(TimeClass::Num, "15")]),
            comp(TimexKind::Date, 0, 3, 5, vec![TimeData::new(TimeClass::Num, "16")]),
            comp(TimexKind::Date, 0, 6, 9, vec![TimeData::new(TimeClass::Day, "17")]),
        ];
        resolve_parallel_lists(&mut cps);
        assert_eq!(cps[0].value_of(TimeClass::Day), "15");
        assert_eq!(cps[1].value_of(TimeClass::Day), "16");
    }

    #[test]
    fn test_half_unit() {
        let mut cps = vec![comp(
            TimexKind::Duration,
            0,
            0,
            2,
            vec![
                TimeData::new(TimeClass::Fun, "0.5"),
                TimeData::new(TimeClass::Year, "1"),
            ],
        )];
        resolve_half_units(&mut cps);
        assert!(!cps[0].has(TimeClass::Fun));
        assert_eq!(cps[0].value_of(TimeClass::Year), "0.5");

        let mut cps = vec![comp(
            TimexKind::Duration,
            0,
            0,
            2,
            vec![
                TimeData::new(TimeClass::Fun, "0.5"),
                TimeData::new(TimeClass::Day, "4"),
            ],
        )];
        resolve_half_units(&mut cps);
        assert_eq!(cps[0].value_of(TimeClass::Day), "2");
    }

    #[test]
    fn test_final_values_untouched() {
        let cp = comp(
            TimexKind::Date,
            0,
            0,
            8,
            vec![
                TimeData::new(TimeClass::Year, "2020"),
                TimeData::new(TimeClass::Month, "3"),
            ],
        );
        let v = calc_value(&[cp], &["2020-03".to_string()], "2021-01-01");
        assert_eq!(v, vec!["2020-03"]);
    }

    #[test]
    fn test_same_sentence_reference_preferred() {
        // 翌年 after an explicit year resolves against it, not the DCT.
        let year = comp(
            TimexKind::Date,
            0,
            0,
            5,
            vec![TimeData::new(TimeClass::Year, "1998")],
        );
        let next_year = comp(
            TimexKind::Date,
            0,
            6,
            8,
            vec![
                TimeData::anchored(TimeClass::Fun, "1", Some(RefKind::Ref), 1),
                TimeData::anchored(TimeClass::Year, "1", Some(RefKind::Ref), 1),
            ],
        );
        let v = calc_value(
            &[year, next_year],
            &["1998".to_string(), "Q+1Y".to_string()],
            "2020-06-15",
        );
        assert_eq!(v, vec!["1998", "1999"]);
    }
}
