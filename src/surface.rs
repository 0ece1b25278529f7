//! Surface-value calculation: what the span text alone says, rendered in
//! TIMEX3 shape (`XXXX-XX-XXTXX:XX:XX` with unknown slots as `X`,
//! relative forms as `Q`-prefixed, durations as `P...`).

use timex_types::TimexKind;

use crate::composition::{TimeClass, TimeComposition};

/// The six value slots: year, month/week, day, hour, minute, second.
pub type Slots = [Option<String>; 6];

fn sep(i: usize) -> char {
    match i {
        0 | 1 => '-',
        2 => 'T',
        _ => ':',
    }
}

fn pad2(s: &str) -> String {
    let len = s.chars().count();
    format!("{}{s}", "0".repeat(2usize.saturating_sub(len)))
}

pub fn replace_last_with_x(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    match chars.last_mut() {
        Some(last) => *last = 'X',
        None => chars.push('X'),
    }
    chars.into_iter().collect()
}

/// Join filled slots bottom-up into TIMEX3 format, backfilling every
/// coarser gap once a finer slot was seen. Gaps are filled from `ref_cp`
/// when given, else with `XXXX`/`XX`. A fully numeric year before 1868 in
/// a complete date appends the old-calendar marker `Q`.
pub fn slots2format(slots: &Slots, ref_cp: Option<&TimeComposition>) -> String {
    let mut out = String::new();
    let mut seen = false;
    for i in (0..6).rev() {
        if let Some(s) = &slots[i] {
            if seen {
                out = format!("{s}{}{out}", sep(i));
            } else {
                out = s.clone();
            }
            seen = true;
        } else if seen {
            let filler = backfill(i, ref_cp);
            out = format!("{filler}{}{out}", sep(i));
        }
    }

    let head = out.split('-').next().unwrap_or("");
    if !head.is_empty()
        && head.chars().all(|c| c.is_ascii_digit())
        && head.parse::<i64>().is_ok_and(|y| y < 1868)
        && out.matches('-').count() == 2
    {
        out.push('Q');
    }
    out
}

fn backfill(i: usize, ref_cp: Option<&TimeComposition>) -> String {
    let (class, dflt) = match i {
        0 => (TimeClass::Year, "XXXX"),
        1 => (TimeClass::Month, "XX"),
        2 => (TimeClass::Day, "XX"),
        3 => (TimeClass::Hour, "XX"),
        _ => (TimeClass::Minute, "XX"),
    };
    match ref_cp {
        Some(rc) => {
            let v = rc.value_of(class);
            if v.is_empty() {
                dflt.to_string()
            } else {
                v.to_string()
            }
        }
        None => dflt.to_string(),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Surface values for all compositions. Computed in order: a short year
/// (02年) inherits an era prefix from the previous span's surface value.
pub fn calc_surface(cps: &[TimeComposition]) -> Vec<String> {
    let mut vfs_list = vec![String::new(); cps.len()];
    for (cpid, cp) in cps.iter().enumerate() {
        if !cp.is_valid() {
            continue;
        }
        vfs_list[cpid] = match cp.kind {
            TimexKind::Date | TimexKind::Time => date_time_surface(cp, cpid, &vfs_list),
            TimexKind::Set if !cp.value_of(TimeClass::Youbi).is_empty() => {
                format!("XXXX-{}", cp.value_of(TimeClass::Youbi))
            }
            _ => duration_surface(cp),
        };
    }
    vfs_list
}

fn date_time_surface(cp: &TimeComposition, cpid: usize, vfs_list: &[String]) -> String {
    // 2年前 --> Q-2Y
    if cp.has(TimeClass::Fun) {
        let rel = cp.get(TimeClass::Fun).and_then(|td| td.rel);
        let mut vfs = match rel {
            Some(1) => "Q+",
            Some(-1) => "Q-",
            _ => "Q",
        }
        .to_string();
        for td in cp.data() {
            if matches!(td.class, TimeClass::Fun | TimeClass::Mod) {
                continue;
            }
            vfs.push_str(&td.value);
            vfs.push(td.class.initial());
        }
        return vfs;
    }

    let mut phrase: Option<&str> = None;
    let mut slots: Slots = Default::default();
    for td in cp.data() {
        let strnum = td.value.as_str();
        let anchored = td.ref_kind.is_some();
        match td.class {
            TimeClass::Century if slots[0].is_none() => {
                slots[0] = Some(if anchored {
                    "XXXX".to_string()
                } else if is_digits(strnum) {
                    format!("{}XX", strnum.parse::<i64>().unwrap_or(1) - 1)
                } else {
                    strnum.to_string()
                });
            }
            TimeClass::Gyear if slots[0].is_none() => {
                slots[0] = Some(strnum.to_string());
            }
            TimeClass::Gyearx if slots[0].is_none() => {
                slots[0] = Some(replace_last_with_x(strnum));
            }
            TimeClass::Year | TimeClass::Yearx if slots[0].is_none() => {
                let len = strnum.chars().count();
                let mut year = if anchored {
                    "XXXX".to_string()
                } else if len <= 2 {
                    // 02年: inherit the era prefix of the previous span.
                    let prev = if cpid > 0 { vfs_list[cpid - 1].as_str() } else { "" };
                    let era = prev.chars().next().filter(|c| matches!(c, 'H' | 'S' | 'R'));
                    match (era, is_digits(strnum)) {
                        (Some(c), true) => {
                            format!("{c}{:02}", strnum.parse::<i64>().unwrap_or(0))
                        }
                        _ => format!("{}{strnum}", "X".repeat(4 - len)),
                    }
                } else {
                    strnum.to_string()
                };
                if td.class == TimeClass::Yearx {
                    year = replace_last_with_x(&year);
                }
                slots[0] = Some(year);
            }
            TimeClass::Gfyear if slots[0].is_none() => {
                slots[0] = Some(format!("FY{strnum}"));
            }
            TimeClass::Fyear if slots[0].is_none() => {
                let len = strnum.chars().count();
                slots[0] = Some(if anchored {
                    "FYXXXX".to_string()
                } else if len <= 2 {
                    format!("FY{}{strnum}", "X".repeat(4 - len))
                } else {
                    format!("FY{strnum}")
                });
            }
            TimeClass::Month | TimeClass::Season | TimeClass::Youbi if slots[1].is_none() => {
                slots[1] = Some(if strnum == "X" || anchored {
                    "XX".to_string()
                } else {
                    pad2(strnum)
                });
            }
            TimeClass::Week if slots[1].is_none() => {
                slots[1] = Some("WXX".to_string());
            }
            TimeClass::Day | TimeClass::Jun if slots[2].is_none() => {
                slots[2] = Some(if strnum == "X" || anchored {
                    "XX".to_string()
                } else {
                    pad2(strnum)
                });
            }
            TimeClass::Hour if slots[3].is_none() => {
                slots[3] = Some(if strnum == "X" || anchored {
                    "XX".to_string()
                } else {
                    pad2(strnum)
                });
            }
            TimeClass::Minute if slots[4].is_none() => {
                slots[4] = Some(if strnum == "X" || anchored {
                    "XX".to_string()
                } else {
                    pad2(strnum)
                });
            }
            TimeClass::Second if slots[5].is_none() => {
                slots[5] = Some(if strnum == "X" || anchored {
                    "XX".to_string()
                } else {
                    pad2(strnum)
                });
            }
            TimeClass::Phrase => phrase = Some(strnum),
            _ => {}
        }
    }

    let vfs = slots2format(&slots, None);
    if vfs.is_empty() {
        if let Some(p) = phrase {
            return p.to_string();
        }
    }
    vfs
}

fn duration_surface(cp: &TimeComposition) -> String {
    let mut vfs = String::from("P");
    let mut clock_pending = true;
    let mut used: Vec<TimeClass> = Vec::new();
    for td in cp.data() {
        if td.class == TimeClass::Phrase {
            continue;
        }
        if clock_pending
            && matches!(
                td.class,
                TimeClass::Hour | TimeClass::Minute | TimeClass::Second
            )
        {
            vfs.push('T');
            clock_pending = false;
        }
        if !used.contains(&td.class) && !td.value.is_empty() {
            if td.class == TimeClass::Num {
                continue;
            }
            if td.class == TimeClass::Fyear {
                vfs.push_str(&format!("{}FY", td.value));
            } else {
                vfs.push_str(&td.value);
                vfs.push(td.class.initial());
            }
            used.push(td.class);
        }
    }
    // A bare numeral duration counts as years.
    if vfs == "P" && !cp.value_of(TimeClass::Num).is_empty() {
        vfs.push_str(&format!("{}Y", cp.value_of(TimeClass::Num)));
    }
    if vfs == "P" {
        vfs = "None".to_string();
    }
    vfs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{RefKind, TimeData};

    fn cp(kind: TimexKind, data: Vec<TimeData>) -> TimeComposition {
        let mut c = TimeComposition::new(kind, 0, 0, 0);
        for td in data {
            c.add(td);
        }
        c
    }

    #[test]
    fn test_full_date() {
        let c = cp(
            TimexKind::Date,
            vec![
                TimeData::new(TimeClass::Year, "2020"),
                TimeData::new(TimeClass::Month, "3"),
                TimeData::new(TimeClass::Day, "15"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["2020-03-15"]);
    }

    #[test]
    fn test_gap_backfilled() {
        let c = cp(
            TimexKind::Date,
            vec![
                TimeData::new(TimeClass::Year, "2020"),
                TimeData::new(TimeClass::Day, "15"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["2020-XX-15"]);
    }

    #[test]
    fn test_day_only() {
        let c = cp(TimexKind::Date, vec![TimeData::new(TimeClass::Day, "10")]);
        assert_eq!(calc_surface(&[c]), vec!["XXXX-XX-10"]);
    }

    #[test]
    fn test_century() {
        let c = cp(
            TimexKind::Date,
            vec![TimeData::new(TimeClass::Century, "21")],
        );
        assert_eq!(calc_surface(&[c]), vec!["20XX"]);
    }

    #[test]
    fn test_relative_year() {
        let c = cp(
            TimexKind::Date,
            vec![
                TimeData::anchored(TimeClass::Fun, "1", None, -1),
                TimeData::anchored(TimeClass::Year, "1", Some(RefKind::Dct), -1),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["Q-1Y"]);
    }

    #[test]
    fn test_era_prefix_inherited_by_short_year() {
        let first = cp(
            TimexKind::Date,
            vec![TimeData::new(TimeClass::Gyear, "H13")],
        );
        let second = cp(TimexKind::Date, vec![TimeData::new(TimeClass::Year, "2")]);
        assert_eq!(calc_surface(&[first, second]), vec!["H13", "H02"]);
    }

    #[test]
    fn test_short_year_padded_without_era_context() {
        let c = cp(TimexKind::Date, vec![TimeData::new(TimeClass::Year, "98")]);
        assert_eq!(calc_surface(&[c]), vec!["XX98"]);
    }

    #[test]
    fn test_decade() {
        let c = cp(
            TimexKind::Date,
            vec![TimeData::new(TimeClass::Yearx, "193X")],
        );
        assert_eq!(calc_surface(&[c]), vec!["193X"]);
    }

    #[test]
    fn test_lunar_marker() {
        let c = cp(
            TimexKind::Date,
            vec![
                TimeData::new(TimeClass::Year, "1860"),
                TimeData::new(TimeClass::Month, "1"),
                TimeData::new(TimeClass::Day, "5"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["1860-01-05Q"]);
    }

    #[test]
    fn test_time_slots() {
        let c = cp(
            TimexKind::Time,
            vec![
                TimeData::new(TimeClass::Hour, "15"),
                TimeData::new(TimeClass::Minute, "30"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["XXXX-XX-XXT15:30"]);
    }

    #[test]
    fn test_duration() {
        let c = cp(
            TimexKind::Duration,
            vec![
                TimeData::new(TimeClass::Year, "2"),
                TimeData::new(TimeClass::Month, "6"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["P2Y6M"]);
        let c = cp(TimexKind::Duration, vec![TimeData::new(TimeClass::Hour, "1.5")]);
        assert_eq!(calc_surface(&[c]), vec!["PT1.5H"]);
    }

    #[test]
    fn test_duration_bare_numeral_counts_as_years() {
        let c = cp(TimexKind::Duration, vec![TimeData::new(TimeClass::Num, "5")]);
        assert_eq!(calc_surface(&[c]), vec!["P5Y"]);
    }

    #[test]
    fn test_set_with_weekday() {
        let c = cp(
            TimexKind::Set,
            vec![
                TimeData::new(TimeClass::Week, "1"),
                TimeData::new(TimeClass::Youbi, "WXX-2"),
            ],
        );
        assert_eq!(calc_surface(&[c]), vec!["XXXX-WXX-2"]);
    }

    #[test]
    fn test_phrase_fallback() {
        let c = cp(
            TimexKind::Date,
            vec![TimeData::new(TimeClass::Phrase, "PRESENT_REF")],
        );
        assert_eq!(calc_surface(&[c]), vec!["PRESENT_REF"]);
    }

    #[test]
    fn test_unmatched_is_empty() {
        let c = TimeComposition::new(TimexKind::Date, 0, 0, 0);
        assert_eq!(calc_surface(&[c]), vec![""]);
    }
}
