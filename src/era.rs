//! Japanese era (元号) table: builtin entries plus an optional JSON
//! override, and era-year → western-year conversion.

use std::path::Path;

use serde::Deserialize;

use crate::rules::ConfigError;

/// One era. `begin_year` is the western year of era year 1 minus one, so
/// era year `n` is `begin_year + n`. The three recent eras carry a
/// single-letter TIMEX code and render as `{code}{yy:02}` instead of a
/// western year, so the era information survives into the surface value.
#[derive(Debug, Clone, Deserialize)]
pub struct Era {
    pub name: String,
    pub begin_year: i64,
    #[serde(default)]
    pub code: Option<char>,
}

const BUILTIN: &[(&str, i64, Option<char>)] = &[
    ("令和", 2018, Some('R')),
    ("平成", 1988, Some('H')),
    ("昭和", 1925, Some('S')),
    ("大正", 1911, None),
    ("明治", 1867, None),
    ("慶応", 1864, None),
];

#[derive(Debug, Clone)]
pub struct EraTable {
    eras: Vec<Era>,
}

impl EraTable {
    pub fn builtin() -> Self {
        let eras = BUILTIN
            .iter()
            .map(|&(name, begin_year, code)| Era {
                name: name.to_string(),
                begin_year,
                code,
            })
            .collect();
        EraTable { eras }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let eras: Vec<Era> = serde_json::from_str(json)?;
        Ok(EraTable { eras })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn find(&self, name: &str) -> Option<&Era> {
        self.eras.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Era> {
        self.eras.iter()
    }

    /// Convert an era-year value string. Coded eras yield `{code}{yy:02}`;
    /// offset-only eras yield the western year. A value that is not a
    /// plain integer (e.g. contains `X`) passes through unchanged.
    pub fn convert(&self, era_name: &str, value: &str) -> Option<String> {
        let era = self.find(era_name)?;
        let Ok(n) = value.parse::<i64>() else {
            return Some(value.to_string());
        };
        Some(match era.code {
            Some(c) => format!("{c}{n:02}"),
            None => (era.begin_year + n).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_eras() {
        let t = EraTable::builtin();
        assert_eq!(t.convert("平成", "2"), Some("H02".to_string()));
        assert_eq!(t.convert("昭和", "63"), Some("S63".to_string()));
        assert_eq!(t.convert("令和", "2"), Some("R02".to_string()));
    }

    #[test]
    fn test_offset_eras() {
        let t = EraTable::builtin();
        assert_eq!(t.convert("明治", "10"), Some("1877".to_string()));
        assert_eq!(t.convert("大正", "1"), Some("1912".to_string()));
    }

    #[test]
    fn test_unknown_era_and_value() {
        let t = EraTable::builtin();
        assert_eq!(t.convert("天平", "2"), None);
        // Non-integer year passes through.
        assert_eq!(t.convert("平成", "X"), Some("X".to_string()));
    }

    #[test]
    fn test_override_parsing() {
        let t = EraTable::from_json(
            r#"[{"name": "平成", "begin_year": 1988, "code": "H"}]"#,
        )
        .unwrap();
        assert_eq!(t.convert("平成", "31"), Some("H31".to_string()));
        assert!(t.find("昭和").is_none());
    }
}
