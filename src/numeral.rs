//! Japanese numeral parsing: kanji, Arabic, and full-width digits, the
//! magnitude markers 十/百/千, and the unknown-quantity characters 数/何
//! (which become `X` digits at their positional weight).

/// One recognized numeral character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumToken {
    /// A digit 0-9.
    Digit(u32),
    /// A magnitude marker: 10, 100, or 1000.
    Magnitude(u32),
    /// 数 or 何: a digit of unknown value.
    Unknown,
}

/// One place in the four-slot reconstruction (ones/tens/hundreds/thousands).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    Digit(u32),
    Unknown,
}

fn token_of(c: char) -> Option<NumToken> {
    let tok = match c {
        '0' | '０' | '〇' | '零' => NumToken::Digit(0),
        '1' | '１' | '一' => NumToken::Digit(1),
        '2' | '２' | '二' => NumToken::Digit(2),
        '3' | '３' | '三' => NumToken::Digit(3),
        '4' | '４' | '四' => NumToken::Digit(4),
        '5' | '５' | '五' => NumToken::Digit(5),
        '6' | '６' | '六' => NumToken::Digit(6),
        '7' | '７' | '七' => NumToken::Digit(7),
        '8' | '８' | '八' => NumToken::Digit(8),
        '9' | '９' | '九' => NumToken::Digit(9),
        '十' => NumToken::Magnitude(10),
        '百' => NumToken::Magnitude(100),
        '千' => NumToken::Magnitude(1000),
        '数' | '何' => NumToken::Unknown,
        _ => return None,
    };
    Some(tok)
}

/// True when `c` on its own reads as a numeral character (the masking
/// predicate for `#`). The katakana pair ゼロ is handled separately.
pub fn is_numeral_char(c: char) -> bool {
    token_of(c).is_some()
}

/// Tokenize a string. `None` as soon as any character is not a numeral;
/// the two-character sequence ゼロ reads as a single zero.
fn tokenize(s: &str) -> Option<Vec<NumToken>> {
    let chars: Vec<char> = s.chars().collect();
    let mut toks = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == 'ゼ' && i + 1 < chars.len() && chars[i + 1] == 'ロ' {
            toks.push(NumToken::Digit(0));
            i += 2;
            continue;
        }
        toks.push(token_of(chars[i])?);
        i += 1;
    }
    Some(toks)
}

/// Parse a numeral string into its decimal-digit form, `X` marking unknown
/// digits. Leading zeros are preserved (`〇三` → `"03"`). Returns `None`
/// when the string contains a non-numeral character, is empty, or carries
/// no concrete digit at all (bare 数/何).
pub fn parse_numeral(s: &str) -> Option<String> {
    let toks = tokenize(s)?;
    if toks.is_empty() {
        return None;
    }

    if toks.iter().any(|t| matches!(t, NumToken::Magnitude(_))) {
        return Some(from_magnitudes(&toks));
    }

    // Plain positional digits, possibly with unknown places.
    if toks.iter().all(|t| matches!(t, NumToken::Unknown)) {
        return None;
    }
    let mut num: u64 = 0;
    for (k, t) in toks.iter().rev().enumerate() {
        if let NumToken::Digit(d) = t {
            // Runs too wide for u64 degrade to no value.
            num = num.checked_add(
                u64::from(*d).checked_mul(10u64.checked_pow(k as u32)?)?,
            )?;
        }
    }
    let mut digits: Vec<char> = num.to_string().chars().collect();
    for (k, t) in toks.iter().rev().enumerate() {
        if matches!(t, NumToken::Unknown) && k < digits.len() {
            let pos = digits.len() - 1 - k;
            digits[pos] = 'X';
        }
    }
    let mut out: String = digits.into_iter().collect();
    if toks[0] == NumToken::Digit(0) && toks.len() > 1 {
        out.insert(0, '0');
    }
    Some(out)
}

/// Reconstruct a value containing 十/百/千 through four place slots.
/// 二百三十 → 230; 百二十 → 120 (bare leading magnitude counts as one);
/// 十数 → `1X`; 数十 → `X0`.
fn from_magnitudes(toks: &[NumToken]) -> String {
    let mut places: [Place; 4] = [Place::Digit(0); 4];
    let mut pending: Option<Place> = None;
    for t in toks {
        match t {
            NumToken::Unknown => pending = Some(Place::Unknown),
            NumToken::Digit(d) => pending = Some(Place::Digit(*d)),
            NumToken::Magnitude(m) => {
                let idx = match m {
                    10 => 1,
                    100 => 2,
                    _ => 3,
                };
                places[idx] = pending.take().unwrap_or(Place::Digit(1));
            }
        }
    }
    if let Some(p) = pending {
        places[0] = p;
    }

    let mut num: u64 = 0;
    for (k, p) in places.iter().enumerate() {
        let d = match p {
            Place::Digit(d) => u64::from(*d),
            Place::Unknown => 1,
        };
        num += d * 10u64.pow(k as u32);
    }
    let mut digits: Vec<char> = num.to_string().chars().collect();
    for (k, p) in places.iter().enumerate() {
        if matches!(p, Place::Unknown) && k < digits.len() {
            let pos = digits.len() - 1 - k;
            digits[pos] = 'X';
        }
    }
    digits.into_iter().collect()
}
