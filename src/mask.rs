//! Span masking: rewrites candidate-span characters into the rule
//! alphabet. Numerals become `#`, the unknown-quantity characters 数/何
//! become `&`, era names become `%` (one `%` per character). Characters
//! outside every span, and non-temporal characters inside spans, pass
//! through untouched, so mask and sentence stay index-aligned.

use timex_types::CandidateSpan;

use crate::era::EraTable;
use crate::numeral::is_numeral_char;

pub fn mask_sentence(sentence: &[char], spans: &[CandidateSpan], eras: &EraTable) -> Vec<char> {
    let mut masked = sentence.to_vec();
    for span in spans {
        let begin = span.begin.min(sentence.len());
        let end = span.end.min(sentence.len());
        for i in begin..end {
            let c = sentence[i];
            if c == '数' || c == '何' {
                masked[i] = '&';
            } else if is_numeral_char(c) {
                masked[i] = '#';
            } else if c == 'ゼ' && i + 1 < end && sentence[i + 1] == 'ロ' {
                masked[i] = '#';
                masked[i + 1] = '#';
            }
        }
        let text: Vec<char> = sentence[begin..end].to_vec();
        for era in eras.iter() {
            let name: Vec<char> = era.name.chars().collect();
            if let Some(pos) = find_sub(&text, &name) {
                for i in begin + pos..begin + pos + name.len() {
                    masked[i] = '%';
                }
            }
        }
    }
    masked
}

fn find_sub(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
}
