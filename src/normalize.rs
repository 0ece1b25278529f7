//! The end-to-end pipeline: mask each sentence, match and select rule
//! chains per candidate span, build compositions, run the rewrite
//! passes, then compute surface and absolute values.

use timex_types::{Document, TimexValue};

use crate::composition::build_composition;
use crate::era::EraTable;
use crate::mask::mask_sentence;
use crate::matcher::{all_matches, select_chain};
use crate::resolve::{calc_value, resolve_half_units, resolve_parallel_lists};
use crate::rules::RuleSet;
use crate::surface::calc_surface;

pub struct Normalizer {
    rules: RuleSet,
    eras: EraTable,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            rules: RuleSet::builtin(),
            eras: EraTable::builtin(),
        }
    }

    pub fn with_tables(rules: RuleSet, eras: EraTable) -> Self {
        Normalizer { rules, eras }
    }

    /// Normalize every candidate span of a document, in document order.
    /// Spans no rule matches yield empty surface and value.
    pub fn normalize(&self, doc: &Document) -> Vec<TimexValue> {
        let mut cps = Vec::new();
        let mut spans = Vec::new();

        for (sent_id, sent) in doc.sentences.iter().enumerate() {
            let chars: Vec<char> = sent.text.chars().collect();
            let masked = mask_sentence(&chars, &sent.spans, &self.eras);
            let matches = all_matches(&self.rules, &masked);
            for span in &sent.spans {
                let chain = select_chain(&matches, span, &self.rules);
                cps.push(build_composition(
                    span,
                    &chain,
                    &chars,
                    &masked,
                    &self.rules,
                    &self.eras,
                    sent_id,
                ));
                spans.push(span.clone());
            }
        }

        resolve_parallel_lists(&mut cps);
        resolve_half_units(&mut cps);

        let surfaces = calc_surface(&cps);
        let values = calc_value(&cps, &surfaces, &doc.dct);
        tracing::debug!(n_spans = spans.len(), "normalized document");

        spans
            .into_iter()
            .zip(surfaces)
            .zip(values)
            .map(|((span, surface), value)| TimexValue {
                text: span.text,
                kind: span.kind,
                surface,
                value,
            })
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new()
    }
}
