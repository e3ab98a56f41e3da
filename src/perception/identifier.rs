/// Element ids addressed by the decision engine, e.g. `tap id=btn_search`.
///
/// The prefix table lives on `ElementType::prefix`; changing it or the
/// `_N` suffix format breaks every consumer of the map.
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{IdConfig, IdStrategy};
use crate::perception::types::{ElementPatch, UIElement};

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9]+").unwrap_or_else(|e| panic!("Failed to compile slug pattern: {e}"))
});

/// Lowercase `text`, collapse every run of non `[a-z0-9]` characters into `_`,
/// trim underscores and cap the result at `max_len` characters.
pub fn slug(text: &str, max_len: usize) -> String {
    let lower = text.to_lowercase();
    let replaced = NON_SLUG_CHARS.replace_all(&lower, "_");
    let truncated: String = replaced.trim_matches('_').chars().take(max_len).collect();
    truncated.trim_end_matches('_').to_string()
}

fn base_id(element: &UIElement, cfg: &IdConfig) -> String {
    let prefix = element.element_type.prefix();
    let s = slug(&element.text, cfg.max_slug_len);
    if s.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}_{s}")
    }
}

/// Give every element a unique id, in order.
///
/// `Semantic`: the first element with a given base id keeps it bare, later
/// ones get `_2`, `_3`, ... `Counter`: every element gets `prefix_N` counted
/// per type. A candidate already taken by an earlier element is skipped by
/// bumping N further.
pub fn assign_ids(elements: &[UIElement], cfg: &IdConfig) -> Vec<UIElement> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut used: HashSet<String> = HashSet::with_capacity(elements.len());
    let mut out = Vec::with_capacity(elements.len());

    for element in elements {
        let base = match cfg.strategy {
            IdStrategy::Semantic => base_id(element, cfg),
            IdStrategy::Counter => element.element_type.prefix().to_string(),
        };

        let count = counts.entry(base.clone()).or_insert(0);
        let id = loop {
            *count += 1;
            let candidate = match (cfg.strategy, *count) {
                (IdStrategy::Semantic, 1) => base.clone(),
                (_, n) => format!("{base}_{n}"),
            };
            if !used.contains(&candidate) {
                break candidate;
            }
            tracing::debug!(candidate = %candidate, "id already taken; bumping suffix");
        };

        used.insert(id.clone());
        out.push(element.derive(ElementPatch {
            id: Some(id),
            ..Default::default()
        }));
    }

    tracing::debug!(count = out.len(), strategy = ?cfg.strategy, "ids assigned");
    out
}
