/// Reconciles accessibility elements with OCR fragments.
///
/// Structural elements keep their geometry; a fragment that overlaps one of
/// them strongly enough donates its text when the structural element has none.
/// Everything OCR saw that nothing structural explains is appended afterwards.
use crate::config::{GroupingConfig, MergeConfig};
use crate::perception::line_grouper::group_lines;
use crate::perception::types::{Bounds, ElementPatch, ElementSource, UIElement};

/// Intersection-over-Union of two rectangles, in `[0, 1]`.
/// Degenerate rectangles score 0.
pub fn iou(a: &Bounds, b: &Bounds) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return 0.0;
    }
    let inter = a.intersection_area(b);
    let union = a.area() + b.area() - inter;
    if union <= 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

/// Merge `structural` with `fragments`. The result starts with one element per
/// structural input, in order, followed by the unmatched fragments (grouped into
/// lines when `grouping.enabled`) stamped as OCR.
pub fn merge_elements(
    structural: &[UIElement],
    fragments: &[UIElement],
    merge: &MergeConfig,
    grouping: &GroupingConfig,
) -> Vec<UIElement> {
    if fragments.is_empty() {
        return structural.to_vec();
    }

    let mut merged: Vec<UIElement> = structural.to_vec();
    let mut consumed = vec![false; fragments.len()];
    let mut enriched = 0usize;

    for (fi, fragment) in fragments.iter().enumerate() {
        // Strict `>` keeps the earliest structural element on exact ties.
        let mut best: Option<(usize, f64)> = None;
        for (si, candidate) in merged.iter().enumerate() {
            let score = iou(&candidate.bounds, &fragment.bounds);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((si, score));
            }
        }

        let Some((si, score)) = best else { continue };
        if score <= merge.iou_threshold {
            continue;
        }

        consumed[fi] = true;
        if merged[si].text.is_empty() && !fragment.text.is_empty() {
            merged[si] = merged[si].derive(ElementPatch {
                text: Some(fragment.text.clone()),
                source: Some(ElementSource::Merged),
                ..Default::default()
            });
            enriched += 1;
        }
    }

    let leftovers: Vec<UIElement> = fragments
        .iter()
        .zip(&consumed)
        .filter(|(f, used)| !**used && !f.text.is_empty())
        .map(|(f, _)| f.clone())
        .collect();
    let leftover_count = leftovers.len();

    let standalone = if grouping.enabled {
        group_lines(&leftovers, grouping)
    } else {
        leftovers
    };

    tracing::debug!(
        structural = structural.len(),
        fragments = fragments.len(),
        consumed = consumed.iter().filter(|c| **c).count(),
        enriched,
        leftovers = leftover_count,
        appended = standalone.len(),
        "merged OCR fragments into structural elements"
    );

    merged.extend(standalone.into_iter().map(|e| {
        e.derive(ElementPatch {
            source: Some(ElementSource::Ocr),
            ..Default::default()
        })
    }));
    merged
}
