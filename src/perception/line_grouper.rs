/// Line grouping: OCR tends to split one label into several fragments
/// ("Wi" + "-Fi", "Search" + "results"). This stitches fragments that sit on
/// the same line and close together back into one element per label.
use crate::config::GroupingConfig;
use crate::perception::types::{Bounds, ElementPatch, UIElement};

/// Average glyph width of a fragment, floored at `min_char_width`.
fn avg_char_width(e: &UIElement, min_char_width: f64) -> f64 {
    let chars = e.text.chars().count().max(1) as f64;
    (e.bounds.width() as f64 / chars).max(min_char_width)
}

/// Whether `fragment` continues the open group whose members span `group`.
fn continues_line(group: &Bounds, fragment: &UIElement, cfg: &GroupingConfig) -> bool {
    let group_h = group.height().max(1) as f64;
    let frag_h = fragment.bounds.height().max(1) as f64;
    let dy = (group.center_y() - fragment.bounds.center_y()).abs() as f64;
    if dy >= cfg.vertical_tolerance * group_h.min(frag_h) {
        return false;
    }

    let char_w = avg_char_width(fragment, cfg.min_char_width);
    let gap = (fragment.bounds.left as i64 - group.right as i64) as f64;
    gap < cfg.max_gap_chars * char_w && gap > -cfg.max_overlap_chars * char_w
}

/// Collapse one group into a single element.
fn materialize(mut members: Vec<UIElement>, cfg: &GroupingConfig) -> UIElement {
    if members.len() == 1 {
        return members.remove(0);
    }

    let first = members[0].clone();
    let bounds = members
        .iter()
        .skip(1)
        .fold(first.bounds, |acc, m| acc.union(&m.bounds));
    let is_clickable = members.iter().any(|m| m.is_clickable);

    members.sort_by_key(|m| m.bounds.left);
    let mut text = members[0].text.clone();
    for pair in members.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let gap = (next.bounds.left as i64 - prev.bounds.right as i64) as f64;
        if gap > cfg.space_gap_chars * avg_char_width(next, cfg.min_char_width) {
            text.push(' ');
        }
        text.push_str(&next.text);
    }

    first.derive(ElementPatch {
        bounds: Some(bounds),
        text: Some(text),
        is_clickable: Some(is_clickable),
        ..Default::default()
    })
}

/// Group fragments into one element per reconstructed line or label.
///
/// Fragments are ordered by quantized vertical band, then left edge, and
/// clustered sequentially against the bounding box of the open group.
/// Output order follows that band order.
pub fn group_lines(fragments: &[UIElement], cfg: &GroupingConfig) -> Vec<UIElement> {
    if fragments.is_empty() {
        return Vec::new();
    }

    let bucket = cfg.line_bucket_px.max(1) as i64;
    let mut sorted: Vec<&UIElement> = fragments.iter().collect();
    sorted.sort_by_key(|e| (e.bounds.center_y().div_euclid(bucket), e.bounds.left));

    let mut groups: Vec<Vec<UIElement>> = Vec::new();
    let mut current: Vec<UIElement> = vec![sorted[0].clone()];
    let mut current_bounds = sorted[0].bounds;

    for fragment in sorted.into_iter().skip(1) {
        if continues_line(&current_bounds, fragment, cfg) {
            current_bounds = current_bounds.union(&fragment.bounds);
            current.push(fragment.clone());
        } else {
            groups.push(std::mem::replace(&mut current, vec![fragment.clone()]));
            current_bounds = fragment.bounds;
        }
    }
    groups.push(current);

    tracing::debug!(
        fragments = fragments.len(),
        lines = groups.len(),
        "grouped OCR fragments into lines"
    );

    groups
        .into_iter()
        .map(|members| materialize(members, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::{ElementSource, ElementType};

    fn frag(l: i32, t: i32, r: i32, b: i32, text: &str) -> UIElement {
        UIElement::fragment(Bounds::new(l, t, r, b), text)
    }

    fn group(fragments: &[UIElement]) -> Vec<UIElement> {
        group_lines(fragments, &GroupingConfig::default())
    }

    #[test]
    fn empty_input() {
        assert!(group(&[]).is_empty());
    }

    #[test]
    fn compound_token_is_concatenated() {
        let out = group(&[frag(0, 100, 20, 120, "Wi"), frag(22, 100, 42, 120, "Fi")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "WiFi");
        assert_eq!(out[0].bounds, Bounds::new(0, 100, 42, 120));
    }

    #[test]
    fn word_gap_inserts_space() {
        // "results" is 70px for 7 chars; a 20px gap exceeds 1.5 chars.
        let out = group(&[frag(0, 100, 60, 120, "Search"), frag(80, 100, 150, 120, "results")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Search results");
        assert_eq!(out[0].bounds, Bounds::new(0, 100, 150, 120));
    }

    #[test]
    fn jittered_centers_keep_left_to_right_order() {
        // "World" sits a few pixels higher but in the same band.
        let out = group(&[frag(70, 97, 120, 111, "World"), frag(0, 101, 50, 115, "Hello")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Hello World");
        assert_eq!(out[0].bounds, Bounds::new(0, 97, 120, 115));
    }

    #[test]
    fn separate_lines_stay_separate() {
        let out = group(&[frag(0, 200, 70, 220, "Display"), frag(0, 100, 80, 120, "Settings")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Settings");
        assert_eq!(out[1].text, "Display");
    }

    #[test]
    fn distant_fragments_on_one_line_stay_separate() {
        let out = group(&[frag(0, 100, 40, 120, "Back"), frag(400, 100, 440, 120, "Done")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Back");
        assert_eq!(out[1].text, "Done");
    }

    #[test]
    fn small_overlap_is_tolerated_large_is_not() {
        let out = group(&[frag(0, 100, 20, 120, "ab"), frag(17, 100, 37, 120, "cd")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "abcd");

        let out = group(&[frag(0, 100, 20, 120, "ab"), frag(12, 100, 32, 120, "cd")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn single_member_passes_through_unchanged() {
        let lone = frag(10, 10, 50, 30, "Alone");
        let out = group(&[lone.clone()]);
        assert_eq!(out, vec![lone]);
    }

    #[test]
    fn group_checks_against_union_of_members() {
        // Each fragment is within reach of the group's right edge, which grows.
        let out = group(&[
            frag(0, 100, 20, 120, "a1"),
            frag(25, 100, 45, 120, "b2"),
            frag(50, 100, 70, 120, "c3"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bounds, Bounds::new(0, 100, 70, 120));
        assert_eq!(out[0].text, "a1b2c3");
    }

    #[test]
    fn merged_group_takes_first_member_fields_and_ors_clickable() {
        let mut first = frag(0, 100, 20, 120, "Wi");
        first.element_type = ElementType::Link;
        let mut second = frag(22, 100, 42, 120, "Fi");
        second.is_clickable = true;
        let out = group(&[second, first]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].element_type, ElementType::Link);
        assert_eq!(out[0].source, ElementSource::Ocr);
        assert!(out[0].is_clickable);
    }

    #[test]
    fn short_fragments_in_one_band_split_on_vertical_offset() {
        // Both centers fall in the 100..120 band, but 8px apart on 4px-tall text.
        let out = group(&[frag(0, 100, 20, 104, "ab"), frag(22, 108, 42, 112, "cd")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "ab");
        assert_eq!(out[1].text, "cd");
    }

    #[test]
    fn grown_group_box_admits_offset_fragment() {
        // "c3" is 15px below "b2" (too far on its own) but only 12px from the
        // center of the box spanning "a1" and "b2".
        let out = group(&[
            frag(0, 100, 20, 120, "a1"),
            frag(22, 93, 42, 113, "b2"),
            frag(44, 108, 64, 128, "c3"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "a1b2c3");
        assert_eq!(out[0].bounds, Bounds::new(0, 93, 64, 128));
    }

    #[test]
    fn drifting_fragments_split_once_they_leave_the_group_box() {
        // Each step is 8px below the previous one; the fourth is 16px from the
        // group's center and starts a new line.
        let out = group(&[
            frag(0, 100, 20, 120, "a1"),
            frag(22, 108, 42, 128, "b2"),
            frag(44, 116, 64, 136, "c3"),
            frag(66, 124, 86, 144, "d4"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "a1b2c3");
        assert_eq!(out[0].bounds, Bounds::new(0, 100, 64, 136));
        assert_eq!(out[1].text, "d4");
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let out = group(&[
            frag(i32::MIN, 0, i32::MIN + 20, 20, "Wi"),
            frag(i32::MAX - 20, 0, i32::MAX, 20, "Fi"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "Wi");
        assert_eq!(out[1].text, "Fi");
    }

    #[test]
    fn zero_height_fragments_do_not_panic() {
        let out = group(&[frag(0, 100, 20, 100, "x"), frag(22, 100, 42, 100, "y")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "xy");
    }
}
