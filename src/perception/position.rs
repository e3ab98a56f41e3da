use crate::config::PositionConfig;
use crate::perception::types::{Bounds, ElementPatch, UIElement};

/// Coarse region label such as "top-left" or "middle-center" for an element's center.
pub fn position_label(screen_width: u32, screen_height: u32, bounds: &Bounds, cfg: &PositionConfig) -> String {
    let y_ratio = bounds.center_y() as f64 / screen_height.max(1) as f64;
    let x_ratio = bounds.center_x() as f64 / screen_width.max(1) as f64;

    let vertical = if y_ratio < cfg.top {
        "top"
    } else if y_ratio > cfg.bottom {
        "bottom"
    } else if y_ratio < cfg.upper {
        "upper"
    } else if y_ratio > cfg.lower {
        "lower"
    } else {
        "middle"
    };

    let horizontal = if x_ratio < cfg.left {
        "left"
    } else if x_ratio > cfg.right {
        "right"
    } else {
        "center"
    };

    format!("{vertical}-{horizontal}")
}

/// Tag every element with its region label, preserving order.
pub fn tag_positions(
    elements: &[UIElement],
    screen_width: u32,
    screen_height: u32,
    cfg: &PositionConfig,
) -> Vec<UIElement> {
    elements
        .iter()
        .map(|e| {
            e.derive(ElementPatch {
                relative_position: Some(position_label(screen_width, screen_height, &e.bounds, cfg)),
                ..Default::default()
            })
        })
        .collect()
}
