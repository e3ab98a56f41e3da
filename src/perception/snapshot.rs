//! Offline input for the generator: one captured screen as JSON.
//!
//! ```json
//! {
//!   "screen_width": 1080,
//!   "screen_height": 2400,
//!   "has_webview": false,
//!   "structural": [{ "bounds": {...}, "text": "", "type": "button", "is_clickable": true }],
//!   "ocr": [{ "bounds": {...}, "text": "Login" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ElementMapError, ElementMapResult};
use crate::perception::pipeline::ScreenInfo;
use crate::perception::types::{ElementSource, ElementType, UIElement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub screen_width: u32,
    pub screen_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_webview: Option<bool>,
    #[serde(default)]
    pub structural: Vec<UIElement>,
    #[serde(default)]
    pub ocr: Vec<UIElement>,
}

impl ScreenSnapshot {
    /// Parse a snapshot and stamp provenance: detector output never carries
    /// ids, positions or a caller-chosen source. Untyped OCR entries are text.
    pub fn from_json(content: &str) -> ElementMapResult<Self> {
        let mut snapshot: ScreenSnapshot = serde_json::from_str(content)?;
        if snapshot.screen_width == 0 || snapshot.screen_height == 0 {
            return Err(ElementMapError::Snapshot(format!(
                "screen size must be non-zero, got {}x{}",
                snapshot.screen_width, snapshot.screen_height
            )));
        }
        snapshot.structural = snapshot
            .structural
            .iter()
            .map(|e| e.as_detected(ElementSource::Accessibility))
            .collect();
        snapshot.ocr = snapshot
            .ocr
            .iter()
            .map(|e| e.as_detected(ElementSource::Ocr))
            .map(|mut e| {
                if e.element_type == ElementType::Unknown {
                    e.element_type = ElementType::Text;
                }
                e
            })
            .collect();
        Ok(snapshot)
    }

    pub fn screen(&self) -> ScreenInfo {
        ScreenInfo {
            width: self.screen_width,
            height: self.screen_height,
            has_webview: self.has_webview,
        }
    }
}

pub fn load_snapshot(path: &Path) -> ElementMapResult<ScreenSnapshot> {
    let content = std::fs::read_to_string(path)?;
    let snapshot = ScreenSnapshot::from_json(&content)?;
    tracing::info!(
        path = %path.display(),
        structural = snapshot.structural.len(),
        ocr = snapshot.ocr.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::types::Bounds;

    #[test]
    fn parses_and_stamps_sources() {
        let json = r#"{
            "screen_width": 1080,
            "screen_height": 2400,
            "has_webview": true,
            "structural": [
                { "bounds": { "left": 0, "top": 0, "right": 100, "bottom": 40 },
                  "type": "button", "is_clickable": true, "source": "ocr", "id": "stale" }
            ],
            "ocr": [
                { "bounds": { "left": 10, "top": 5, "right": 90, "bottom": 35 },
                  "text": "Login" }
            ]
        }"#;
        let snapshot = ScreenSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.screen(), ScreenInfo::new(1080, 2400).with_webview(true));

        let button = &snapshot.structural[0];
        assert_eq!(button.bounds, Bounds::new(0, 0, 100, 40));
        assert_eq!(button.element_type, ElementType::Button);
        assert_eq!(button.source, ElementSource::Accessibility);
        assert_eq!(button.text, "");
        assert!(button.is_clickable);
        assert!(button.id.is_none());

        assert_eq!(snapshot.ocr[0].source, ElementSource::Ocr);
        assert_eq!(snapshot.ocr[0].element_type, ElementType::Text);
        assert!(!snapshot.ocr[0].is_clickable);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let snapshot =
            ScreenSnapshot::from_json(r#"{ "screen_width": 720, "screen_height": 1280 }"#).unwrap();
        assert!(snapshot.structural.is_empty());
        assert!(snapshot.ocr.is_empty());
        assert_eq!(snapshot.has_webview, None);
    }

    #[test]
    fn rejects_zero_screen() {
        let err = ScreenSnapshot::from_json(r#"{ "screen_width": 0, "screen_height": 1280 }"#)
            .unwrap_err();
        assert!(matches!(err, ElementMapError::Snapshot(_)));
    }

    #[test]
    fn rejects_unknown_element_type() {
        let json = r#"{
            "screen_width": 100, "screen_height": 100,
            "structural": [{ "bounds": { "left": 0, "top": 0, "right": 1, "bottom": 1 }, "type": "slider" }]
        }"#;
        let err = ScreenSnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, ElementMapError::Json(_)));
    }
}
