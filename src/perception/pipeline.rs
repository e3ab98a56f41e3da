/// Element map pipeline: merges accessibility and OCR detections, tags
/// screen regions and assigns ids in a single synchronous pass.
use crate::config::GeneratorConfig;
use crate::perception::identifier::assign_ids;
use crate::perception::merge::merge_elements;
use crate::perception::position::tag_positions;
use crate::perception::types::{ElementMap, ElementSource, UIElement};

/// Screen metadata passed through to the finished map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub has_webview: Option<bool>,
}

impl ScreenInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            has_webview: None,
        }
    }

    pub fn with_webview(mut self, has_webview: bool) -> Self {
        self.has_webview = Some(has_webview);
        self
    }
}

/// Stateless between calls; one generator can serve any number of
/// snapshots, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ElementMapGenerator {
    config: GeneratorConfig,
}

impl ElementMapGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Line grouping off, counter-only ids.
    pub fn basic() -> Self {
        Self::new(GeneratorConfig::basic())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the full pipeline:
    ///
    /// 1. Merge OCR fragments into the structural elements; leftovers are
    ///    grouped into lines and appended.
    /// 2. Tag each element with its coarse screen region.
    /// 3. Assign unique ids.
    ///
    /// Neither input is modified. Provenance is stamped here, so whatever
    /// `source`, position or id the caller left on an input is discarded.
    pub fn generate(
        &self,
        structural: &[UIElement],
        fragments: &[UIElement],
        screen: ScreenInfo,
    ) -> ElementMap {
        let structural_in: Vec<UIElement> = structural
            .iter()
            .map(|e| e.as_detected(ElementSource::Accessibility))
            .collect();
        let fragments_in: Vec<UIElement> = fragments
            .iter()
            .map(|e| e.as_detected(ElementSource::Ocr))
            .collect();

        let merged = merge_elements(
            &structural_in,
            &fragments_in,
            &self.config.merge,
            &self.config.grouping,
        );
        let positioned = tag_positions(&merged, screen.width, screen.height, &self.config.position);
        let identified = assign_ids(&positioned, &self.config.ids);

        tracing::debug!(
            structural = structural.len(),
            fragments = fragments.len(),
            total = identified.len(),
            width = screen.width,
            height = screen.height,
            "element map generated"
        );

        ElementMap::new(identified, screen.width, screen.height, screen.has_webview)
    }
}
