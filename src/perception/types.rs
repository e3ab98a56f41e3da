use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Widened to `i64` so extreme coordinates cannot overflow.
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    /// Zero for degenerate (empty or inverted) rectangles.
    pub fn area(&self) -> i128 {
        if self.is_degenerate() {
            0
        } else {
            self.width() as i128 * self.height() as i128
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn center_x(&self) -> i64 {
        (self.left as i64 + self.right as i64) / 2
    }

    pub fn center_y(&self) -> i64 {
        (self.top as i64 + self.bottom as i64) / 2
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn intersection_area(&self, other: &Bounds) -> i128 {
        let ix1 = self.left.max(other.left) as i128;
        let iy1 = self.top.max(other.top) as i128;
        let ix2 = self.right.min(other.right) as i128;
        let iy2 = self.bottom.min(other.bottom) as i128;
        (ix2 - ix1).max(0) * (iy2 - iy1).max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Button,
    Input,
    Text,
    Image,
    Switch,
    Checkbox,
    ListItem,
    Tab,
    Icon,
    Link,
    #[default]
    Unknown,
}

impl ElementType {
    /// Id prefix for this type. Part of the contract with the decision engine.
    pub fn prefix(&self) -> &'static str {
        match self {
            ElementType::Button => "btn",
            ElementType::Input => "input",
            ElementType::Text => "text",
            ElementType::Image => "img",
            ElementType::Switch => "switch",
            ElementType::Checkbox => "chk",
            ElementType::ListItem => "list",
            ElementType::Tab => "tab",
            ElementType::Icon => "icon",
            ElementType::Link => "link",
            ElementType::Unknown => "el",
        }
    }
}

/// Which detector an element came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementSource {
    #[default]
    Accessibility,
    Ocr,
    /// Structural element whose text was filled in from an OCR fragment.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UIElement {
    pub bounds: Bounds,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub element_type: ElementType,
    #[serde(default)]
    pub source: ElementSource,
    #[serde(default)]
    pub is_clickable: bool,
    /// Coarse screen region, e.g. "top-left". Unset until positions are tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_position: Option<String>,
    /// Unset until ids are assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Field overrides for [`UIElement::derive`]. `None` keeps the original value.
#[derive(Debug, Clone, Default)]
pub struct ElementPatch {
    pub bounds: Option<Bounds>,
    pub text: Option<String>,
    pub element_type: Option<ElementType>,
    pub source: Option<ElementSource>,
    pub is_clickable: Option<bool>,
    pub relative_position: Option<String>,
    pub id: Option<String>,
}

impl UIElement {
    /// An element reported by the accessibility walker.
    pub fn structural(
        bounds: Bounds,
        text: impl Into<String>,
        element_type: ElementType,
        is_clickable: bool,
    ) -> Self {
        Self {
            bounds,
            text: text.into(),
            element_type,
            source: ElementSource::Accessibility,
            is_clickable,
            relative_position: None,
            id: None,
        }
    }

    /// A text fragment reported by OCR. Fragments are plain, non-clickable text.
    pub fn fragment(bounds: Bounds, text: impl Into<String>) -> Self {
        Self {
            bounds,
            text: text.into(),
            element_type: ElementType::Text,
            source: ElementSource::Ocr,
            is_clickable: false,
            relative_position: None,
            id: None,
        }
    }

    /// Copy of a detector-reported element with provenance stamped and the
    /// fields the pipeline owns (position, id) cleared.
    pub fn as_detected(&self, source: ElementSource) -> UIElement {
        let mut e = self.derive(ElementPatch {
            source: Some(source),
            ..Default::default()
        });
        e.relative_position = None;
        e.id = None;
        e
    }

    /// New element equal to `self` with the patched fields replaced.
    pub fn derive(&self, patch: ElementPatch) -> UIElement {
        UIElement {
            bounds: patch.bounds.unwrap_or(self.bounds),
            text: patch.text.unwrap_or_else(|| self.text.clone()),
            element_type: patch.element_type.unwrap_or(self.element_type),
            source: patch.source.unwrap_or(self.source),
            is_clickable: patch.is_clickable.unwrap_or(self.is_clickable),
            relative_position: patch
                .relative_position
                .or_else(|| self.relative_position.clone()),
            id: patch.id.or_else(|| self.id.clone()),
        }
    }
}

/// Final output of the generator: uniquely addressable elements plus screen metadata.
///
/// Built once by the pipeline and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementMap {
    elements: Vec<UIElement>,
    screen_width: u32,
    screen_height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_webview: Option<bool>,
}

impl ElementMap {
    pub(crate) fn new(
        elements: Vec<UIElement>,
        screen_width: u32,
        screen_height: u32,
        has_webview: Option<bool>,
    ) -> Self {
        Self {
            elements,
            screen_width,
            screen_height,
            has_webview,
        }
    }

    pub fn elements(&self) -> &[UIElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UIElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn has_webview(&self) -> Option<bool> {
        self.has_webview
    }

    /// Exact id lookup.
    pub fn get(&self, id: &str) -> Option<&UIElement> {
        self.elements.iter().find(|e| e.id.as_deref() == Some(id))
    }

    /// All elements tagged with the given region label, in map order.
    pub fn at_position<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a UIElement> + 'a {
        self.elements
            .iter()
            .filter(move |e| e.relative_position.as_deref() == Some(label))
    }

    pub fn clickable(&self) -> impl Iterator<Item = &UIElement> + '_ {
        self.elements.iter().filter(|e| e.is_clickable)
    }

    /// Text listing of the map for a model prompt, one element per line:
    /// `[btn_login] button "Login" @ top-center (clickable)`.
    pub fn to_prompt_text(&self) -> String {
        if self.elements.is_empty() {
            return "No UI elements detected.".to_string();
        }

        let mut lines = vec![format!(
            "Screen {}x{}{}:",
            self.screen_width,
            self.screen_height,
            match self.has_webview {
                Some(true) => " (web content)",
                _ => "",
            }
        )];
        for e in &self.elements {
            let type_name = serde_json::to_value(e.element_type)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("{:?}", e.element_type));
            let text_part = if e.text.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", e.text)
            };
            let position_part = e
                .relative_position
                .as_deref()
                .map(|p| format!(" @ {p}"))
                .unwrap_or_default();
            let clickable_part = if e.is_clickable { " (clickable)" } else { "" };
            lines.push(format!(
                "  - [{}] {}{}{}{}",
                e.id.as_deref().unwrap_or("?"),
                type_name,
                text_part,
                position_part,
                clickable_part,
            ));
        }
        lines.join("\n")
    }
}

impl<'a> IntoIterator for &'a ElementMap {
    type Item = &'a UIElement;
    type IntoIter = std::slice::Iter<'a, UIElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
