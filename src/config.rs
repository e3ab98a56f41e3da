use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ElementMapError, ElementMapResult};

const CONFIG_FILE_NAME: &str = "element_map.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub ids: IdConfig,
    #[serde(default)]
    pub position: PositionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// A fragment is matched only when its best IoU is strictly greater than this.
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            iou_threshold: default_iou_threshold(),
        }
    }
}

fn default_iou_threshold() -> f64 {
    0.5
}

/// Tuning for the same-line fragment clustering.
/// Character-relative thresholds are multiples of a fragment's average character width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Height of a quantized sort band, in pixels.
    #[serde(default = "default_line_bucket_px")]
    pub line_bucket_px: i32,
    /// Max center-Y distance as a fraction of the smaller height.
    #[serde(default = "default_vertical_tolerance")]
    pub vertical_tolerance: f64,
    #[serde(default = "default_max_gap_chars")]
    pub max_gap_chars: f64,
    #[serde(default = "default_max_overlap_chars")]
    pub max_overlap_chars: f64,
    /// Floor for the average character width, in pixels.
    #[serde(default = "default_min_char_width")]
    pub min_char_width: f64,
    /// Gaps wider than this many characters become a space in the joined text.
    #[serde(default = "default_space_gap_chars")]
    pub space_gap_chars: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line_bucket_px: default_line_bucket_px(),
            vertical_tolerance: default_vertical_tolerance(),
            max_gap_chars: default_max_gap_chars(),
            max_overlap_chars: default_max_overlap_chars(),
            min_char_width: default_min_char_width(),
            space_gap_chars: default_space_gap_chars(),
        }
    }
}

fn default_line_bucket_px() -> i32 {
    20
}

fn default_vertical_tolerance() -> f64 {
    0.7
}

fn default_max_gap_chars() -> f64 {
    3.0
}

fn default_max_overlap_chars() -> f64 {
    0.5
}

fn default_min_char_width() -> f64 {
    10.0
}

fn default_space_gap_chars() -> f64 {
    1.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `prefix_slug` ids derived from element text, e.g. `btn_search`.
    #[default]
    Semantic,
    /// Per-type counters only, e.g. `btn_1`, `btn_2`.
    Counter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default)]
    pub strategy: IdStrategy,
    #[serde(default = "default_max_slug_len")]
    pub max_slug_len: usize,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            strategy: IdStrategy::default(),
            max_slug_len: default_max_slug_len(),
        }
    }
}

fn default_max_slug_len() -> usize {
    24
}

/// Screen-ratio cut points for the coarse region labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    #[serde(default = "default_top")]
    pub top: f64,
    #[serde(default = "default_bottom")]
    pub bottom: f64,
    #[serde(default = "default_upper")]
    pub upper: f64,
    #[serde(default = "default_lower")]
    pub lower: f64,
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_right")]
    pub right: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            top: default_top(),
            bottom: default_bottom(),
            upper: default_upper(),
            lower: default_lower(),
            left: default_left(),
            right: default_right(),
        }
    }
}

fn default_top() -> f64 {
    0.15
}

fn default_bottom() -> f64 {
    0.85
}

fn default_upper() -> f64 {
    0.4
}

fn default_lower() -> f64 {
    0.6
}

fn default_left() -> f64 {
    0.3
}

fn default_right() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

impl GeneratorConfig {
    /// The reduced generator: no line grouping, counter-only ids.
    pub fn basic() -> Self {
        Self {
            grouping: GroupingConfig {
                enabled: false,
                ..GroupingConfig::default()
            },
            ids: IdConfig {
                strategy: IdStrategy::Counter,
                ..IdConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ElementMapResult<()> {
        let ratios = [
            ("merge.iou_threshold", self.merge.iou_threshold),
            ("grouping.vertical_tolerance", self.grouping.vertical_tolerance),
            ("grouping.max_gap_chars", self.grouping.max_gap_chars),
            ("grouping.max_overlap_chars", self.grouping.max_overlap_chars),
            ("grouping.min_char_width", self.grouping.min_char_width),
            ("grouping.space_gap_chars", self.grouping.space_gap_chars),
            ("position.top", self.position.top),
            ("position.bottom", self.position.bottom),
            ("position.upper", self.position.upper),
            ("position.lower", self.position.lower),
            ("position.left", self.position.left),
            ("position.right", self.position.right),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(ElementMapError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let p = &self.position;
        let bands = [
            ("position.top", p.top, "position.upper", p.upper),
            ("position.upper", p.upper, "position.lower", p.lower),
            ("position.lower", p.lower, "position.bottom", p.bottom),
            ("position.left", p.left, "position.right", p.right),
        ];
        for (lo_name, lo, hi_name, hi) in bands {
            if lo > hi {
                return Err(ElementMapError::Config(format!(
                    "{lo_name} ({lo}) must not exceed {hi_name} ({hi})"
                )));
            }
        }
        if self.grouping.line_bucket_px <= 0 {
            return Err(ElementMapError::Config(
                "grouping.line_bucket_px must be positive".into(),
            ));
        }
        if self.ids.max_slug_len == 0 {
            return Err(ElementMapError::Config(
                "ids.max_slug_len must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    let candidate = std::env::current_dir().ok()?.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Some(candidate);
    }

    None
}

/// Load the generator config. An explicit path must exist; otherwise the
/// usual locations are searched and built-in defaults are used if none is found.
pub fn load_config(explicit: Option<&Path>) -> ElementMapResult<GeneratorConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match resolve_config_path() {
            Some(p) => p,
            None => {
                tracing::debug!("no {CONFIG_FILE_NAME} found; using defaults");
                return Ok(GeneratorConfig::default());
            }
        },
    };
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        strategy = ?config.ids.strategy,
        grouping = config.grouping.enabled,
        "config loaded"
    );
    Ok(config)
}

pub fn parse_config(content: &str) -> ElementMapResult<GeneratorConfig> {
    let config: GeneratorConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &GeneratorConfig, path: &Path) -> ElementMapResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
