pub mod config;
pub mod errors;
pub mod perception;

pub use crate::config::GeneratorConfig;
pub use crate::errors::{ElementMapError, ElementMapResult};
pub use crate::perception::pipeline::{ElementMapGenerator, ScreenInfo};
pub use crate::perception::types::{
    Bounds, ElementMap, ElementPatch, ElementSource, ElementType, UIElement,
};

/// Install the `tracing` subscriber for binaries built on this crate.
/// `RUST_LOG` overrides `default_filter`; output goes to stderr.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
