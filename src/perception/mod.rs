pub mod identifier;
pub mod line_grouper;
pub mod merge;
pub mod pipeline;
pub mod position;
pub mod snapshot;
pub mod types;
