pub mod baseline;
pub mod extract;
pub mod pipeline;
pub mod recommend;

pub use pipeline::{Pipeline, PipelineReport, PipelineSettings};
