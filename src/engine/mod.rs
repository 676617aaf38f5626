pub mod plan;
pub mod scoring;
pub mod selector;
