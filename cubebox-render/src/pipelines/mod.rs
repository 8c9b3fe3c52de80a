//! wgpu render pipelines.

pub mod quad;
