pub mod backend;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod synth;
