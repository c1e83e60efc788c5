//! Infrastructure layer - Cache engine, providers and runtime plumbing

pub mod cache;
pub mod embedding;
pub mod llm;
pub mod logging;
pub mod observability;
