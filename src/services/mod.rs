// src/services/mod.rs
pub mod browser;
pub mod cache;
pub mod extractor;
pub mod normalizer;
pub mod refresh;
