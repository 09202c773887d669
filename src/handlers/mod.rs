// src/handlers/mod.rs
pub mod dividends;
pub mod error;
