//! Site Progress AI
//!
//! 2枚の現場写真をローカルの視覚モデルで解析し、
//! 形の保証された工事進捗レポートを返す

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod server;
