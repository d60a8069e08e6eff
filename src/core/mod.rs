// src/core/mod.rs

pub mod engine;
pub mod lino;
pub mod ranked;
pub mod trie;
pub mod types;
