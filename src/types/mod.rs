//! Tipos compartilhados do Tabula.

pub mod args;
pub mod config;
pub mod errors;
