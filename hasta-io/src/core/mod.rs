//! Core types

pub mod types;
