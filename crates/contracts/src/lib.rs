//! Shared types for the metafield console: aggregates, enums and the
//! schema-driven custom attribute engine.

pub mod domain;
pub mod enums;
pub mod shared;
