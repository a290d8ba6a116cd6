//! Entities and wire types shared by the store admin client crates.

pub mod domain;
pub mod error;
pub mod protocol;
