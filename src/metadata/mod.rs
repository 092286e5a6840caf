//! Metadata fetchers for package registries

pub mod npm;

pub use npm::{NpmRegistryClient, USER_AGENT};
