//! Wizmatch (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the runner, the
//! integration tests and the benches can write `wizmatch::{core,engine,types}`
//! while the implementation lives in dedicated crates under `crates/`.

pub use wizmatch_core as core;
pub use wizmatch_engine as engine;
pub use wizmatch_types as types;

pub mod autoplay;
