//! IR instrumentation pass: rewrites guest-IR store statements into
//! `on_store` Dirty-helper calls ahead of each store.
//!
//! This crate models just enough of a guest IR ([`types`]) to express
//! the rewrite and its gate ([`gate`]); wiring a real translator's IR
//! into [`types::Stmt`]/[`types::IrExpr`] is the host's job.

mod gate;
mod lower;
mod types;

pub use gate::{is_app_code, GateConfig, GuestExtents, Segment};
pub use lower::instrument;
pub use types::{BasicBlock, IrExpr, OpaqueStmt, Stmt, StoreType, TempId};
