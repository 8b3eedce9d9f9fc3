//! Tracked-block index, bounded event-log buffer, and store-callback
//! runtime for a store-tracing dynamic binary instrumentation tool.
//!
//! This crate is the hot-path half of the tool: it is embedded into the
//! translator/allocator host and driven from the guest thread that
//! triggers each store, allocation, and free. It performs zero heap
//! allocations on the store path (the tracked-block index allocates
//! exactly once per live block, on insert).
//!
//! `no_std` because the host that embeds this may not have a full `std`
//! runtime available at the point these callbacks fire. Callers needing
//! `std::io` sinks implement [`Sink`] on top of whatever they have.

#![no_std]

extern crate alloc;

mod block;
mod callback;
mod error;
mod index;
mod lifecycle;
mod log;
mod sink;
mod state;

pub use block::{AllocationContext, Block, ContextHandle, Event};
pub use error::{Error, Result};
pub use index::BlockIndex;
pub use log::LogBuffer;
pub use sink::Sink;
pub use state::{Config, ToolState};
