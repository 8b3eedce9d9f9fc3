use alloc::rc::Rc;
use alloc::string::String;

/// A live heap block: the half-open interval `[start, start + size)`,
/// tagged with the allocation context that created it.
///
/// `start` is unique across live blocks at any instant and `size >=
/// MIN_BLOCK_SIZE`; both are enforced by the lifecycle sink
/// (`on_new_block`) before a `Block` is ever constructed.
#[derive(Debug, Clone)]
pub struct Block {
    pub start: u64,
    pub size: u64,
    pub context: ContextHandle,
}

impl Block {
    /// Half-open containment test: `start <= addr < start + size`.
    #[inline]
    pub fn contains(&self, addr: u64) -> bool {
        self.start <= addr && addr < self.start + self.size
    }
}

/// An opaque handle to an allocation context (captured call stack),
/// resolvable to human-readable frames by the host. Stack-trace
/// capture itself is the host's job; this crate only carries and prints
/// whatever the host hands it.
///
/// Backed by `Rc` rather than `Box`: `Block` and the logged `Event::Alloc`
/// both need their own owner of the same context, and `Rc::clone` is a
/// refcount bump, not a second heap allocation of the underlying trait
/// object.
#[derive(Debug, Clone)]
pub struct ContextHandle(Rc<dyn AllocationContext>);

impl ContextHandle {
    pub fn new(ctx: impl AllocationContext + 'static) -> Self {
        ContextHandle(Rc::new(ctx))
    }

    /// Render the captured context the way the sink prints it, or the
    /// documented placeholder when the host has nothing.
    pub fn describe(&self) -> String {
        self.0.describe()
    }
}

/// Implemented by the host's stack-trace representation so the core
/// never needs to know how frames are captured or symbolized.
pub trait AllocationContext: core::fmt::Debug {
    /// Multi-line human-readable rendering of the captured stack, or
    /// the literal `"(No allocation stack trace available)"` when
    /// nothing was captured.
    fn describe(&self) -> String;
}

/// A tagged trace record.
#[derive(Debug, Clone)]
pub enum Event {
    Store {
        addr: u64,
        value: u64,
    },
    Alloc {
        start: u64,
        size: u64,
        context: ContextHandle,
    },
    Free {
        start: u64,
        size: u64,
        context: ContextHandle,
    },
}
