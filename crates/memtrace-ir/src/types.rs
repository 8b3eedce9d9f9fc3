//! A minimal guest-IR model: just enough structure to express "a basic
//! block is a sequence of statements, one of which may be a store of a
//! given type". The real guest IR and its translator live outside this
//! crate; this is the seam the translator would plug into in a
//! production build.

/// The closed set of storable guest types, as a flat `Copy` enum
/// matched once per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    I1,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
    V128,
    I128,
    F128,
    D128,
    V256,
    D32,
    D64,
    Invalid,
}

/// Identifier for a temporary introduced by the pass or already present
/// in the block.
pub type TempId = u32;

/// A guest-IR expression, trimmed to what the lowering table's
/// widenings need: reading a temporary, a small set of unary widenings,
/// a byte-offset addition, and an immediate.
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    /// Read of a temporary (an address, or a store's original data
    /// expression before widening).
    Temp(TempId),
    /// A 64-bit immediate, used for address-offset constants
    /// (`addr + 8`, `addr + 16`, ...).
    Const(u64),
    /// `addr + offset`.
    AddOffset(TempId, u64),
    /// Zero-extend an integer value (of the statement's `StoreType`) to
    /// 64 bits.
    ZeroExtendTo64(TempId),
    /// Bit-reinterpret a 32-bit float as a 64-bit integer slot,
    /// preserving exponent/mantissa layout.
    F32BitsToI64(TempId),
    /// Widen a 16-bit float to 64-bit float, then reinterpret as a
    /// 64-bit integer slot.
    F16WidenToF64Bits(TempId),
    /// A 64-bit (or 64-bit-float-bit-identical) value passed through
    /// unchanged.
    Identity(TempId),
    /// High 64 bits of a 128-bit-wide value.
    High64Of128(TempId),
    /// Low 64 bits of a 128-bit-wide value.
    Low64Of128(TempId),
    /// Lane `n` (0 = least significant) of a 256-bit-wide value.
    Lane64Of256(TempId, u8),
}

/// A single statement in a basic block. Anything that is not a store is
/// opaque to the pass and must be preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `WrTmp(dst, expr)`: materialize `expr` into temporary `dst`.
    WrTmp(TempId, IrExpr),
    /// The Dirty call the pass inserts: `on_store(addr_tmp, data_tmp)`.
    DirtyOnStore { addr_tmp: TempId, data_tmp: TempId },
    /// The original store, preserved unchanged.
    Store { addr: IrExpr, data: IrExpr, ty: StoreType },
    /// Anything else in the block (arithmetic, branches, other
    /// memory ops) — opaque, carried through unmodified.
    Other(OpaqueStmt),
}

/// A non-store statement the pass does not need to understand. Carries
/// an identifying tag only so tests can assert statement identity
/// survives the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueStmt(pub u32);

/// A basic block: a straight-line statement sequence plus a
/// monotonically increasing fresh-temporary counter.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub stmts: Vec<Stmt>,
    next_temp: TempId,
}

impl BasicBlock {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        let next_temp = stmts
            .iter()
            .filter_map(|s| match s {
                Stmt::WrTmp(t, _) => Some(*t + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Self { stmts, next_temp }
    }

    /// Allocate a fresh temporary, materialized before use per the
    /// pass's register-allocation-hygiene rule.
    pub fn fresh_temp(&mut self) -> TempId {
        let t = self.next_temp;
        self.next_temp += 1;
        t
    }
}
