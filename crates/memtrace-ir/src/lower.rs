//! The lowering table and `instrument()`: rewrites a store of any
//! [`StoreType`] into one or more 64-bit-wide Dirty-helper calls.

use crate::gate::{is_app_code, GateConfig, GuestExtents};
use crate::types::{BasicBlock, IrExpr, Stmt, StoreType, TempId};

/// A single `(byte offset, widened-value expression)` chunk the pass
/// must emit a Dirty call for. Chunks are emitted most-significant
/// first, with increasing byte offsets.
struct Chunk {
    offset: u64,
    widened: IrExpr,
}

/// Per-type lowering table. `data_temp` is the original store-data
/// value, already materialized into a temporary (see [`instrument`]).
/// Returns no chunks for decimal-32/64 (not yet lowered) and for
/// `Invalid`.
fn lowering_chunks(ty: StoreType, data_temp: TempId) -> Vec<Chunk> {
    use IrExpr::*;
    match ty {
        StoreType::I1 | StoreType::I8 | StoreType::I16 | StoreType::I32 => {
            vec![Chunk { offset: 0, widened: ZeroExtendTo64(data_temp) }]
        }
        StoreType::I64 => {
            vec![Chunk { offset: 0, widened: Identity(data_temp) }]
        }
        StoreType::F32 => {
            vec![Chunk { offset: 0, widened: F32BitsToI64(data_temp) }]
        }
        StoreType::F64 => {
            vec![Chunk { offset: 0, widened: Identity(data_temp) }]
        }
        StoreType::F16 => {
            vec![Chunk { offset: 0, widened: F16WidenToF64Bits(data_temp) }]
        }
        StoreType::V128 | StoreType::I128 | StoreType::F128 | StoreType::D128 => vec![
            Chunk { offset: 0, widened: High64Of128(data_temp) },
            Chunk { offset: 8, widened: Low64Of128(data_temp) },
        ],
        StoreType::V256 => vec![
            Chunk { offset: 0, widened: Lane64Of256(data_temp, 3) },
            Chunk { offset: 8, widened: Lane64Of256(data_temp, 2) },
            Chunk { offset: 16, widened: Lane64Of256(data_temp, 1) },
            Chunk { offset: 24, widened: Lane64Of256(data_temp, 0) },
        ],
        // Decimal-32/64 lowering is left unimplemented; the store is
        // preserved but no callback is emitted.
        StoreType::D32 | StoreType::D64 => Vec::new(),
        StoreType::Invalid => Vec::new(),
    }
}

/// Materializes `expr` into a temporary if it isn't already a bare
/// `Temp`, avoiding duplicate evaluation of side-effecting
/// sub-expressions. Returns the temp id to read from and the `WrTmp`
/// statement to emit first, if any.
fn materialize(block: &mut BasicBlock, expr: &IrExpr) -> (TempId, Option<Stmt>) {
    if let IrExpr::Temp(t) = expr {
        (*t, None)
    } else {
        let t = block.fresh_temp();
        (t, Some(Stmt::WrTmp(t, expr.clone())))
    }
}

fn rewrite_store(block: &mut BasicBlock, addr: &IrExpr, data: &IrExpr, ty: StoreType) -> Vec<Stmt> {
    let mut out = Vec::new();

    let (base_addr_temp, addr_wrtmp) = materialize(block, addr);
    let (data_src_temp, data_wrtmp) = materialize(block, data);

    let chunks = lowering_chunks(ty, data_src_temp);
    if chunks.is_empty() {
        return out;
    }

    // Both the base address and the original data value are
    // materialized exactly once, ahead of every chunk, rather than
    // re-evaluated per chunk.
    if let Some(s) = addr_wrtmp {
        out.push(s);
    }
    if let Some(s) = data_wrtmp {
        out.push(s);
    }

    for chunk in chunks {
        let addr_tmp = block.fresh_temp();
        let addr_expr = if chunk.offset == 0 {
            IrExpr::Temp(base_addr_temp)
        } else {
            IrExpr::AddOffset(base_addr_temp, chunk.offset)
        };
        out.push(Stmt::WrTmp(addr_tmp, addr_expr));

        let data_tmp = block.fresh_temp();
        out.push(Stmt::WrTmp(data_tmp, chunk.widened));

        out.push(Stmt::DirtyOnStore { addr_tmp, data_tmp });
    }

    out
}

/// Rewrites `block_in` in place: returns it unchanged when
/// `guest_extents` does not look like application code per the gate in
/// [`crate::gate`]; otherwise returns a block with a Dirty call group
/// preceding every original `Store` statement. Non-store statements are
/// copied through unmodified.
pub fn instrument(mut block_in: BasicBlock, extents: &GuestExtents, gate: &GateConfig) -> BasicBlock {
    if !is_app_code(extents, gate) {
        return block_in;
    }

    let original_stmts = std::mem::take(&mut block_in.stmts);
    let mut new_stmts = Vec::with_capacity(original_stmts.len());

    for stmt in &original_stmts {
        if let Stmt::Store { addr, data, ty } = stmt {
            new_stmts.extend(rewrite_store(&mut block_in, addr, data, *ty));
        }
        new_stmts.push(stmt.clone());
    }

    block_in.stmts = new_stmts;
    block_in
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpaqueStmt;

    fn app_extents() -> GuestExtents {
        GuestExtents::new(vec![crate::gate::Segment {
            addr: 0x400000,
            backing_path: Some("/home/user/app".into()),
        }])
    }

    fn system_extents() -> GuestExtents {
        GuestExtents::new(vec![crate::gate::Segment {
            addr: 0x7f0000000000,
            backing_path: Some("/usr/lib/libc.so.6".into()),
        }])
    }

    fn store_block(ty: StoreType) -> BasicBlock {
        BasicBlock::new(vec![
            Stmt::WrTmp(0, IrExpr::Const(0x1500)),
            Stmt::Store { addr: IrExpr::Temp(0), data: IrExpr::Temp(1), ty },
        ])
    }

    fn dirty_calls(block: &BasicBlock) -> Vec<&Stmt> {
        block
            .stmts
            .iter()
            .filter(|s| matches!(s, Stmt::DirtyOnStore { .. }))
            .collect()
    }

    #[test]
    fn system_library_blocks_are_returned_unchanged() {
        let block = store_block(StoreType::I64);
        let out = instrument(block.clone(), &system_extents(), &GateConfig::default());
        assert_eq!(out.stmts, block.stmts);
    }

    #[test]
    fn scalar_i64_store_emits_one_call() {
        let out = instrument(store_block(StoreType::I64), &app_extents(), &GateConfig::default());
        assert_eq!(dirty_calls(&out).len(), 1);
        // original store preserved, as the last statement
        assert!(matches!(out.stmts.last(), Some(Stmt::Store { .. })));
    }

    #[test]
    fn v128_store_emits_two_calls_high_then_low() {
        let out = instrument(store_block(StoreType::V128), &app_extents(), &GateConfig::default());
        let calls = dirty_calls(&out);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn v256_store_emits_four_calls_most_significant_first() {
        let out = instrument(store_block(StoreType::V256), &app_extents(), &GateConfig::default());

        let mut addr_exprs: std::collections::HashMap<TempId, &IrExpr> = std::collections::HashMap::new();
        for stmt in &out.stmts {
            if let Stmt::WrTmp(t, expr) = stmt {
                addr_exprs.insert(*t, expr);
            }
        }

        let offsets: Vec<u64> = out
            .stmts
            .iter()
            .filter_map(|s| match s {
                Stmt::DirtyOnStore { addr_tmp, .. } => match addr_exprs.get(addr_tmp) {
                    Some(IrExpr::Temp(_)) => Some(0),
                    Some(IrExpr::AddOffset(_, off)) => Some(*off),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        assert_eq!(offsets, vec![0, 8, 16, 24]);
    }

    #[test]
    fn decimal_store_emits_no_calls_but_preserves_store() {
        let block = store_block(StoreType::D64);
        let out = instrument(block.clone(), &app_extents(), &GateConfig::default());
        assert!(dirty_calls(&out).is_empty());
        assert!(out.stmts.iter().any(|s| matches!(s, Stmt::Store { .. })));
    }

    #[test]
    fn non_store_statements_pass_through_unmodified() {
        let block = BasicBlock::new(vec![Stmt::Other(OpaqueStmt(7))]);
        let out = instrument(block.clone(), &app_extents(), &GateConfig::default());
        assert_eq!(out.stmts, vec![Stmt::Other(OpaqueStmt(7))]);
    }
}
