/// The host-provided write endpoint for traced events.
///
/// Implementations receive one call per logical line and are
/// responsible for getting the bytes to stdout, a file, or wherever the
/// host wants them. A write failure is best-effort: the tool keeps
/// buffering subsequent events regardless of the `Err` returned here.
///
/// Line format, reproduced for implementers:
///
/// ```text
/// 0x<addr_hex> 0x<value_hex>\n                     -- one per store
/// ===ALLOC START===\n
/// Start 0x<start_hex>, size <size_dec>\n
/// <context, or "(No allocation stack trace available)">\n
/// ===ALLOC END===\n                                -- one per alloc
/// ===FREE START===\n
/// Start 0x<start_hex>, size <size_dec>\n
/// <context>\n
/// ===FREE END===\n                                 -- one per free
/// ```
///
/// Addresses and values are lower-case hex with a `0x` prefix, no
/// zero-padding; sizes are unsigned decimal.
pub trait Sink {
    fn write_store(&mut self, addr: u64, value: u64) -> Result<(), ()>;
    fn write_alloc(&mut self, start: u64, size: u64, context: &str) -> Result<(), ()>;
    fn write_free(&mut self, start: u64, size: u64, context: &str) -> Result<(), ()>;
}
