//! `TextSink`: the host-side [`memtrace_core::Sink`] implementation,
//! writing the trace line format to any `std::io::Write` (stdout, or a
//! file opened via `--output`).

use memtrace_core::Sink;
use std::io::Write;

pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn write_store(&mut self, addr: u64, value: u64) -> Result<(), ()> {
        writeln!(self.out, "0x{:x} 0x{:x}", addr, value).map_err(|_| ())
    }

    fn write_alloc(&mut self, start: u64, size: u64, context: &str) -> Result<(), ()> {
        writeln!(self.out, "===ALLOC START===").map_err(|_| ())?;
        writeln!(self.out, "Start 0x{:x}, size {}", start, size).map_err(|_| ())?;
        writeln!(self.out, "{}", context).map_err(|_| ())?;
        writeln!(self.out, "===ALLOC END===").map_err(|_| ())
    }

    fn write_free(&mut self, start: u64, size: u64, context: &str) -> Result<(), ()> {
        writeln!(self.out, "===FREE START===").map_err(|_| ())?;
        writeln!(self.out, "Start 0x{:x}, size {}", start, size).map_err(|_| ())?;
        writeln!(self.out, "{}", context).map_err(|_| ())?;
        writeln!(self.out, "===FREE END===").map_err(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_line_uses_hex_addr_and_value() {
        let mut buf = Vec::new();
        {
            let mut sink = TextSink::new(&mut buf);
            sink.write_store(0x1500, 0xdeadbeef_deadbeef).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "0x1500 0xdeadbeefdeadbeef\n");
    }

    #[test]
    fn alloc_block_has_start_marker_and_end_marker() {
        let mut buf = Vec::new();
        {
            let mut sink = TextSink::new(&mut buf);
            sink.write_alloc(0x1000, 0x2000, "ctxA").unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "===ALLOC START===\nStart 0x1000, size 8192\nctxA\n===ALLOC END===\n"
        );
    }
}
