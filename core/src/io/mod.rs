//! Byte-level primitives the action codec reads from and writes into.
//!
//! All multi-byte integers are little-endian, matching the SWF container.

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;
