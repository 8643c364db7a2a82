//! Sequential stream handles and the chunk buffer they move data through.
//!
//! Readers and writers wrap `std::fs::File` directly: there is no implicit
//! runtime buffering, all buffering happens through [`ChunkBuffer`], which
//! keeps behavior on raw devices predictable. Handles are owned by the
//! pipeline that opened them and close on drop, on every exit path.

mod advise;
mod buffer;
mod identity;
mod reader;
mod size;
mod writer;

pub use buffer::{ChunkBuffer, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use identity::is_same_file;
pub use reader::ChunkReader;
pub use size::{known_size, probe_size};
pub use writer::ChunkWriter;
