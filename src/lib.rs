//! `line-sort` is an external sort implementation for newline-delimited text files.
//!
//! External sorting is a class of sorting algorithms that can handle massive amounts of data. External sorting
//! is required when the data being sorted do not fit into the main memory (RAM) of a computer and instead must be
//! resided in slower external memory, usually a hard disk drive. Sorting is achieved in three phases. During the
//! first phase the source file is partitioned into bounded-size chunk files on disk, during the second each chunk
//! is sorted in memory and rewritten in place, during the third the sorted chunks are k-way merged into the output
//! file. For more information see [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! `line-sort` supports the following features:
//!
//! * **Line-oriented:**
//!   the unit of sorting is the text line; chunk boundaries are aligned to line boundaries, so no
//!   line is ever split across chunks.
//! * **Configurable ordering:**
//!   any total order over lines can be supplied as a plain comparator; the same comparator value
//!   drives both the chunk-sort and the merge phase.
//! * **Bounded memory:**
//!   only one chunk's lines are held in memory while sorting and one pending line per chunk while
//!   merging, so inputs much larger than available memory can be sorted.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use line_sort::{order, ExternalSorterBuilder};
//!
//! fn main() {
//!     let sorter = ExternalSorterBuilder::new()
//!         .with_tmp_dir(Path::new("./"))
//!         .with_chunk_size(50 * 1024 * 1024)
//!         .build()
//!         .unwrap();
//!
//!     sorter
//!         .sort_by(Path::new("input.txt"), Path::new("output.txt"), order::longest_first)
//!         .unwrap();
//! }
//! ```

pub mod chunk;
pub mod merger;
pub mod order;
pub mod partition;
pub mod sort;

pub use chunk::ChunkFile;
pub use merger::{merge, BinaryHeapMerger};
pub use partition::partition;
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError};
