//! External sorter.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::merger::merge;
use crate::order;
use crate::partition::partition;

/// Default chunk byte budget.
const DEFAULT_CHUNK_BYTES: u64 = 100 * 1024 * 1024;

/// Sorting error.
///
/// Every I/O failure is surfaced immediately; no stage retries and no stage
/// rolls back partially written temporary state.
#[derive(Debug)]
pub enum SortError {
    /// Source file missing or unreadable.
    SourceUnreadable(io::Error),
    /// Temporary directory or chunk file cannot be created or written.
    TempWriteFailure(io::Error),
    /// A chunk cannot be re-read after it was written.
    ChunkCorrupt(io::Error),
    /// Final output cannot be created or written.
    OutputWriteFailure(io::Error),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            SortError::SourceUnreadable(err) => err,
            SortError::TempWriteFailure(err) => err,
            SortError::ChunkCorrupt(err) => err,
            SortError::OutputWriteFailure(err) => err,
        })
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::SourceUnreadable(err) => write!(f, "source file not readable: {}", err),
            SortError::TempWriteFailure(err) => write!(f, "temporary directory or chunk not writable: {}", err),
            SortError::ChunkCorrupt(err) => write!(f, "chunk not readable after write: {}", err),
            SortError::OutputWriteFailure(err) => write!(f, "output file not writable: {}", err),
        }
    }
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Clone)]
pub struct ExternalSorterBuilder {
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
    /// Chunk byte budget.
    max_chunk_bytes: u64,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(self.tmp_dir.as_deref(), self.max_chunk_bytes)
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        return self;
    }

    /// Sets the chunk byte budget: the amount of source data that is sorted
    /// in memory at a time.
    pub fn with_chunk_size(mut self, max_chunk_bytes: u64) -> ExternalSorterBuilder {
        self.max_chunk_bytes = max_chunk_bytes;
        return self;
    }
}

impl Default for ExternalSorterBuilder {
    fn default() -> Self {
        ExternalSorterBuilder {
            tmp_dir: None,
            max_chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

/// External sorter.
///
/// Runs the three phases in strict pipeline order: the source file is
/// partitioned into bounded chunk files, each chunk is sorted in memory and
/// rewritten in place, and the sorted chunks are k-way merged into the
/// output file. Data flows through the filesystem between phases, so memory
/// use is bounded by one chunk's lines while sorting and one pending line
/// per chunk while merging — not by the input size.
///
/// The pipeline is single-threaded and synchronous. Two concurrent runs must
/// not share a temporary directory: partitioning resets it.
pub struct ExternalSorter {
    /// Directory holding this run's chunk files.
    tmp_dir: tempfile::TempDir,
    /// Chunk byte budget.
    max_chunk_bytes: u64,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `tmp_path` - Directory to be used to store temporary data. If the parameter is [`None`]
    ///   default OS temporary directory will be used.
    /// * `max_chunk_bytes` - Chunk byte budget. A whole chunk's lines are held in memory while
    ///   it is sorted, so the budget must be chosen conservatively against available memory.
    pub fn new(tmp_path: Option<&Path>, max_chunk_bytes: u64) -> Result<Self, SortError> {
        return Ok(ExternalSorter {
            tmp_dir: Self::init_tmp_directory(tmp_path)?,
            max_chunk_bytes,
        });
    }

    fn init_tmp_directory(tmp_path: Option<&Path>) -> Result<tempfile::TempDir, SortError> {
        let tmp_dir = if let Some(tmp_path) = tmp_path {
            tempfile::tempdir_in(tmp_path)
        } else {
            tempfile::tempdir()
        }
        .map_err(SortError::TempWriteFailure)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        return Ok(tmp_dir);
    }

    /// Sorts the source file into `output` using the reference
    /// [`order::longest_first`] ordering.
    ///
    /// # Arguments
    /// * `source` - File to be sorted; read once, never mutated
    /// * `output` - Result file; replaced if it exists
    pub fn sort(&self, source: &Path, output: &Path) -> Result<(), SortError> {
        self.sort_by(source, output, order::longest_first)
    }

    /// Sorts the source file into `output` using a custom total order.
    ///
    /// The same comparator value drives both the chunk-sort and the merge
    /// phase; passing mismatched orders to the two phases would produce
    /// unsorted output, so the pipeline does not allow it.
    ///
    /// # Arguments
    /// * `source` - File to be sorted; read once, never mutated
    /// * `output` - Result file; replaced if it exists
    /// * `compare` - Function to be used to compare lines
    pub fn sort_by<F>(&self, source: &Path, output: &Path, compare: F) -> Result<(), SortError>
    where
        F: Fn(&str, &str) -> Ordering + Copy,
    {
        let chunks = partition(source, self.max_chunk_bytes, self.tmp_dir.path())?;

        for chunk in &chunks {
            chunk.sort_by(compare)?;
        }
        log::debug!("all {} chunks sorted", chunks.len());

        merge(chunks, output, compare)?;
        log::info!("{} sorted into {}", source.display(), output.display());

        return Ok(());
    }
}
