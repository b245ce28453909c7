use std::cmp::Ordering;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::sort::SortError;

/// Handle to a single chunk file on disk.
///
/// A chunk holds a contiguous run of whole source lines. It is created by
/// [`partition`](crate::partition::partition), sorted in place exactly once,
/// read to exhaustion by the merge phase and deleted afterwards; it is never
/// reopened for writing once sorted.
pub struct ChunkFile {
    index: usize,
    path: PathBuf,
}

impl ChunkFile {
    pub(crate) fn new(dir: &Path, index: usize) -> Self {
        ChunkFile {
            index,
            path: dir.join(format!("chunk{}.txt", index)),
        }
    }

    /// 1-based position of the chunk within the source file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Location of the chunk file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sorts the chunk in place: reads all of its lines into memory, sorts
    /// them with `compare` and rewrites the file, one `\n` after every line.
    ///
    /// A whole chunk's lines are memory-resident here; this is the
    /// memory/size trade-off of the whole design, and the reason the chunk
    /// byte budget must be chosen conservatively against available memory.
    ///
    /// # Arguments
    /// * `compare` - Function to be used to compare lines
    pub fn sort_by<F>(&self, compare: F) -> Result<(), SortError>
    where
        F: Fn(&str, &str) -> Ordering,
    {
        let reader = io::BufReader::new(fs::File::open(&self.path).map_err(SortError::ChunkCorrupt)?);
        let lines: Result<Vec<String>, io::Error> = reader.lines().collect();
        let mut lines = lines.map_err(SortError::ChunkCorrupt)?;

        // equal lines are byte-identical, stability is irrelevant
        lines.sort_unstable_by(|a, b| compare(a, b));

        let mut writer = io::BufWriter::new(fs::File::create(&self.path).map_err(SortError::TempWriteFailure)?);
        for line in &lines {
            writer.write_all(line.as_bytes()).map_err(SortError::TempWriteFailure)?;
            writer.write_all(b"\n").map_err(SortError::TempWriteFailure)?;
        }
        writer.flush().map_err(SortError::TempWriteFailure)?;

        log::debug!("chunk {} sorted ({} lines)", self.index, lines.len());

        return Ok(());
    }

    /// Opens a buffered line reader over the chunk for the merge phase.
    pub(crate) fn lines(&self) -> Result<io::Lines<io::BufReader<fs::File>>, SortError> {
        let file = fs::File::open(&self.path).map_err(SortError::ChunkCorrupt)?;
        Ok(io::BufReader::new(file).lines())
    }

    /// Deletes the chunk file.
    pub(crate) fn remove(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use rstest::*;

    use super::ChunkFile;
    use crate::order;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn test_sort_chunk(tmp_dir: tempfile::TempDir) {
        let chunk = ChunkFile::new(tmp_dir.path(), 1);
        fs::write(chunk.path(), "b\naa\na\n").unwrap();

        chunk.sort_by(order::longest_first).unwrap();

        assert_eq!(fs::read_to_string(chunk.path()).unwrap(), "aa\na\nb\n");
    }

    #[rstest]
    fn test_sort_chunk_idempotent(tmp_dir: tempfile::TempDir) {
        let chunk = ChunkFile::new(tmp_dir.path(), 1);
        fs::write(chunk.path(), "ccc\nbb\na\n").unwrap();

        chunk.sort_by(order::longest_first).unwrap();
        let once = fs::read_to_string(chunk.path()).unwrap();
        chunk.sort_by(order::longest_first).unwrap();
        let twice = fs::read_to_string(chunk.path()).unwrap();

        assert_eq!(once, twice);
    }

    #[rstest]
    fn test_sort_empty_chunk(tmp_dir: tempfile::TempDir) {
        let chunk = ChunkFile::new(tmp_dir.path(), 1);
        fs::write(chunk.path(), "").unwrap();

        chunk.sort_by(order::longest_first).unwrap();

        assert_eq!(fs::read_to_string(chunk.path()).unwrap(), "");
    }

    #[rstest]
    fn test_sort_chunk_restores_missing_trailing_newline(tmp_dir: tempfile::TempDir) {
        let chunk = ChunkFile::new(tmp_dir.path(), 1);
        fs::write(chunk.path(), "b\na").unwrap();

        chunk.sort_by(order::longest_first).unwrap();

        assert_eq!(fs::read_to_string(chunk.path()).unwrap(), "a\nb\n");
    }
}
