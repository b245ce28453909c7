//! Binary heap merger.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::Path;

use crate::chunk::ChunkFile;
use crate::sort::SortError;

/// One frontier entry: the current unread line of one source.
///
/// Entries order by `compare` on the line and fall back to the source index
/// on content ties, so identical lines held by different sources stay
/// distinct in the heap and none of them is ever dropped.
struct MergeEntry<F> {
    line: String,
    source: usize,
    compare: F,
}

impl<F> PartialEq for MergeEntry<F>
where
    F: Fn(&str, &str) -> Ordering + Copy,
{
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<F> Eq for MergeEntry<F> where F: Fn(&str, &str) -> Ordering + Copy {}

impl<F> PartialOrd for MergeEntry<F>
where
    F: Fn(&str, &str) -> Ordering + Copy,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F> Ord for MergeEntry<F>
where
    F: Fn(&str, &str) -> Ordering + Copy,
{
    fn cmp(&self, other: &Self) -> Ordering {
        (self.compare)(&self.line, &other.line).then_with(|| self.source.cmp(&other.source))
    }
}

/// Binary heap merger implementation.
/// Merges multiple sorted line sources into a single sorted output stream.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number
/// of lines, *n* is the number of sources. Memory holds one pending line per
/// source; an exhausted source simply leaves the frontier.
pub struct BinaryHeapMerger<C, F>
where
    C: IntoIterator<Item = io::Result<String>>,
    F: Fn(&str, &str) -> Ordering + Copy,
{
    // binary heap is max-heap by default so entries are reversed to convert it to min-heap
    entries: BinaryHeap<Reverse<MergeEntry<F>>>,
    sources: Vec<C::IntoIter>,
    compare: F,
    initiated: bool,
}

impl<C, F> BinaryHeapMerger<C, F>
where
    C: IntoIterator<Item = io::Result<String>>,
    F: Fn(&str, &str) -> Ordering + Copy,
{
    /// Creates an instance of a binary heap merger using the given sources.
    /// Source lines should be sorted under `compare` otherwise the result is
    /// undefined.
    ///
    /// # Arguments
    /// * `sources` - Sorted line sources to be merged into a single one
    /// * `compare` - Function to be used to compare lines
    pub fn new<I>(sources: I, compare: F) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let sources = Vec::from_iter(sources.into_iter().map(|s| s.into_iter()));
        let entries = BinaryHeap::with_capacity(sources.len());

        return BinaryHeapMerger {
            entries,
            sources,
            compare,
            initiated: false,
        };
    }
}

impl<C, F> Iterator for BinaryHeapMerger<C, F>
where
    C: IntoIterator<Item = io::Result<String>>,
    F: Fn(&str, &str) -> Ordering + Copy,
{
    type Item = io::Result<String>;

    /// Returns the next line from the sources in `compare` order.
    fn next(&mut self) -> Option<Self::Item> {
        if !self.initiated {
            for (idx, source) in self.sources.iter_mut().enumerate() {
                if let Some(line) = source.next() {
                    match line {
                        Ok(line) => self.entries.push(Reverse(MergeEntry {
                            line,
                            source: idx,
                            compare: self.compare,
                        })),
                        Err(err) => return Some(Err(err)),
                    }
                }
            }
            self.initiated = true;
        }

        let Reverse(entry) = self.entries.pop()?;
        if let Some(line) = self.sources[entry.source].next() {
            match line {
                Ok(line) => self.entries.push(Reverse(MergeEntry {
                    line,
                    source: entry.source,
                    compare: self.compare,
                })),
                Err(err) => return Some(Err(err)),
            }
        }

        return Some(Ok(entry.line));
    }
}

/// Merges sorted chunk files into a single output file and deletes them.
///
/// Opens one buffered reader per chunk, removes any pre-existing file at
/// `output_path`, then repeatedly writes the minimal pending line under
/// `compare` followed by `\n` and refills the frontier from the reader that
/// produced it. Every open handle is dropped on every exit path. The chunk
/// files are removed once the output is flushed; the directory holding them
/// stays in place.
///
/// # Arguments
/// * `chunks` - Sorted chunk files, as returned by the partitioner
/// * `output_path` - Result file location
/// * `compare` - Function to be used to compare lines
pub fn merge<F>(chunks: Vec<ChunkFile>, output_path: &Path, compare: F) -> Result<(), SortError>
where
    F: Fn(&str, &str) -> Ordering + Copy,
{
    if output_path.exists() {
        fs::remove_file(output_path).map_err(SortError::OutputWriteFailure)?;
    }
    let output = fs::File::create(output_path).map_err(SortError::OutputWriteFailure)?;
    let mut writer = io::BufWriter::new(output);

    log::debug!("merging {} chunks into {}", chunks.len(), output_path.display());

    let mut sources = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        sources.push(chunk.lines()?);
    }

    for line in BinaryHeapMerger::new(sources, compare) {
        let line = line.map_err(SortError::ChunkCorrupt)?;
        writer.write_all(line.as_bytes()).map_err(SortError::OutputWriteFailure)?;
        writer.write_all(b"\n").map_err(SortError::OutputWriteFailure)?;
    }

    writer.flush().map_err(SortError::OutputWriteFailure)?;

    for chunk in chunks {
        chunk.remove().map_err(SortError::TempWriteFailure)?;
    }

    return Ok(());
}
