//! Chunk partitioner.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::Path;

use crate::chunk::ChunkFile;
use crate::sort::SortError;

/// Transfer buffer size for the source copy loop. The partitioner's working
/// set is bounded by this, independent of the chunk byte budget.
const TRANSFER_BUF_SIZE: usize = 8 * 1024;

/// Splits the source file into numbered chunk files under `tmp_dir`.
///
/// Any pre-existing file or directory at `tmp_dir` is removed and replaced
/// with a fresh empty directory; a run never merges with leftovers of a
/// previous one. The source is consumed sequentially in a single pass and
/// is never mutated. A chunk closes at the first line boundary at or after
/// `max_chunk_bytes` bytes, so every chunk holds whole lines and the
/// concatenation of all chunks, in order, is byte-identical to the source.
///
/// An empty source produces an empty chunk list. Failures leave already
/// written chunk files behind; the caller discards `tmp_dir`.
///
/// # Arguments
/// * `source` - File to be partitioned
/// * `max_chunk_bytes` - Chunk byte budget; must be positive
/// * `tmp_dir` - Directory receiving the chunk files
pub fn partition(source: &Path, max_chunk_bytes: u64, tmp_dir: &Path) -> Result<Vec<ChunkFile>, SortError> {
    assert!(max_chunk_bytes > 0, "max_chunk_bytes must be positive");

    let source_file = fs::File::open(source).map_err(SortError::SourceUnreadable)?;
    let total = source_file.metadata().map_err(SortError::SourceUnreadable)?.len();
    let mut reader = io::BufReader::with_capacity(TRANSFER_BUF_SIZE, source_file);

    reset_dir(tmp_dir).map_err(SortError::TempWriteFailure)?;

    log::debug!("source size: {} bytes, chunk budget: {} bytes", total, max_chunk_bytes);

    let mut chunks = Vec::new();
    loop {
        if reader.fill_buf().map_err(SortError::SourceUnreadable)?.is_empty() {
            break;
        }

        let chunk = ChunkFile::new(tmp_dir, chunks.len() + 1);
        let written = write_chunk(&mut reader, &chunk, max_chunk_bytes)?;
        log::debug!("chunk {} written ({} bytes)", chunk.index(), written);
        chunks.push(chunk);
    }

    log::info!("{} partitioned into {} chunks", source.display(), chunks.len());

    return Ok(chunks);
}

fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
    } else if dir.exists() {
        fs::remove_file(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Copies bytes from `reader` into the chunk file until the byte budget is
/// spent and the copy sits on a line boundary, or the source is exhausted.
fn write_chunk(
    reader: &mut io::BufReader<fs::File>,
    chunk: &ChunkFile,
    max_chunk_bytes: u64,
) -> Result<u64, SortError> {
    let file = fs::File::create(chunk.path()).map_err(SortError::TempWriteFailure)?;
    let mut writer = io::BufWriter::with_capacity(TRANSFER_BUF_SIZE, file);

    let mut budget = max_chunk_bytes;
    let mut written = 0u64;
    let mut done = false;

    while !done {
        let take = {
            let buf = reader.fill_buf().map_err(SortError::SourceUnreadable)?;
            if buf.is_empty() {
                break;
            }

            let take;
            if budget >= buf.len() as u64 {
                take = buf.len();
                budget -= take as u64;
                done = budget == 0 && buf[take - 1] == b'\n';
            } else {
                // the budget runs out inside this buffer; cut at the first
                // line boundary at or after it
                let at = budget as usize;
                budget = 0;
                if at > 0 && buf[at - 1] == b'\n' {
                    take = at;
                    done = true;
                } else if let Some(pos) = buf[at..].iter().position(|&b| b == b'\n') {
                    take = at + pos + 1;
                    done = true;
                } else {
                    take = buf.len();
                }
            }

            writer.write_all(&buf[..take]).map_err(SortError::TempWriteFailure)?;
            take
        };

        reader.consume(take);
        written += take as u64;
    }

    writer.flush().map_err(SortError::TempWriteFailure)?;

    return Ok(written);
}

#[cfg(test)]
mod test {
    use std::fs;

    use rstest::*;

    use super::partition;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(7)]
    #[case(1024)]
    fn test_partition_concatenation(tmp_dir: tempfile::TempDir, #[case] max_chunk_bytes: u64) {
        let source = tmp_dir.path().join("source.txt");
        fs::write(&source, "one\ntwo\nthree\nfour\nfive\n").unwrap();

        let chunks = partition(&source, max_chunk_bytes, &tmp_dir.path().join("chunks")).unwrap();

        let mut restored = String::new();
        for chunk in &chunks {
            restored.push_str(&fs::read_to_string(chunk.path()).unwrap());
        }
        assert_eq!(restored, "one\ntwo\nthree\nfour\nfive\n");
    }

    #[rstest]
    fn test_partition_line_aligned(tmp_dir: tempfile::TempDir) {
        let source = tmp_dir.path().join("source.txt");
        fs::write(&source, "alpha\nbeta\ngamma\ndelta\n").unwrap();

        let chunks = partition(&source, 3, &tmp_dir.path().join("chunks")).unwrap();

        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            let content = fs::read_to_string(chunk.path()).unwrap();
            assert!(content.ends_with('\n'), "chunk {} is not line-aligned: {:?}", chunk.index(), content);
        }
    }

    #[rstest]
    fn test_partition_single_chunk(tmp_dir: tempfile::TempDir) {
        let source = tmp_dir.path().join("source.txt");
        fs::write(&source, "a\nb\n").unwrap();

        let chunks = partition(&source, 1024, &tmp_dir.path().join("chunks")).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(fs::read_to_string(chunks[0].path()).unwrap(), "a\nb\n");
    }

    #[rstest]
    fn test_partition_empty_source(tmp_dir: tempfile::TempDir) {
        let source = tmp_dir.path().join("source.txt");
        fs::write(&source, "").unwrap();

        let chunks = partition(&source, 1024, &tmp_dir.path().join("chunks")).unwrap();

        assert!(chunks.is_empty());
    }

    #[rstest]
    fn test_partition_resets_tmp_dir(tmp_dir: tempfile::TempDir) {
        let source = tmp_dir.path().join("source.txt");
        fs::write(&source, "a\n").unwrap();

        let chunks_dir = tmp_dir.path().join("chunks");
        fs::create_dir_all(&chunks_dir).unwrap();
        fs::write(chunks_dir.join("stale.txt"), "leftover").unwrap();

        partition(&source, 1024, &chunks_dir).unwrap();

        assert!(!chunks_dir.join("stale.txt").exists());
        assert!(chunks_dir.join("chunk1.txt").exists());
    }

    #[rstest]
    fn test_partition_long_line_exceeds_budget(tmp_dir: tempfile::TempDir) {
        let source = tmp_dir.path().join("source.txt");
        let long_line = "x".repeat(64 * 1024);
        fs::write(&source, format!("{}\nshort\n", long_line)).unwrap();

        let chunks = partition(&source, 16, &tmp_dir.path().join("chunks")).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(
            fs::read_to_string(chunks[0].path()).unwrap(),
            format!("{}\n", long_line)
        );
        assert_eq!(fs::read_to_string(chunks[1].path()).unwrap(), "short\n");
    }

    #[rstest]
    fn test_partition_missing_source(tmp_dir: tempfile::TempDir) {
        let result = partition(
            &tmp_dir.path().join("no-such-file.txt"),
            1024,
            &tmp_dir.path().join("chunks"),
        );

        assert!(matches!(result, Err(crate::sort::SortError::SourceUnreadable(_))));
    }
}
