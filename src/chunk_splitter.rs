use std::cmp::max;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context};

use crate::config::Config;
use crate::temp_files::TempFiles;

/// Splits input files into line aligned chunk files of at most `chunk_size_bytes` each.
///
/// Chunk indexes keep growing across all inputs split by the same splitter, so chunk file names
/// never repeat within a run.
pub(crate) struct ChunkSplitter<'a> {
    config: &'a Config,
    index: usize,
    endl: u8,
}

impl<'a> ChunkSplitter<'a> {
    pub(crate) fn new(config: &'a Config) -> ChunkSplitter<'a> {
        ChunkSplitter {
            config,
            index: 0,
            endl: b'\n',
        }
    }

    /// Split `path` into chunk files, registering each chunk in `chunks` before anything is
    /// written to it. Returns the number of chunks created for this input.
    pub(crate) fn split(&mut self, path: &Path, chunks: &mut TempFiles) -> Result<usize, anyhow::Error> {
        let file = File::open(path)
            .with_context(|| anyhow!("path: {}", path.display()))?;
        let length = file.metadata()
            .with_context(|| anyhow!("path: {}", path.display()))?
            .len();
        let chunk_size = max(self.config.chunk_size_bytes(), 1);
        let total_chunks = length / chunk_size + 1;
        let mut reader = BufReader::new(file);
        // no chunk of this input can be longer than the input itself
        let mut buffer = vec![0u8; chunk_size.min(length.saturating_add(1)) as usize];
        let mut created = 0;

        loop {
            let bytes_read = fill_buffer(&mut reader, &mut buffer)
                .with_context(|| anyhow!("path: {}", path.display()))?;
            if bytes_read == 0 {
                break;
            }

            let chunk_path = self.config.chunk_path(self.index);
            self.index += 1;
            created += 1;
            log::debug!("Splitting chunk {} of about {}: {}", created, total_chunks, chunk_path.display());
            chunks.push(chunk_path.clone());

            let chunk_file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&chunk_path)
                .with_context(|| anyhow!("path: {}", chunk_path.display()))?;
            let mut writer = BufWriter::new(chunk_file);

            match buffer[..bytes_read].iter().rposition(|b| *b == self.endl) {
                Some(terminator) => {
                    writer.write_all(&buffer[..=terminator])?;
                    let rewind = bytes_read - terminator - 1;
                    if rewind > 0 {
                        reader.seek_relative(-(rewind as i64))
                            .with_context(|| anyhow!("rewind {} bytes, path: {}", rewind, path.display()))?;
                    }
                }
                None if bytes_read < buffer.len() => {
                    // last line of the input has no terminator
                    writer.write_all(&buffer[..bytes_read])?;
                }
                None => {
                    writer.write_all(&buffer[..bytes_read])?;
                    let mut rest = Vec::new();
                    reader.read_until(self.endl, &mut rest)
                        .with_context(|| anyhow!("path: {}", path.display()))?;
                    writer.write_all(&rest)?;
                    log::warn!(
                        "A line longer than the chunk size of {} bytes was found, chunk {} holds {} bytes",
                        chunk_size,
                        chunk_path.display(),
                        bytes_read + rest.len()
                    );
                }
            }
            writer.flush()
                .with_context(|| anyhow!("path: {}", chunk_path.display()))?;
        }

        log::info!("Split {} into {} chunks", path.display(), created);
        Ok(created)
    }
}

// Read until the buffer is full or the input is exhausted.
fn fill_buffer(reader: &mut impl Read, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use crate::chunk_splitter::ChunkSplitter;
    use crate::config::Config;
    use crate::temp_files::TempFiles;

    const SEVEN_LINES: &str = "1. A\n2. A\n3. B\n1. C\n6. D\n5. E\n4. F";

    fn config(tmp: &Path, chunk_size_bytes: u64) -> Config {
        Config::new(tmp.to_path_buf(), "chunk-".to_string(), ".tmp".to_string(), 2, chunk_size_bytes, 10, 1024)
    }

    fn concat(chunks: &TempFiles) -> Result<Vec<u8>, anyhow::Error> {
        let mut result = Vec::new();
        for path in chunks.paths() {
            result.extend(fs::read(path)?);
        }
        Ok(result)
    }

    #[test]
    fn test_split_and_reassemble() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        fs::write(&input, SEVEN_LINES)?;
        let config = config(dir.path(), 12);
        let mut chunks = TempFiles::new();
        let created = ChunkSplitter::new(&config).split(&input, &mut chunks)?;
        assert!(created >= 2);
        assert_eq!(created, chunks.len());
        assert_eq!(concat(&chunks)?, SEVEN_LINES.as_bytes());

        let (last, rest) = chunks.paths().split_last().unwrap();
        for path in rest {
            let content = fs::read(path)?;
            assert!(content.len() <= 12);
            assert_eq!(content.last(), Some(&b'\n'));
        }
        assert_eq!(fs::read(last)?, b"4. F");
        Ok(())
    }

    #[test]
    fn test_chunk_larger_than_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        fs::write(&input, SEVEN_LINES)?;
        let config = config(dir.path(), 1024);
        let mut chunks = TempFiles::new();
        assert_eq!(ChunkSplitter::new(&config).split(&input, &mut chunks)?, 1);
        assert_eq!(fs::read(&chunks.paths()[0])?, SEVEN_LINES.as_bytes());
        Ok(())
    }

    #[test]
    fn test_huge_chunk_size_with_small_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        fs::write(&input, SEVEN_LINES)?;
        // far more than any machine could allocate
        let config = config(dir.path(), 1 << 50);
        let mut chunks = TempFiles::new();
        assert_eq!(ChunkSplitter::new(&config).split(&input, &mut chunks)?, 1);
        assert_eq!(fs::read(&chunks.paths()[0])?, SEVEN_LINES.as_bytes());
        Ok(())
    }

    #[test]
    fn test_empty_file() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        fs::write(&input, "")?;
        let config = config(dir.path(), 16);
        let mut chunks = TempFiles::new();
        assert_eq!(ChunkSplitter::new(&config).split(&input, &mut chunks)?, 0);
        assert!(chunks.is_empty());
        Ok(())
    }

    #[test]
    fn test_long_line_is_not_split() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        let content = "1. A\n2. a line much longer than the chunk size\n3. B\n";
        fs::write(&input, content)?;
        let config = config(dir.path(), 8);
        let mut chunks = TempFiles::new();
        ChunkSplitter::new(&config).split(&input, &mut chunks)?;
        for path in chunks.paths() {
            assert_eq!(fs::read(path)?.last(), Some(&b'\n'));
        }
        assert!(chunks.paths().iter().any(|path| {
            fs::read(path).unwrap() == b"2. a line much longer than the chunk size\n"
        }));
        assert_eq!(concat(&chunks)?, content.as_bytes());
        Ok(())
    }

    #[test]
    fn test_indexes_continue_across_inputs() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "1. A\n2. B\n")?;
        fs::write(&second, "3. C\n4. D\n")?;
        let config = config(dir.path(), 5);
        let mut chunks = TempFiles::new();
        let mut splitter = ChunkSplitter::new(&config);
        splitter.split(&first, &mut chunks)?;
        splitter.split(&second, &mut chunks)?;
        assert_eq!(chunks.len(), 4);
        assert_eq!(concat(&chunks)?, b"1. A\n2. B\n3. C\n4. D\n");
        Ok(())
    }

    #[test]
    fn test_missing_input() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let config = config(dir.path(), 16);
        let mut chunks = TempFiles::new();
        let result = ChunkSplitter::new(&config).split(&dir.path().join("missing.txt"), &mut chunks);
        assert!(result.is_err());
        assert!(chunks.is_empty());
        Ok(())
    }
}
