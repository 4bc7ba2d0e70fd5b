use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use command_executor::command::Command;
use tempfile::Builder;

use crate::config::Config;
use crate::key::Key;
use crate::task_errors::TaskErrors;

/// Sorts one chunk file in place.
pub(crate) struct SortCommand {
    path: PathBuf,
    index: usize,
    total: usize,
    config: Config,
    errors: TaskErrors,
}

impl SortCommand {
    pub(crate) fn new(path: PathBuf, index: usize, total: usize, config: Config, errors: TaskErrors) -> SortCommand {
        SortCommand {
            path,
            index,
            total,
            config,
            errors,
        }
    }
}

impl Command for SortCommand {
    fn execute(&self) -> Result<(), anyhow::Error> {
        log::debug!("Start sorting chunk {} of {}: {}", self.index + 1, self.total, self.path.display());
        match sort_chunk(&self.path, &self.config) {
            Ok(lines) => {
                log::debug!("Finish sorting chunk {} of {}, {} lines", self.index + 1, self.total, lines);
            }
            Err(e) => {
                log::debug!("Failed sorting chunk {}: {}", self.path.display(), e);
                self.errors.record(e);
            }
        }
        Ok(())
    }
}

/// Split `content` into lines without terminators. A final line without a terminator is kept.
pub(crate) fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, b) in content.iter().enumerate() {
        if *b == b'\n' {
            lines.push(trim_cr(&content[start..i]));
            start = i + 1;
        }
    }
    if start < content.len() {
        lines.push(trim_cr(&content[start..]));
    }
    lines
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Read the whole chunk, sort its lines and atomically replace the chunk with the result. Every
/// written line ends with a single `\n`. Returns the number of lines.
pub(crate) fn sort_chunk(path: &Path, config: &Config) -> Result<usize, anyhow::Error> {
    let content = fs::read(path)
        .with_context(|| anyhow!("path: {}", path.display()))?;
    let mut records: Vec<(Key, &[u8])> = split_lines(&content)
        .into_iter()
        .map(|line| (Key::new(line), line))
        .collect();
    records.sort_unstable_by(|(a, a_line), (b, b_line)| a.compare(a_line, b, b_line));

    let dir = path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(config.tmp().as_path());
    let sorted = Builder::new()
        .prefix(config.tmp_prefix())
        .suffix(".sorting")
        .tempfile_in(dir)
        .with_context(|| anyhow!("Failed to create new temp file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(sorted.as_file());
        for (_, line) in &records {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
            .with_context(|| anyhow!("path: {}", sorted.path().display()))?;
    }
    sorted.persist(path)
        .map_err(|e| anyhow!("Failed to replace {}: {}", path.display(), e.error))?;

    Ok(records.len())
}
