use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::line_record::LineRecord;

/// A sorted file consumed one line at a time during a merge.
#[derive(Debug)]
pub(crate) struct UnmergedChunkFile {
    path: PathBuf,
    reader: BufReader<File>,
}

impl UnmergedChunkFile {
    pub(crate) fn new(path: PathBuf) -> Result<UnmergedChunkFile, anyhow::Error> {
        let file = File::open(&path)
            .with_context(|| anyhow!("path: {}", path.display()))?;
        Ok(
            UnmergedChunkFile {
                path,
                reader: BufReader::new(file),
            }
        )
    }

    /// Next line of the file, `None` once the file is exhausted.
    pub(crate) fn line_record(&mut self) -> Result<Option<LineRecord>, anyhow::Error> {
        let mut line = Vec::new();
        let bytes = self.reader.read_until(b'\n', &mut line)
            .with_context(|| anyhow!("path: {}", self.path.display()))?;
        if bytes > 0 {
            Ok(Some(LineRecord::new(line)))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}
