use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use command_executor::command::Command;

use crate::line_record::LineRecord;
use crate::task_errors::TaskErrors;
use crate::unmerged_chunk_file::UnmergedChunkFile;

/// Merges one group of sorted files into a single sorted file.
pub(crate) struct MergeCommand {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    pass: usize,
    group: usize,
    flush_bytes: usize,
    errors: TaskErrors,
}

impl MergeCommand {
    pub(crate) fn new(
        inputs: Vec<PathBuf>,
        output: PathBuf,
        pass: usize,
        group: usize,
        flush_bytes: usize,
        errors: TaskErrors,
    ) -> MergeCommand {
        MergeCommand {
            inputs,
            output,
            pass,
            group,
            flush_bytes,
            errors,
        }
    }
}

impl Command for MergeCommand {
    fn execute(&self) -> Result<(), anyhow::Error> {
        log::debug!(
            "Start merging group {} of pass {}, {} files into {}",
            self.group,
            self.pass,
            self.inputs.len(),
            self.output.display()
        );
        match merge_files(&self.inputs, &self.output, self.flush_bytes) {
            Ok(lines) => {
                log::debug!("Finish merging group {} of pass {}, merged length: {} lines", self.group, self.pass, lines);
            }
            Err(e) => {
                self.errors.record(e);
            }
        }
        Ok(())
    }
}

/// K-way merge of sorted `inputs` into `output`. All inputs are closed and removed afterwards,
/// on failure the output is removed as well. Returns the number of merged lines.
pub(crate) fn merge_files(inputs: &[PathBuf], output: &Path, flush_bytes: usize) -> Result<usize, anyhow::Error> {
    match merge_streams(inputs, output, flush_bytes) {
        Ok(lines) => {
            for path in inputs {
                fs::remove_file(path)
                    .with_context(|| anyhow!("Remove merged file {}", path.display()))?;
            }
            Ok(lines)
        }
        Err(e) => {
            for path in inputs.iter().map(PathBuf::as_path).chain(std::iter::once(output)) {
                let _ = fs::remove_file(path);
            }
            Err(e)
        }
    }
}

fn merge_streams(inputs: &[PathBuf], output: &Path, flush_bytes: usize) -> Result<usize, anyhow::Error> {
    let mut streams = inputs.iter()
        .map(|path| UnmergedChunkFile::new(path.clone()))
        .collect::<Result<Vec<UnmergedChunkFile>, anyhow::Error>>()?;

    // identical lines from several streams share one entry, streams are served first come first
    let mut queue: BTreeMap<LineRecord, VecDeque<usize>> = BTreeMap::new();
    for (index, stream) in streams.iter_mut().enumerate() {
        if let Some(record) = stream.line_record()? {
            queue.entry(record).or_default().push_back(index);
        }
    }

    let file = File::create(output)
        .with_context(|| anyhow!("path: {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let mut merged_len: usize = 0;
    let mut unflushed: usize = 0;

    loop {
        let index = {
            let Some(mut entry) = queue.first_entry() else {
                break;
            };
            let Some(index) = entry.get_mut().pop_front() else {
                entry.remove();
                continue;
            };
            let line = entry.key().line();
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
            unflushed += line.len() + 1;
            if entry.get().is_empty() {
                entry.remove();
            }
            index
        };
        merged_len += 1;

        if unflushed >= flush_bytes {
            writer.flush()
                .with_context(|| anyhow!("path: {}", output.display()))?;
            unflushed = 0;
        }

        let stream = &mut streams[index];
        match stream.line_record()? {
            Some(record) => {
                queue.entry(record).or_default().push_back(index);
            }
            None => {
                log::trace!("Exhausted {}", stream.path().display());
            }
        }
    }

    writer.flush()
        .with_context(|| anyhow!("path: {}", output.display()))?;
    Ok(merged_len)
}
