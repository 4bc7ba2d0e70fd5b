use std::cmp::max;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tempfile::Builder;

use crate::config::Config;
use crate::merge_command::MergeCommand;
use crate::sort::create_thread_pool;
use crate::task_errors::TaskErrors;
use crate::temp_files::TempFiles;

/// Merge sorted `files` into `output` in passes of at most `fan_in` files per merge. Consumed
/// files are removed. An empty list produces an empty output.
///
/// Files produced by the passes stay owned by a guard until the final move succeeds, so a failure
/// in a later pass or in the move leaves none of them behind.
pub(crate) fn merge_all(files: Vec<PathBuf>, output: &Path, config: &Config) -> Result<(), anyhow::Error> {
    log::info!("Start merging {} sorted files", files.len());
    let mut current = files;
    let mut merged = TempFiles::new();
    let mut pass = 0;
    while current.len() > 1 {
        pass += 1;
        // results of the previous pass were consumed by this one
        merged = merge_pass(current, pass, config)?;
        current = merged.paths().clone();
        log::debug!("Finished merge pass {}, {} files left", pass, current.len());
    }

    match current.pop() {
        Some(result) => {
            move_file(&result, output)?;
            merged.into_paths();
        }
        None => {
            File::create(output)
                .with_context(|| anyhow!("path: {}", output.display()))?;
        }
    }
    log::info!("Final merge completed after {} passes, output: {}", pass, output.display());
    Ok(())
}

/// One pass: every group of up to `fan_in` files is merged into a new file by a separate command.
/// The pass returns only after all groups are done. If any group fails, all results of the pass
/// are removed and the first failure is returned.
fn merge_pass(files: Vec<PathBuf>, pass: usize, config: &Config) -> Result<TempFiles, anyhow::Error> {
    let fan_in = max(config.fan_in(), 2);
    let groups: Vec<Vec<PathBuf>> = files.chunks(fan_in)
        .map(|group| group.to_vec())
        .collect();
    log::debug!("Start merge pass {}, {} files in {} groups", pass, files.len(), groups.len());

    let mut merged = TempFiles::new();
    for _ in &groups {
        merged.push(create_merge_path(config)?);
    }

    let errors = TaskErrors::new();
    let mut merging_pool = create_thread_pool("merging", config)?;
    for (group, (inputs, output)) in groups.into_iter().zip(merged.paths().iter()).enumerate() {
        let merge_command = Box::new(
            MergeCommand::new(inputs, output.clone(), pass, group, config.flush_bytes(), errors.clone())
        );
        merging_pool.submit(merge_command);
    }
    merging_pool.shutdown();
    merging_pool.join()?;
    errors.into_result()?;

    Ok(merged)
}

fn create_merge_path(config: &Config) -> Result<PathBuf, anyhow::Error> {
    let merged_file = Builder::new()
        .prefix(&config.merge_prefix())
        .suffix(config.tmp_suffix())
        .tempfile_in(config.tmp())
        .with_context(|| anyhow!("Failed to create new temp file in {}", config.tmp().display()))?;
    let path = merged_file.into_temp_path()
        .keep()
        .map_err(|e| anyhow!("Failed to persist temp file: {}", e))?;
    Ok(path)
}

/// Move `from` to `to`, replacing `to`. Falls back to copy and remove when a rename is not
/// possible, for example across file systems.
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<(), anyhow::Error> {
    if let Err(e) = fs::rename(from, to) {
        log::debug!("Rename {} to {} failed: {}, copying instead", from.display(), to.display(), e);
        fs::copy(from, to)
            .with_context(|| anyhow!("Copy {} to {}", from.display(), to.display()))?;
        fs::remove_file(from)
            .with_context(|| anyhow!("path: {}", from.display()))?;
    }
    Ok(())
}
