use std::path::PathBuf;

use data_encoding::HEXLOWER;

#[derive(Clone, Debug)]
pub(crate) struct Config {
    tmp: PathBuf,
    tmp_prefix: String,
    tmp_suffix: String,
    run_id: String,
    tasks: usize,
    queue_size: usize,
    chunk_size_bytes: u64,
    fan_in: usize,
    flush_bytes: usize,
}

impl Config {
    pub(crate) fn new(
        tmp: PathBuf,
        tmp_prefix: String,
        tmp_suffix: String,
        tasks: usize,
        chunk_size_bytes: u64,
        fan_in: usize,
        flush_bytes: usize,
    ) -> Config {
        let queue_size = 4096;
        Config {
            tmp,
            tmp_prefix,
            tmp_suffix,
            run_id: HEXLOWER.encode(&rand::random::<[u8; 16]>()),
            tasks,
            queue_size,
            chunk_size_bytes,
            fan_in,
            flush_bytes,
        }
    }

    pub(crate) fn tmp(&self) -> &PathBuf {
        &self.tmp
    }

    pub(crate) fn tmp_prefix(&self) -> &String {
        &self.tmp_prefix
    }

    pub(crate) fn tmp_suffix(&self) -> &String {
        &self.tmp_suffix
    }

    pub(crate) fn run_id(&self) -> &String {
        &self.run_id
    }

    pub(crate) fn tasks(&self) -> usize {
        self.tasks
    }

    pub(crate) fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub(crate) fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }

    pub(crate) fn fan_in(&self) -> usize {
        self.fan_in
    }

    pub(crate) fn flush_bytes(&self) -> usize {
        self.flush_bytes
    }

    /// Path of the chunk with the given index. Unique per run because of the random run id.
    pub(crate) fn chunk_path(&self, index: usize) -> PathBuf {
        self.tmp.join(format!("{}{}-{}{}", self.tmp_prefix, self.run_id, index, self.tmp_suffix))
    }

    /// Prefix for merge results of this run.
    pub(crate) fn merge_prefix(&self) -> String {
        format!("{}{}-merged-", self.tmp_prefix, self.run_id)
    }
}
