use std::cmp::max;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use command_executor::shutdown_mode::ShutdownMode;
use command_executor::thread_pool::ThreadPool;
use command_executor::thread_pool_builder::ThreadPoolBuilder;
use rlimit::{getrlimit, Resource, setrlimit};

use crate::chunk_splitter::ChunkSplitter;
use crate::config::Config;
use crate::merge_pass::merge_all;
use crate::sort_command::SortCommand;
use crate::task_errors::TaskErrors;
use crate::temp_files::TempFiles;
use crate::unmerged_chunk_file::UnmergedChunkFile;

const MB: u64 = 1024 * 1024;

pub(crate) fn create_thread_pool(name: &str, config: &Config) -> Result<ThreadPool, anyhow::Error> {
    let mut thread_pool_builder = ThreadPoolBuilder::new();
    thread_pool_builder
        .with_name(name.to_string())
        .with_tasks(config.tasks())
        .with_queue_size(config.queue_size())
        .with_shutdown_mode(ShutdownMode::CompletePending)
        .build()
        .with_context(|| anyhow!("Failed to create {} thread pool", name))
}

/// Sort a text file of `<number>. <text>` records
///
/// Records are ordered by their text, then by their number. The input is split into chunks that
/// fit in memory, the chunks are sorted in parallel and then merged, at most `fan_in` files at a
/// time, until a single sorted file remains.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use large_file_sort::sort::Sort;
///
/// fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut large_file_sort = Sort::new(vec![input], output);
///     // set number of CPU cores the sort will attempt to use. The default is to use all
///     // available cores.
///     large_file_sort.with_tasks(2);
///     // set the directory for intermediate results. The default is the system temp dir -
///     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
///     // directory for intermediate files, preferably on the same file system as the output result.
///     large_file_sort.with_tmp_dir(tmp);
///     large_file_sort.sort()
/// }
/// ```
pub struct Sort {
    input_files: Vec<PathBuf>,
    output: PathBuf,
    tmp: PathBuf,
    tasks: usize,
    chunk_size_bytes: u64,
    fan_in: usize,
    flush_bytes: usize,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// A default Sort definition will use the system temporary
    /// directory as defined by std::env::temp_dir().
    /// * input is read in chunks of 1 MiB
    /// * at most 10 files are merged at once
    /// * merge output is flushed every 1 MiB
    /// * all available cores are used
    ///
    /// The Sort implementation will increase the file descriptor rlimit to accommodate
    /// concurrently open merge inputs
    pub fn new(input_files: Vec<PathBuf>, output: PathBuf) -> Sort {
        Sort {
            input_files,
            output,
            tmp: std::env::temp_dir(),
            tasks: 0,
            chunk_size_bytes: MB,
            fan_in: 10,
            flush_bytes: MB as usize,
        }
    }

    /// Set directory for intermediate files. By default use std::env::temp_dir()
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the number of tasks. The default is zero which will result in using all system cores
    pub fn with_tasks(&mut self, tasks: usize) {
        self.tasks = tasks;
    }

    /// The input will be read in chunks of 'chunk_size_bytes' respecting line boundaries
    pub fn with_chunk_size_bytes(&mut self, chunk_size_bytes: u64) {
        self.chunk_size_bytes = chunk_size_bytes;
    }

    /// The input will be read in chunks of 'chunk_size_mb' MiB respecting line boundaries
    pub fn with_chunk_size_mb(&mut self, chunk_size_mb: u64) {
        self.chunk_size_bytes = chunk_size_mb * MB;
    }

    /// Set the maximal number of files merged at once. Values below 2 are treated as 2.
    pub fn with_fan_in(&mut self, fan_in: usize) {
        self.fan_in = fan_in;
    }

    /// Flush merge output every 'flush_bytes' written bytes
    pub fn with_flush_bytes(&mut self, flush_bytes: usize) {
        self.flush_bytes = flush_bytes;
    }

    /// Sort the input files into the output file.
    ///
    /// Temporary files are removed whether the sort succeeds or fails. Errors are logged once
    /// and returned unchanged.
    pub fn sort(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config();
        let start = Instant::now();
        log::info!("Start sorting {}", self.inputs_display());
        let result = Self::with_rlimits(&config, || Self::internal_sort(&self.input_files, &config, &self.output));
        match &result {
            Ok(()) => {
                log::info!("Completed sorting {} into {}", self.inputs_display(), self.output.display());
            }
            Err(e) => {
                log::error!("An error occurred while sorting {}: {:?}", self.inputs_display(), e);
            }
        }
        log::debug!("Total time taken: {:?}", start.elapsed());
        result
    }

    /// Merge already sorted input files into the output file. The input files are removed.
    pub fn merge(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config();
        Self::with_rlimits(&config, || merge_all(self.input_files.clone(), &self.output, &config))
    }

    /// Check that every input file is sorted.
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        for path in &self.input_files {
            if !Self::internal_check(path)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn internal_check(path: &PathBuf) -> Result<bool, anyhow::Error> {
        let mut unmerged = UnmergedChunkFile::new(path.clone())?;
        let mut previous = match unmerged.line_record()? {
            Some(line_record) => line_record,
            None => return Ok(true),
        };
        while let Some(current) = unmerged.line_record()? {
            if previous > current {
                return Ok(false);
            }
            previous = current;
        }
        Ok(true)
    }

    fn inputs_display(&self) -> String {
        self.input_files.iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<String>>()
            .join(", ")
    }

    fn create_config(&self) -> Config {
        let mut tasks = self.tasks;
        if self.tasks == 0 {
            tasks = num_cpus::get();
        }

        Config::new(
            self.tmp.clone(),
            "chunk-".to_string(),
            ".tmp".to_string(),
            tasks,
            self.chunk_size_bytes,
            max(self.fan_in, 2),
            max(self.flush_bytes, 1),
        )
    }

    fn with_rlimits<F>(config: &Config, f: F) -> Result<(), anyhow::Error>
        where F: FnOnce() -> Result<(), anyhow::Error> {
        let (current_soft, current_hard) = Self::get_rlimits()?;
        log::debug!("Current rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
        let required = config.tasks().saturating_mul(config.fan_in()).saturating_add(256) as u64;
        let new_soft = max(required, current_soft).min(current_hard);
        if new_soft != current_soft {
            log::debug!("Set new rlimit NOFILE, soft: {}, hard: {}", new_soft, current_hard);
            Self::set_rlimits(new_soft, current_hard)?;
        }
        let result = f();
        if new_soft != current_soft {
            log::debug!("Restore rlimit NOFILE, soft: {}, hard: {}", current_soft, current_hard);
            // a failed restore must not hide a failed sort
            return result.and(Self::set_rlimits(current_soft, current_hard));
        }
        result
    }

    fn get_rlimits() -> Result<(u64, u64), anyhow::Error> {
        getrlimit(Resource::NOFILE).with_context(|| "getrlimit")
    }

    fn set_rlimits(soft: u64, hard: u64) -> Result<(), anyhow::Error> {
        setrlimit(Resource::NOFILE, soft, hard)
            .with_context(|| format!("set rlimit NOFILE, soft: {}, hard: {}", soft, hard))?;
        Ok(())
    }

    fn sort_chunks(chunks: &TempFiles, config: &Config) -> Result<(), anyhow::Error> {
        log::debug!("Start sorting {} chunks", chunks.len());
        let errors = TaskErrors::new();
        let mut sorting_pool = create_thread_pool("sorting", config)?;
        for (index, path) in chunks.paths().iter().enumerate() {
            let sort_command = Box::new(
                SortCommand::new(path.clone(), index, chunks.len(), config.clone(), errors.clone())
            );
            sorting_pool.submit(sort_command);
        }
        log::debug!("Shutting down sorting pool");
        sorting_pool.shutdown();
        sorting_pool.join()?;
        errors.into_result()?;
        log::debug!("Completed sorting {} chunks", chunks.len());
        Ok(())
    }

    fn internal_sort(input_files: &Vec<PathBuf>, config: &Config, output: &PathBuf) -> Result<(), anyhow::Error> {
        log::debug!("Run id: {}, intermediate files in {}", config.run_id(), config.tmp().display());
        let mut chunks = TempFiles::new();
        let mut chunk_splitter = ChunkSplitter::new(config);
        for path in input_files {
            chunk_splitter.split(path, &mut chunks)?;
        }

        if !chunks.is_empty() {
            Self::sort_chunks(&chunks, config)?;
        }
        merge_all(chunks.paths().clone(), output, config)?;
        Ok(())
    }
}
