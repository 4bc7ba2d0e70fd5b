//! This crate sorts text files that are too large to fit in memory. Every line of the file is a
//! record of the form `<number>. <text>`, for example
//! ```text
//! 415. Apple
//! 30432. Something something something
//! 1. Apple
//! 32. Cherry is the best
//! 2. Banana is yellow
//! ```
//! Records are ordered by their text, compared byte by byte, and records with the same text are
//! ordered by their number. The file above sorts into
//! ```text
//! 1. Apple
//! 415. Apple
//! 2. Banana is yellow
//! 32. Cherry is the best
//! 30432. Something something something
//! ```
//!
//! The input is split into line aligned chunks of a configured size, each chunk is sorted in
//! memory on a pool of worker threads, and the sorted chunks are merged in passes of bounded
//! fan-in until a single sorted file remains. All intermediate files live in a temporary
//! directory and are removed when the sort completes or fails.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use large_file_sort::sort::Sort;
//!
//! // optimized for use with Jemalloc
//! use tikv_jemallocator::Jemalloc;
//! #[global_allocator]
//! static GLOBAL: Jemalloc = Jemalloc;
//!
//! fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut large_file_sort = Sort::new(vec![input.clone()], output.clone());
//!
//!     // set number of CPU cores the sort will attempt to use. The default is to use all
//!     // available cores.
//!     large_file_sort.with_tasks(2);
//!
//!     // set the directory for intermediate results. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for intermediate files, preferably on the same file system as the output result.
//!     large_file_sort.with_tmp_dir(tmp);
//!
//!     // read the input in chunks of 64 MiB
//!     large_file_sort.with_chunk_size_mb(64);
//!
//!     large_file_sort.sort()
//! }
//! ```
//!

pub(crate) mod config;
pub(crate) mod key;
pub(crate) mod line_record;
pub(crate) mod chunk_splitter;
pub(crate) mod sort_command;
pub(crate) mod unmerged_chunk_file;
pub(crate) mod merge_command;
pub(crate) mod merge_pass;
pub(crate) mod temp_files;
pub(crate) mod task_errors;

pub mod sort;
