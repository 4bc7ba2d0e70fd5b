//! Sort a large file of `<number>. <text>` records.
//!
//! ```text
//! large-file-sort -i input.txt -o sorted.txt --verbose
//! ```

use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use large_file_sort::sort::Sort;

/// Sort a text file of `<number>. <text>` records by text, then by number.
#[derive(Parser)]
#[command(name = "large-file-sort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file path
    #[arg(short, long, alias = "inputFilePath")]
    input_file_path: PathBuf,

    /// Output file path, defaults to SortedLargeFile_<timestamp>.txt
    #[arg(short, long, alias = "outputFilePath")]
    output_file_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Directory for intermediate files
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// Number of worker threads, 0 uses all cores
    #[arg(long, default_value = "0")]
    tasks: usize,

    /// Chunk size in MiB
    #[arg(long, default_value = "1")]
    chunk_size_mb: u64,

    /// Maximal number of files merged at once
    #[arg(long, default_value = "10")]
    fan_in: usize,
}

fn confirm_overwrite(path: &PathBuf) -> Result<bool, anyhow::Error> {
    print!("File {} already exists. Overwrite it? (y/n) ", path.display());
    stdout().flush()?;
    let mut answer = String::new();
    stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new().with_level(level).init()?;
    if cli.verbose {
        log::info!("Verbose mode enabled.");
    }

    let output = cli.output_file_path.unwrap_or_else(|| {
        PathBuf::from(format!("SortedLargeFile_{}.txt", chrono::Local::now().format("%Y%m%d_%H%M%S")))
    });

    if output.exists() && !confirm_overwrite(&output)? {
        log::info!("Operation canceled by user.");
        return Ok(());
    }

    let mut large_file_sort = Sort::new(vec![cli.input_file_path], output);
    large_file_sort.with_tasks(cli.tasks);
    large_file_sort.with_chunk_size_mb(cli.chunk_size_mb);
    large_file_sort.with_fan_in(cli.fan_in);
    if let Some(tmp_dir) = cli.tmp_dir {
        large_file_sort.with_tmp_dir(tmp_dir);
    }
    large_file_sort.sort()
}
