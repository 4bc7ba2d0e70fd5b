use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Error};
use simple_logger::SimpleLogger;

use large_file_sort::sort::Sort;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const WORDS: [&str; 8] = ["Apple", "Banana", "Cherry", "is", "the", "best", "yellow", "green"];

fn create_input(path: &Path, lines: usize) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for i in 0..lines {
        let number = (i * 7919) % 10_000 + 1;
        let first = WORDS[i % WORDS.len()];
        let second = WORDS[(i / WORDS.len()) % WORDS.len()];
        writeln!(writer, "{}. {} {}", number, first, second)?;
    }
    writer.flush()?;
    Ok(())
}

fn sort_records(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    // all cores, 1 MiB chunks and a fan-in of 10 are the defaults
    let text_file = Sort::new(vec![input_path.to_path_buf()], output_path.to_path_buf());
    text_file.sort()?;
    Ok(())
}

fn sort_records_small_chunks(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut text_file = Sort::new(vec![input_path.to_path_buf()], output_path.to_path_buf());
    text_file.with_tasks(4);
    text_file.with_chunk_size_bytes(64 * 1024);
    text_file.with_fan_in(4);
    text_file.sort()?;
    Ok(())
}

// cargo run -r --example sort_text_file
pub fn main() -> Result<(), Error> {
    SimpleLogger::new().init()?;
    let input_path = PathBuf::from("./target/records-100000.dat");
    let sorted_path = PathBuf::from("./target/sorted-100000.dat");
    let small_chunks_path = PathBuf::from("./target/sorted-small-chunks-100000.dat");

    create_input(&input_path, 100_000)?;
    sort_records(&input_path, &sorted_path)?;
    sort_records_small_chunks(&input_path, &small_chunks_path)?;

    let checked = Sort::new(vec![sorted_path.clone(), small_chunks_path.clone()], PathBuf::new()).check()?;
    if !checked || fs::read(&sorted_path)? != fs::read(&small_chunks_path)? {
        return Err(anyhow!("Sorted results differ"));
    }
    log::info!("Sorted {} into {}", input_path.display(), sorted_path.display());
    Ok(())
}
