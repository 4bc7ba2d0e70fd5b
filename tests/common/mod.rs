use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet consectetur adipiscing elit Etiam sed felis massa \
Nulla in libero vel lacus fringilla feugiat Aenean ex mauris vestibulum at feugiat eu pretium ut nunc \
Vivamus vitae blandit mauris Nulla facilisi Curabitur elit urna vulputate a ullamcorper vitae tempor non \
felis Vivamus imperdiet tempus ex in eleifend orci rhoncus sed Duis porttitor pellentesque nulla sit amet \
viverra Vivamus ut eros metus Integer venenatis orci quis pretium condimentum In hac habitasse platea";

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();
    let parallel_results_dir_path = PathBuf::from_str("./target/parallel-results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    }

    if !parallel_results_dir_path.exists() {
        fs::create_dir_all(&parallel_results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create parallel results directory: {:?}", parallel_results_dir_path)
        );
    }
}

#[allow(dead_code)]
pub fn read_lines(path: PathBuf) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().map(|x| x.unwrap()).collect();
    Ok(lines)
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

/// Create an empty directory with a random name, used as a dedicated tmp dir.
#[allow(dead_code)]
pub fn temp_dir(dir: &str) -> PathBuf {
    let path = temp_file_name(dir);
    fs::create_dir_all(&path).unwrap();
    path
}

#[allow(dead_code)]
pub fn count_files(dir: &PathBuf) -> usize {
    fs::read_dir(dir).unwrap().count()
}

/// Generate `lines` records of the form `<1..9999>. <1 to 3 words>`.
#[allow(dead_code)]
pub fn generate_records(path: &PathBuf, lines: usize, seed: u64) -> Result<(), anyhow::Error> {
    let words: Vec<&str> = LOREM_IPSUM.split(' ').collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = BufWriter::new(File::create(path)?);
    for _ in 0..lines {
        let number: u32 = rng.gen_range(1..10000);
        let count = rng.gen_range(1..4);
        let text: Vec<&str> = (0..count)
            .map(|_| *words.choose(&mut rng).unwrap())
            .collect();
        writeln!(writer, "{}. {}", number, text.join(" "))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the lines of `input` to `output` in a random order.
#[allow(dead_code)]
pub fn shuffle_lines(input: &PathBuf, output: &PathBuf, seed: u64) -> Result<(), anyhow::Error> {
    let mut lines = read_lines(input.clone())?;
    let mut rng = StdRng::seed_from_u64(seed);
    lines.shuffle(&mut rng);
    let mut writer = BufWriter::new(File::create(output)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}
