use std::fs;
use std::path::PathBuf;

use large_file_sort::sort::Sort;

mod common;

#[test]
fn test_check_sorted() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    fs::write(&input_path, "1. A\n2. A\n3. B\n1. C\n6. D\n5. E\n4. F\n")?;

    let large_file_sort = Sort::new(vec![input_path.clone(), input_path.clone()], PathBuf::new());
    let result = large_file_sort.check()?;
    assert_eq!(result, true);
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_check_not_sorted() -> Result<(), anyhow::Error> {
    common::setup();
    let sorted_path = common::temp_file_name("./target/results/");
    let unsorted_path = common::temp_file_name("./target/results/");
    fs::write(&sorted_path, "2. A\n3. B\n")?;
    fs::write(&unsorted_path, "10. A\n2. A\n")?;

    let large_file_sort = Sort::new(vec![sorted_path.clone(), unsorted_path.clone()], PathBuf::new());
    let result = large_file_sort.check()?;
    assert_eq!(result, false);
    fs::remove_file(sorted_path)?;
    fs::remove_file(unsorted_path)?;
    Ok(())
}

#[test]
fn test_check_empty() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/results/");
    fs::write(&input_path, "")?;

    let large_file_sort = Sort::new(vec![input_path.clone()], PathBuf::new());
    assert!(large_file_sort.check()?);
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_check_missing_file() {
    let large_file_sort = Sort::new(vec![PathBuf::from("./target/results/no-such-file")], PathBuf::new());
    assert!(large_file_sort.check().is_err());
}
