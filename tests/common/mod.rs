use std::path::PathBuf;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Parses CSV output into its data rows, header excluded.
#[allow(dead_code)]
pub fn csv_rows(output: &[u8]) -> Vec<Vec<String>> {
    csv::Reader::from_reader(output)
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Winner column of a round ledger.
#[allow(dead_code)]
pub fn winners(output: &[u8]) -> Vec<String> {
    csv_rows(output).into_iter().map(|row| row[1].clone()).collect()
}
