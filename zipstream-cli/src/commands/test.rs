//! Test command implementation.

use super::CmdResult;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zipstream_archive::ZipReader;

pub fn cmd_test(archive: &Path, verbose: bool) -> CmdResult {
    let mut zip = ZipReader::new(BufReader::new(File::open(archive)?))?;
    let entries = zip.entries().to_vec();

    println!("Testing {}", archive.display());

    let mut errors: Vec<(String, String)> = Vec::new();
    for entry in &entries {
        match zip.extract(entry) {
            Ok(_) => {
                if verbose {
                    println!("  OK: {}", entry.name);
                }
            }
            Err(e) => {
                if verbose {
                    println!("  FAILED: {} - {}", entry.name, e);
                }
                errors.push((entry.name.clone(), e.to_string()));
            }
        }
    }

    println!();
    println!(
        "Tested {} files: {} OK, {} failed",
        entries.len(),
        entries.len() - errors.len(),
        errors.len()
    );

    if errors.is_empty() {
        println!("No errors detected.");
        Ok(())
    } else {
        for (name, error) in &errors {
            eprintln!("  {}: {}", name, error);
        }
        Err(format!("{} entries failed verification", errors.len()).into())
    }
}
