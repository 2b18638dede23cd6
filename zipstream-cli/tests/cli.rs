use std::path::PathBuf;
use std::process::Command;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zipstream-cli-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn zipstream() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zipstream"))
}

#[test]
fn test_create_matches_predicted_size() {
    let dir = scratch_dir("create");
    let a = dir.join("a.txt");
    let b = dir.join("b.bin");
    std::fs::write(&a, b"hello").unwrap();
    std::fs::write(&b, vec![7u8; 70_000]).unwrap();
    let archive = dir.join("out.zip");

    let size = zipstream()
        .args(["size", "--files"])
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(size.status.success());
    let predicted: u64 = String::from_utf8(size.stdout).unwrap().trim().parse().unwrap();

    let create = zipstream()
        .arg("create")
        .arg(&archive)
        .arg(&a)
        .arg(&b)
        .args(["--chunk-size", "4096"])
        .status()
        .unwrap();
    assert!(create.success());
    assert_eq!(std::fs::metadata(&archive).unwrap().len(), predicted);

    let test = zipstream().arg("test").arg(&archive).status().unwrap();
    assert!(test.success());

    let list = zipstream().arg("list").arg(&archive).output().unwrap();
    let listing = String::from_utf8(list.stdout).unwrap();
    assert!(listing.contains("a.txt"));
    assert!(listing.contains("b.bin"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_bundle_from_manifest() {
    let dir = scratch_dir("bundle");
    let manifest = dir.join("files.json");
    let source = dir.join("data.bin");
    let archive = dir.join("out.zip");
    std::fs::write(
        &manifest,
        r#"{"files":[{"name":"a","size":3},{"name":"b","size":3}]}"#,
    )
    .unwrap();
    std::fs::write(&source, b"abcdef").unwrap();

    let bundle = zipstream()
        .arg("bundle")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--source")
        .arg(&source)
        .arg(&archive)
        .args(["--mtime", "2024-01-01T00:00:00Z"])
        .status()
        .unwrap();
    assert!(bundle.success());

    let list = zipstream()
        .args(["list", "--json"])
        .arg(&archive)
        .output()
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(rows[0]["name"], "a");
    assert_eq!(rows[1]["name"], "b");
    assert_eq!(rows[1]["size"], 3);
    assert_eq!(rows[0]["modified"], "2024-01-01T00:00:00");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_strict_bundle_fails_on_short_source() {
    let dir = scratch_dir("strict");
    let manifest = dir.join("files.json");
    let source = dir.join("data.bin");
    let archive = dir.join("out.zip");
    std::fs::write(&manifest, r#"{"files":[{"name":"a","size":10}]}"#).unwrap();
    std::fs::write(&source, b"abc").unwrap();

    let bundle = zipstream()
        .arg("bundle")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--source")
        .arg(&source)
        .arg(&archive)
        .arg("--strict")
        .output()
        .unwrap();
    assert!(!bundle.status.success());
    assert!(String::from_utf8_lossy(&bundle.stderr).contains("Error:"));
    assert!(!archive.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
