use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn vidprep_cmd() -> Command {
    Command::cargo_bin("vidprep").expect("Failed to find vidprep binary")
}

fn write_tar(path: &Path, entries: &[(&str, &str)]) -> Result<(), Box<dyn Error>> {
    let mut builder = tar::Builder::new(fs::File::create(path)?);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_bytes())?;
    }
    builder.finish()?;
    Ok(())
}

#[test]
fn test_help_lists_commands() -> Result<(), Box<dyn Error>> {
    vidprep_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("process"))
        .stdout(contains("shard"));
    Ok(())
}

#[test]
fn test_process_requires_tar() -> Result<(), Box<dyn Error>> {
    vidprep_cmd()
        .arg("process")
        .assert()
        .failure()
        .stderr(contains("--tar"));
    Ok(())
}

#[test]
fn test_process_rejects_malformed_size() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    vidprep_cmd()
        .args(["process", "--tar", "clips.tar", "--size", "256"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("Invalid size format '256'"));
    Ok(())
}

#[test]
fn test_process_rejects_unknown_format() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    vidprep_cmd()
        .args(["process", "--tar", "clips.tar", "--format", "gif"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("Unsupported format 'gif'"));
    Ok(())
}

#[test]
fn test_process_rejects_zero_frames() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    vidprep_cmd()
        .args(["process", "--tar", "clips.tar", "--frames", "0"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("frames per chunk must be greater than zero"));
    Ok(())
}

#[test]
fn test_process_missing_archive() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    vidprep_cmd()
        .args(["process", "--tar", "surely/this/does/not/exist.tar"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("Failed to read clip archive"));
    Ok(())
}

#[test]
fn test_process_archive_without_videos() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tar_path = dir.path().join("clips.tar");
    write_tar(&tar_path, &[("readme.txt", "no clips here"), ("._hidden.mp4", "resource fork")])?;

    vidprep_cmd()
        .arg("process")
        .arg("--tar")
        .arg(&tar_path)
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(contains("No video clips found"));
    Ok(())
}

#[test]
fn test_shard_command_packs_npy_tree() -> Result<(), Box<dyn Error>> {
    let input = tempdir()?;
    let shards = tempdir()?;
    let clip_dir = input.path().join("clip_a");
    fs::create_dir_all(&clip_dir)?;
    for i in 0..5 {
        fs::write(clip_dir.join(format!("chunk_{i:05}.npy")), b"npy")?;
    }

    vidprep_cmd()
        .arg("shard")
        .arg("--input")
        .arg(input.path())
        .arg("--shard-dir")
        .arg(shards.path())
        .args(["--shard-size", "2", "--format", "npy"])
        .assert()
        .success()
        .stdout(contains("3 shard(s) written"));

    for name in ["shard_00000.tar", "shard_00001.tar", "shard_00002.tar"] {
        assert!(shards.path().join(name).exists(), "{name} missing");
    }
    assert!(!shards.path().join("shard_00003.tar").exists());
    Ok(())
}

#[test]
fn test_shard_command_rejects_zero_size() -> Result<(), Box<dyn Error>> {
    let input = tempdir()?;
    vidprep_cmd()
        .arg("shard")
        .arg("--input")
        .arg(input.path())
        .arg("--shard-dir")
        .arg(input.path().join("shards"))
        .args(["--shard-size", "0"])
        .assert()
        .failure()
        .stderr(contains("shard size must be greater than zero"));
    Ok(())
}
