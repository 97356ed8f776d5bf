//! End-to-end host runs against disk image files

use foxosd::{HostRuntime, HostRuntimeConfig, HostRuntimeError, InputScript};
use fs_table::Limits;
use hal::{BlockDevice, BufferConsole, SECTOR_SIZE};
use services_logger::{LogLevel, MemoryLog};
use services_storage::{StorageError, FS_DATA_START_SECTOR};
use std::path::Path;
use tempfile::tempdir;

fn config_for(disk: &Path) -> HostRuntimeConfig {
    HostRuntimeConfig {
        disk: Some(disk.to_path_buf()),
        limits: Limits {
            max_entries: 32,
            max_file_size: 256,
        },
        ..HostRuntimeConfig::default()
    }
}

fn boot(config: HostRuntimeConfig) -> HostRuntime<MemoryLog> {
    HostRuntime::with_log(config, MemoryLog::new(LogLevel::Debug, 256)).unwrap()
}

fn run_script(runtime: &mut HostRuntime<MemoryLog>, script: &str) -> String {
    let mut console = BufferConsole::new();
    runtime
        .run_script(InputScript::from_text(script).unwrap(), &mut console)
        .unwrap();
    console.take()
}

#[test]
fn test_files_survive_restart() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("fox.img");

    let mut first = boot(config_for(&disk));
    run_script(
        &mut first,
        "$ mkdir /docs\n$ touch /docs/a.txt\n$ write /docs/a.txt hi\n",
    );
    assert!(!first.is_dirty());
    drop(first);

    let mut second = boot(config_for(&disk));
    assert!(second
        .log()
        .entries()
        .any(|e| e.message == "table loaded" && e.field("entries") == Some("3")));

    let out = run_script(&mut second, "$ ls /docs\n$ cat /docs/a.txt\n");
    assert_eq!(
        out,
        "FoxOS> ls /docs\na.txt\nFoxOS> cat /docs/a.txt\nhi\n"
    );
}

#[test]
fn test_first_boot_formats_the_image() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("fresh.img");

    let runtime = boot(config_for(&disk));
    assert!(runtime
        .log()
        .entries()
        .any(|e| e.message == "disk formatted"));
    assert_eq!(runtime.table().live_count(), 1);
    assert!(std::fs::metadata(&disk).unwrap().len() > FS_DATA_START_SECTOR * SECTOR_SIZE as u64);
}

#[test]
fn test_without_autosave_only_sync_persists() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("fox.img");
    let config = HostRuntimeConfig {
        autosave: false,
        ..config_for(&disk)
    };

    let mut runtime = boot(config.clone());
    run_script(&mut runtime, "$ mkdir /kept\n$ sync\n$ mkdir /lost\n");
    assert!(runtime.is_dirty());
    drop(runtime);

    let runtime = boot(config);
    assert!(runtime.table().exists("/kept"));
    assert!(!runtime.table().exists("/lost"));
}

#[test]
fn test_sync_reports_what_was_written() {
    let dir = tempdir().unwrap();
    let mut runtime = boot(config_for(&dir.path().join("fox.img")));

    let out = run_script(&mut runtime, "$ touch /a\n$ sync\n");
    assert!(out.contains("Saved 2 entries ("));
}

#[test]
fn test_deletes_are_persisted_compacted() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("fox.img");

    let mut runtime = boot(config_for(&disk));
    run_script(
        &mut runtime,
        "$ mkdir /a\n$ mkdir /b\n$ touch /b/x\n$ rm /a\n",
    );
    drop(runtime);

    let runtime = boot(config_for(&disk));
    let table = runtime.table();
    assert_eq!(table.live_count(), 3);
    assert_eq!(
        table.path_of(table.resolve("/b/x").unwrap()).as_deref(),
        Some("/b/x")
    );
}

#[test]
fn test_damaged_image_refuses_to_boot() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("fox.img");

    let mut runtime = boot(config_for(&disk));
    run_script(&mut runtime, "$ touch /precious\n");
    drop(runtime);

    // Flip one payload byte behind the host's back
    let mut image = foxosd::FileDisk::open(&disk, 0).unwrap();
    let mut sector = [0u8; SECTOR_SIZE];
    image.read_sector(FS_DATA_START_SECTOR, &mut sector).unwrap();
    sector[3] ^= 0x20;
    image.write_sector(FS_DATA_START_SECTOR, &sector).unwrap();
    drop(image);

    let err = HostRuntime::with_log(config_for(&disk), MemoryLog::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        HostRuntimeError::Storage(StorageError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_line_input_matches_scripted_input() {
    let dir = tempdir().unwrap();
    let mut runtime = boot(config_for(&dir.path().join("fox.img")));

    let mut console = BufferConsole::new();
    let summary = runtime
        .run_lines("mkdir /docs\ncd /docs\npwd\nexit\npwd\n".as_bytes(), &mut console)
        .unwrap();

    assert!(summary.exited);
    assert_eq!(summary.lines, 4);
    assert_eq!(
        console.text(),
        "FoxOS> FoxOS> FoxOS> /docs\nFoxOS> Exiting FoxOS...\n"
    );
}

#[test]
fn test_config_file_drives_limits() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("foxosd.json");
    std::fs::write(
        &config_path,
        r#"{"limits": {"max_entries": 3, "max_file_size": 8}, "log_level": "warn"}"#,
    )
    .unwrap();

    let config = HostRuntimeConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.log_level, LogLevel::Warn);

    let mut runtime = boot(config);
    let out = run_script(&mut runtime, "$ touch /a\n$ touch /b\n$ touch /c\n");
    assert!(out.contains("Error: touch: /c: No space left in file table\n"));
}

#[test]
fn test_single_slot_table_round_trips() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("tiny.img");
    let config_path = dir.path().join("foxosd.json");
    std::fs::write(
        &config_path,
        r#"{"limits": {"max_entries": 1, "max_file_size": 0}}"#,
    )
    .unwrap();
    let config = HostRuntimeConfig {
        disk: Some(disk),
        ..HostRuntimeConfig::from_json_file(&config_path).unwrap()
    };

    let mut first = boot(config.clone());
    let out = run_script(&mut first, "$ touch /a\n");
    assert!(out.contains("Error: touch: /a: No space left in file table\n"));
    drop(first);

    let second = boot(config);
    assert_eq!(second.table().live_count(), 1);
    assert_eq!(second.table().capacity(), 1);
}

#[test]
fn test_failed_autosave_keeps_the_session_running() {
    let dir = tempdir().unwrap();
    let disk = dir.path().join("small.img");
    // Room for a single payload sector
    let config = HostRuntimeConfig {
        disk_sectors: FS_DATA_START_SECTOR + 1,
        ..config_for(&disk)
    };

    let mut runtime = boot(config.clone());
    let big = "x".repeat(240);
    let out = run_script(
        &mut runtime,
        &format!("$ touch /a\n$ write /a {}\n$ sync\n$ pwd\n$ write /a ok\n", big),
    );

    assert!(out.contains("Error: autosave failed: "));
    assert!(out.contains("Error: sync: "));
    assert!(out.contains("FoxOS> pwd\n/\n"));
    assert!(!runtime.is_dirty());
    assert!(runtime
        .log()
        .entries()
        .any(|e| e.message == "save failed" && e.level == LogLevel::Error));
    drop(runtime);

    let mut again = boot(config);
    assert_eq!(run_script(&mut again, "$ cat /a\n"), "FoxOS> cat /a\nok\n");
}
