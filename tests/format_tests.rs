//! Demo and ranking files on disk

use blockfall::core::checksum::crc32;
use blockfall::core::{DemoLog, FormatError, RankEntry, RankingTable};
use blockfall::types::{Command, DemoEvent, Shape};

fn sample_demo() -> DemoLog {
    let mut demo = DemoLog::new();
    demo.add_piece(Shape::O);
    demo.add_piece(Shape::I);
    demo.add_event(100, DemoEvent::Input(Command::Left));
    demo
}

#[test]
fn crc_check_value() {
    assert_eq!(crc32(b"123456789"), 0x89A1_897F);
    assert_eq!(crc32(b""), 0);
}

#[test]
fn demo_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.demo");
    let demo = sample_demo();

    let written = demo.save(&path).unwrap();
    // 16 byte header, two pieces, one instruction, CRC
    assert_eq!(written, 16 + 8 + 8 + 4);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), written as u64);

    let loaded = DemoLog::load(&path).unwrap();
    assert_eq!(loaded, demo);
    assert_eq!(loaded.pieces(), &[Shape::O, Shape::I]);
    assert_eq!(loaded.instructions()[0].time_ms, 100);
    assert_eq!(
        loaded.instructions()[0].event(),
        Some(DemoEvent::Input(Command::Left))
    );
}

#[test]
fn tampered_demo_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.demo");
    sample_demo().save(&path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    // Change the instruction's command code
    bytes[31] ^= 0x01;
    std::fs::write(&path, &bytes).unwrap();

    let err = DemoLog::load(&path).unwrap_err();
    assert!(matches!(err, FormatError::ChecksumMismatch { .. }), "{err}");
}

#[test]
fn missing_demo_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DemoLog::load(dir.path().join("nope.demo")).unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

fn standings() -> RankingTable {
    let mut table = RankingTable::new(5);
    for (score, name) in [(900, "ada"), (600, "bob"), (400, "cy"), (100, "di"), (50, "ed")] {
        table.insert(RankEntry::new(score, 0, 0, 60_000, 1, name));
    }
    table
}

#[test]
fn ranking_insert_shifts_lower_entries() {
    let mut table = standings();
    let rank = table.insert(RankEntry::new(500, 4, 1, 60_000, 2, "eve"));
    assert_eq!(rank, 2);

    let scores: Vec<u32> = table.entries().iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![900, 600, 500, 400, 100]);
    assert_eq!(table.len(), 5);
}

#[test]
fn ranking_ignores_scores_below_the_table() {
    let mut table = standings();
    let before = table.clone();
    assert_eq!(table.insert(RankEntry::new(10, 0, 0, 1, 1, "zed")), 5);
    assert_eq!(table, before);
}

#[test]
fn ranking_file_round_trip_and_tamper() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.rank");
    let table = standings();

    table.save(&path).unwrap();
    assert_eq!(RankingTable::load(&path, 5).unwrap(), table);

    let mut bytes = std::fs::read(&path).unwrap();
    // Inside the first entry's score
    bytes[14] ^= 0x40;
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        RankingTable::load(&path, 5),
        Err(FormatError::ChecksumMismatch { .. })
    ));
    // Corruption is reported, not papered over
    assert!(RankingTable::load_or_default(&path, 5).is_err());
}

#[test]
fn ranking_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let table = RankingTable::load_or_default(dir.path().join("none.rank"), 3).unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.entries().iter().all(|e| e.score == 0 && e.name.is_empty()));
}
