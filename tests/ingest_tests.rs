//! End-to-end ingestion runs against scratch directories.

use lofty::{Accessor, Tag, TagExt, TagType};
use medialib::engine::{load_records, path_to_db_string};
use medialib::{
    Coordinator, Extractor, Field, IngestError, MediaKind, MetadataRecord, Opts, ingest_dir,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fast_opts(db_dir: &Path) -> Opts {
    Opts {
        db_path: db_dir.join("library.db"),
        num_workers: Some(3),
        poll_interval: Duration::from_millis(20),
        idle_polls: 10,
        ..Opts::default()
    }
}

fn canonical(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

/// Deterministic stand-in for the media decoder.
fn stub(path: &Path) -> MetadataRecord {
    let kind = MediaKind::classify(path);
    let mut record = MetadataRecord::of_kind(kind);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    if name.starts_with("bad") {
        record.set(Field::Error, "Metadata extraction failed: stub");
    } else if kind == MediaKind::Audio {
        record.set(Field::Artist, "A");
        record.set(Field::Album, "B");
        record.set(Field::Title, "C");
        record.set(Field::Year, "2020");
        record.set(Field::Duration, "180");
    }
    record
}

fn stub_coordinator(opts: Opts) -> Coordinator {
    Coordinator::new(opts).with_extractor(Arc::new(stub))
}

#[test]
fn test_scan_ingests_every_file_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("song.mp3"), b"x").unwrap();
    fs::write(root.join("doc.txt"), b"hello").unwrap();
    fs::create_dir(root.join("nested")).unwrap();
    fs::write(root.join("nested/clip.mp4"), b"x").unwrap();

    let library = stub_coordinator(fast_opts(&root)).run(&root).unwrap();

    assert_eq!(library.records().len(), 3);
    let song = library.record(&root.join("song.mp3")).unwrap();
    assert_eq!(song.get(Field::Type), Some("Audio"));
    assert_eq!(song.get(Field::Artist), Some("A"));
    assert_eq!(song.get(Field::Album), Some("B"));
    assert_eq!(song.get(Field::Title), Some("C"));
    assert_eq!(song.get(Field::Year), Some("2020"));
    assert_eq!(song.get(Field::Duration), Some("180"));
    let doc = library.record(&root.join("doc.txt")).unwrap();
    assert_eq!(doc.get(Field::Type), Some("Other"));
    assert_eq!(doc.len(), 1);
    assert_eq!(
        library
            .record(&root.join("nested/clip.mp4"))
            .unwrap()
            .get(Field::Type),
        Some("Video")
    );
    // The database lives inside the root but is never ingested.
    assert!(library.record(&root.join("library.db")).is_none());

    let summary = library.summary();
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.workers, 3);
    assert_eq!(summary.persisted.written, 3);
    assert_eq!(summary.persisted.failed, 0);
}

#[test]
fn test_database_rows_match_records() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("a.flac"), b"x").unwrap();
    fs::write(root.join("b.fxp"), b"x").unwrap();
    fs::write(root.join("bad.wav"), b"x").unwrap();

    let library = stub_coordinator(fast_opts(db_dir.path()))
        .run(&root)
        .unwrap();

    let rows = library.stored_rows().unwrap();
    assert_eq!(rows.len(), library.records().len());
    for row in &rows {
        let record = library.record(Path::new(&row.filepath)).unwrap();
        assert_eq!(row.kind, record.get_or_empty(Field::Type));
        assert_eq!(row.artist, record.get_or_empty(Field::Artist));
        assert_eq!(row.duration, record.get_or_empty(Field::Duration));
    }
    let bad = rows
        .iter()
        .find(|r| r.filepath == path_to_db_string(&root.join("bad.wav")))
        .unwrap();
    assert_eq!(bad.kind, "Audio");
    assert_eq!(bad.title, "");

    // A fresh connection sees the same rows.
    let conn = medialib::engine::open_db(&db_dir.path().join("library.db")).unwrap();
    assert_eq!(load_records(&conn).unwrap(), rows);
}

#[test]
fn test_file_created_during_run_is_ingested() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("trigger.mp3"), b"x").unwrap();

    // Extracting the trigger drops a new file into the root, which only the watcher can
    // report once the scan has already listed the directory.
    let late = root.join("late.wav");
    let late_in_stub = late.clone();
    let extractor: Arc<dyn Extractor> = Arc::new(move |path: &Path| {
        if path.ends_with("trigger.mp3") {
            let _ = fs::write(&late_in_stub, b"x");
        }
        stub(path)
    });
    let library = Coordinator::new(fast_opts(db_dir.path()))
        .with_extractor(extractor)
        .run(&root)
        .unwrap();

    assert!(library.record(&root.join("trigger.mp3")).is_some());
    let record = library.record(&late).unwrap();
    assert_eq!(record.get(Field::Type), Some("Audio"));
    assert!(library.summary().watched >= 1);
    assert_eq!(library.summary().persisted.written, 2);
}

#[test]
fn test_failed_extraction_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    for i in 0..20 {
        fs::write(root.join(format!("track{i}.mp3")), b"x").unwrap();
    }
    fs::write(root.join("bad.mp3"), b"x").unwrap();

    let library = stub_coordinator(fast_opts(db_dir.path()))
        .run(&root)
        .unwrap();

    assert_eq!(library.records().len(), 21);
    let bad = library.record(&root.join("bad.mp3")).unwrap();
    assert!(bad.is_error());
    assert_eq!(bad.get(Field::Type), Some("Audio"));
    assert_eq!(
        library.records().values().filter(|r| r.is_error()).count(),
        1
    );
    assert_eq!(library.summary().persisted.written, 21);
}

#[test]
fn test_panicking_extractor_yields_error_record() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("boom.mp3"), b"x").unwrap();
    fs::write(root.join("fine.mp3"), b"x").unwrap();

    let extractor: Arc<dyn Extractor> = Arc::new(|path: &Path| {
        if path.ends_with("boom.mp3") {
            panic!("decoder blew up");
        }
        stub(path)
    });
    let library = Coordinator::new(fast_opts(db_dir.path()))
        .with_extractor(extractor)
        .run(&root)
        .unwrap();

    assert!(library.record(&root.join("boom.mp3")).unwrap().is_error());
    assert!(!library.record(&root.join("fine.mp3")).unwrap().is_error());
}

#[test]
fn test_stop_signal_still_finishes_scan() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("a.mp3"), b"x").unwrap();
    fs::write(root.join("b.mp3"), b"x").unwrap();

    let coordinator = stub_coordinator(fast_opts(db_dir.path()));
    coordinator.stop_signal().stop();
    let library = coordinator.run(&root).unwrap();

    assert_eq!(library.records().len(), 2);
    assert_eq!(library.summary().watched, 0);
}

#[test]
fn test_rerun_updates_rows_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    fs::write(root.join("a.mp3"), b"x").unwrap();

    let coordinator = stub_coordinator(fast_opts(db_dir.path()));
    drop(coordinator.run(&root).unwrap());
    fs::write(root.join("b.mp3"), b"x").unwrap();
    let library = coordinator.run(&root).unwrap();

    let rows = library.stored_rows().unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);

    let library = stub_coordinator(fast_opts(db_dir.path()))
        .run(&root)
        .unwrap();

    assert!(library.records().is_empty());
    assert_eq!(library.summary().persisted.written, 0);
    assert!(library.stored_rows().unwrap().is_empty());
}

#[test]
fn test_invalid_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = ingest_dir(&missing, &fast_opts(dir.path())).unwrap_err();
    assert!(matches!(err, IngestError::InvalidRoot(p) if p == missing));

    let file = dir.path().join("file.mp3");
    fs::write(&file, b"x").unwrap();
    let err = ingest_dir(&file, &fast_opts(dir.path())).unwrap_err();
    assert!(matches!(err, IngestError::InvalidRoot(_)));
}

#[test]
fn test_unopenable_database_is_store_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Opts {
        db_path: dir.path().join("missing-dir").join("library.db"),
        ..fast_opts(dir.path())
    };
    let err = ingest_dir(dir.path(), &opts).unwrap_err();
    assert!(matches!(err, IngestError::StoreOpen { .. }));
}

#[cfg(unix)]
#[test]
fn test_traversal_error_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    for i in 0..10 {
        fs::write(root.join(format!("track{i}.mp3")), b"x").unwrap();
    }
    std::os::unix::fs::symlink(root.join("gone.wav"), root.join("zz_broken")).unwrap();

    let opts = Opts {
        follow_links: true,
        ..fast_opts(db_dir.path())
    };
    let start = Instant::now();
    let err = stub_coordinator(opts).run(&root).unwrap_err();

    assert!(matches!(err, IngestError::Scan { .. }), "got {err}");
    assert!(err.to_string().contains("zz_broken"));
    assert!(start.elapsed() < Duration::from_secs(5));
    // Nothing was flushed for the abandoned run.
    let conn = medialib::engine::open_db(&db_dir.path().join("library.db")).unwrap();
    assert!(load_records(&conn).unwrap().is_empty());
}

#[test]
fn test_default_extractor_reads_tagged_audio() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    let song = root.join("song.wav");
    write_silent_wav(&song, 3);
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_artist("A".to_string());
    tag.set_album("B".to_string());
    tag.set_title("C".to_string());
    tag.set_year(2020);
    tag.save_to_path(&song).unwrap();
    fs::write(root.join("doc.txt"), b"hello").unwrap();

    let library = ingest_dir(&root, &fast_opts(db_dir.path())).unwrap();

    let expected = MetadataRecord::of_kind(MediaKind::Audio)
        .with(Field::Artist, "A")
        .with(Field::Album, "B")
        .with(Field::Title, "C")
        .with(Field::Year, "2020")
        .with(Field::Duration, "3");
    assert_eq!(library.record(&song), Some(&expected));
    assert_eq!(
        library.record(&root.join("doc.txt")),
        Some(&MetadataRecord::of_kind(MediaKind::Other))
    );
    let rows = library.stored_rows().unwrap();
    let row = rows
        .iter()
        .find(|r| r.filepath == path_to_db_string(&song))
        .unwrap();
    assert_eq!(
        (row.artist.as_str(), row.album.as_str(), row.title.as_str()),
        ("A", "B", "C")
    );
    assert_eq!((row.year.as_str(), row.duration.as_str()), ("2020", "3"));
}

#[test]
fn test_default_extractor_reads_wav_and_flags_corrupt_audio() {
    let dir = tempfile::tempdir().unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let root = canonical(&dir);
    write_silent_wav(&root.join("tone.wav"), 1);
    fs::write(root.join("broken.mp3"), b"definitely not an mpeg stream").unwrap();
    fs::write(root.join("notes.txt"), b"hi").unwrap();

    let library = ingest_dir(&root, &fast_opts(db_dir.path())).unwrap();

    let tone = library.record(&root.join("tone.wav")).unwrap();
    assert!(!tone.is_error());
    assert_eq!(tone.get(Field::Duration), Some("1"));
    assert_eq!(tone.get(Field::Year), Some("0"));
    let broken = library.record(&root.join("broken.mp3")).unwrap();
    assert_eq!(broken.get(Field::Type), Some("Audio"));
    assert!(
        broken
            .get_or_empty(Field::Error)
            .starts_with("Metadata extraction failed:")
    );
    assert_eq!(
        library.record(&root.join("notes.txt")).unwrap().get(Field::Type),
        Some("Other")
    );
    assert_eq!(library.summary().persisted.written, 3);
}

/// Minimal PCM WAV: 8 kHz, mono, 16-bit silence.
fn write_silent_wav(path: &Path, seconds: u32) {
    let sample_rate: u32 = 8000;
    let data_len = sample_rate * 2 * seconds;
    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(44 + data_len as usize, 0);
    fs::write(path, buf).unwrap();
}
