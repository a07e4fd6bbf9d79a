//! Metadata extraction: classify a path, then decode what the kind allows.

use lofty::{Accessor, AudioFile, TaggedFileExt};
use std::borrow::Cow;
use std::path::Path;

use crate::{Field, MediaKind, MetadataRecord};

/// Produce a record for a path. Must not fail: decode problems go into [`Field::Error`].
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> MetadataRecord;
}

impl<F> Extractor for F
where
    F: Fn(&Path) -> MetadataRecord + Send + Sync,
{
    fn extract(&self, path: &Path) -> MetadataRecord {
        self(path)
    }
}

fn owned(value: Option<Cow<'_, str>>) -> String {
    value.map(Cow::into_owned).unwrap_or_default()
}

/// Default extractor: audio tags and durations via lofty.
#[derive(Clone, Copy, Debug, Default)]
pub struct MediaExtractor;

impl MediaExtractor {
    pub fn new() -> Self {
        Self
    }

    fn audio(path: &Path) -> MetadataRecord {
        let mut record = MetadataRecord::of_kind(MediaKind::Audio);
        let tagged = match lofty::read_from_path(path) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("{}: {}", path.display(), e);
                record.set(Field::Error, format!("Metadata extraction failed: {e}"));
                return record;
            }
        };
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
        record.set(Field::Artist, owned(tag.and_then(|t| t.artist())));
        record.set(Field::Album, owned(tag.and_then(|t| t.album())));
        record.set(Field::Title, owned(tag.and_then(|t| t.title())));
        record.set(
            Field::Year,
            tag.and_then(|t| t.year()).unwrap_or(0).to_string(),
        );
        record.set(
            Field::Duration,
            tagged.properties().duration().as_secs().to_string(),
        );
        record
    }

    fn video(path: &Path) -> MetadataRecord {
        let mut record = MetadataRecord::of_kind(MediaKind::Video);
        // Containers lofty understands (mp4/mov) carry a duration; others just get the type.
        if let Ok(tagged) = lofty::read_from_path(path) {
            record.set(
                Field::Duration,
                tagged.properties().duration().as_secs().to_string(),
            );
        }
        record
    }
}

impl Extractor for MediaExtractor {
    fn extract(&self, path: &Path) -> MetadataRecord {
        match MediaKind::classify(path) {
            MediaKind::Audio => Self::audio(path),
            MediaKind::Video => Self::video(path),
            kind => MetadataRecord::of_kind(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal PCM WAV: mono, 16-bit, `secs` seconds of silence at 8 kHz.
    fn write_wav(path: &Path, secs: u32) {
        let sample_rate = 8_000u32;
        let block_align = 2u16;
        let data_len = sample_rate * secs * block_align as u32;
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(b"RIFF").unwrap();
        f.write_all(&(36 + data_len).to_le_bytes()).unwrap();
        f.write_all(b"WAVEfmt ").unwrap();
        f.write_all(&16u32.to_le_bytes()).unwrap();
        f.write_all(&1u16.to_le_bytes()).unwrap(); // PCM
        f.write_all(&1u16.to_le_bytes()).unwrap(); // mono
        f.write_all(&sample_rate.to_le_bytes()).unwrap();
        f.write_all(&(sample_rate * block_align as u32).to_le_bytes())
            .unwrap();
        f.write_all(&block_align.to_le_bytes()).unwrap();
        f.write_all(&16u16.to_le_bytes()).unwrap();
        f.write_all(b"data").unwrap();
        f.write_all(&data_len.to_le_bytes()).unwrap();
        f.write_all(&vec![0u8; data_len as usize]).unwrap();
    }

    #[test]
    fn untagged_wav_has_duration_and_empty_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 2);
        let record = MediaExtractor::new().extract(&path);
        assert_eq!(record.get(Field::Type), Some("Audio"));
        assert_eq!(record.get(Field::Duration), Some("2"));
        assert_eq!(record.get(Field::Artist), Some(""));
        assert_eq!(record.get(Field::Year), Some("0"));
        assert!(!record.is_error());
    }

    #[test]
    fn tagged_wav_maps_every_field() {
        use lofty::{Tag, TagExt, TagType};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path, 3);
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_artist("A".to_string());
        tag.set_album("B".to_string());
        tag.set_title("C".to_string());
        tag.set_year(2020);
        tag.save_to_path(&path).unwrap();

        let record = MediaExtractor::new().extract(&path);
        assert_eq!(
            record,
            MetadataRecord::of_kind(MediaKind::Audio)
                .with(Field::Artist, "A")
                .with(Field::Album, "B")
                .with(Field::Title, "C")
                .with(Field::Year, "2020")
                .with(Field::Duration, "3")
        );
    }

    #[test]
    fn corrupt_audio_yields_error_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"this is plain text, not an mpeg stream").unwrap();
        let record = MediaExtractor::new().extract(&path);
        assert_eq!(record.get(Field::Type), Some("Audio"));
        assert!(record.is_error());
        assert!(record.get(Field::Artist).is_none());
    }

    #[test]
    fn missing_audio_file_yields_error_record() {
        let record = MediaExtractor::new().extract(Path::new("/nonexistent/file.mp3"));
        assert!(record.is_error());
    }

    #[test]
    fn non_audio_kinds_carry_type_only() {
        let ex = MediaExtractor::new();
        assert_eq!(
            ex.extract(Path::new("/x/plug.vst3")),
            MetadataRecord::of_kind(MediaKind::Plugin)
        );
        assert_eq!(
            ex.extract(Path::new("/x/a.preset")),
            MetadataRecord::of_kind(MediaKind::Preset)
        );
        assert_eq!(
            ex.extract(Path::new("/x/doc.txt")),
            MetadataRecord::of_kind(MediaKind::Other)
        );
        assert_eq!(ex.extract(Path::new("/x/clip.avi")).get(Field::Type), Some("Video"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 1);
        let ex = MediaExtractor::new();
        assert_eq!(ex.extract(&path), ex.extract(&path));
    }

    #[test]
    fn closures_are_extractors() {
        let ex = |p: &Path| MetadataRecord::of_kind(MediaKind::classify(p));
        assert_eq!(ex.extract(Path::new("a.mp3")).get(Field::Type), Some("Audio"));
    }
}
