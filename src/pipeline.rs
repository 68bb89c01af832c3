//! Folder scan: list, filter to audio files, resolve links, emit records.

use futures::{pin_mut, Stream, StreamExt, TryStreamExt};
use tracing::{info, instrument, warn};

use crate::client::DropboxClient;
use crate::error::Result;
use crate::models::{FileEntry, OutputRecord};
use crate::resolver::LinkResolver;

/// File extensions treated as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "flac", "wav", "aiff", "m4a", "ogg"];

/// Callback receiving a message for each file skipped for lack of a link.
pub type Diagnostics<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Whether `name` ends in one of [`AUDIO_EXTENSIONS`].
pub fn is_audio_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

fn to_record(file: FileEntry, url: String) -> OutputRecord {
    OutputRecord {
        name: file.name,
        url,
        size: file.size,
        modified: file.client_modified,
    }
}

/// Lazily produce one record per linked audio file under `folder`.
///
/// Records come out in listing order. A page fetch failure is yielded as an
/// error after the records of earlier pages. Files without a link are
/// skipped and reported to `on_skip`.
pub fn record_stream<'a>(
    client: &'a DropboxClient,
    resolver: &'a LinkResolver,
    folder: &'a str,
    on_skip: Option<Diagnostics<'a>>,
) -> impl Stream<Item = Result<OutputRecord>> + 'a {
    async_stream::try_stream! {
        let pages = client.file_pages(folder);
        pin_mut!(pages);

        while let Some(files) = pages.next().await {
            for file in files? {
                if !is_audio_file(&file.name) {
                    continue;
                }

                match resolver.resolve(client, &file.path_lower).await {
                    Some(url) => {
                        yield to_record(file, url);
                    }
                    None => {
                        let message = format!("No link for {}", file.name);
                        warn!(path = %file.path_lower, "{}", message);
                        if let Some(on_skip) = on_skip {
                            on_skip(&message);
                        }
                    }
                }
            }
        }
    }
}

/// Collect every record under `folder`. The result is unsorted.
#[instrument(skip(client, resolver, on_skip))]
pub async fn collect_records(
    client: &DropboxClient,
    resolver: &LinkResolver,
    folder: &str,
    on_skip: Option<Diagnostics<'_>>,
) -> Result<Vec<OutputRecord>> {
    let records: Vec<OutputRecord> = record_stream(client, resolver, folder, on_skip)
        .try_collect()
        .await?;
    info!(count = records.len(), "Collected linked audio files");
    Ok(records)
}

/// Order records newest-modified first. Ties keep their listing order.
pub fn sort_newest_first(records: &mut [OutputRecord]) {
    records.sort_by(|a, b| b.modified.cmp(&a.modified));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_audio_extensions_match() {
        for name in [
            "song.mp3", "Track.MP3", "a.flac", "b.WAV", "c.aiff", "d.m4a", "e.Ogg",
            "live.set.mp3",
        ] {
            assert!(is_audio_file(name), "{} should match", name);
        }
    }

    #[test]
    fn test_other_extensions_rejected() {
        for name in [
            "track.mp3x", "cover.jpg", "notes.txt", "mp3", "song.mp3.bak", "song.aif", "",
        ] {
            assert!(!is_audio_file(name), "{} should not match", name);
        }
    }

    fn record(name: &str, hour: u32) -> OutputRecord {
        OutputRecord {
            name: name.to_string(),
            url: format!("https://x/{}?dl=0", name),
            size: 1,
            modified: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![record("old", 1), record("new", 9), record("mid", 5)];
        sort_newest_first(&mut records);

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut records = vec![record("first", 3), record("second", 3)];
        sort_newest_first(&mut records);
        assert_eq!(records[0].name, "first");
        assert_eq!(records[1].name, "second");
    }
}
