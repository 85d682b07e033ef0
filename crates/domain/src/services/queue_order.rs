//! Jukebox queue ordering and duplicate detection.

use std::cmp::Ordering;

use crate::models::{JukeboxQueueItem, MusicProvider};

/// Queue ordering: most votes first, then earliest addition. Matches the
/// ORDER BY used when reading the queue, so in-memory re-sorts after a
/// vote agree with the database.
pub fn compare(a: &JukeboxQueueItem, b: &JukeboxQueueItem) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Whether a candidate track is already in the queue.
///
/// Matches on the track id against every queued item, whatever its
/// provider, since legacy rows may carry ids without provider tags. A
/// Spotify candidate additionally matches on a case-insensitive
/// title+artist pair, which catches the same song appearing under
/// different releases or already queued from YouTube.
pub fn is_duplicate(
    queue: &[JukeboxQueueItem],
    provider: MusicProvider,
    track_id: &str,
    title: &str,
    artist: &str,
) -> bool {
    let title = normalize(title);
    let artist = normalize(artist);
    queue.iter().any(|item| {
        item.track_id == track_id
            || (provider == MusicProvider::Spotify
                && normalize(&item.title) == title
                && normalize(&item.artist) == artist)
    })
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueueItemStatus;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn item(votes: i32, offset_secs: i64, track_id: &str, title: &str) -> JukeboxQueueItem {
        JukeboxQueueItem {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            track_id: track_id.to_string(),
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            album: None,
            artwork_url: None,
            duration_ms: None,
            genre: "unknown".to_string(),
            provider: MusicProvider::Spotify,
            votes,
            status: QueueItemStatus::Pending,
            added_by: "anonymous".to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_votes_desc_then_created_asc() {
        // A added first with 3 votes, B second with 5, C third with 5,
        // D last with 1. Expected playback order: B, C, A, D.
        let a = item(3, 0, "a", "Song A");
        let b = item(5, 1, "b", "Song B");
        let c = item(5, 2, "c", "Song C");
        let d = item(1, 3, "d", "Song D");
        let mut queue = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        queue.sort_by(compare);
        let ids: Vec<&str> = queue.iter().map(|i| i.track_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_duplicate_by_track_id() {
        let queue = vec![item(1, 0, "spotify:123", "Song A")];
        assert!(is_duplicate(
            &queue,
            MusicProvider::Spotify,
            "spotify:123",
            "Different Title",
            "Different Artist"
        ));
    }

    #[test]
    fn test_duplicate_by_normalized_title_artist() {
        let queue = vec![item(1, 0, "spotify:123", "Song A")];
        assert!(is_duplicate(
            &queue,
            MusicProvider::Spotify,
            "spotify:456",
            "  SONG a ",
            "test artist"
        ));
    }

    #[test]
    fn test_spotify_candidate_matches_queued_youtube_by_title() {
        let mut queued = item(1, 0, "yt:abc", "Song A");
        queued.provider = MusicProvider::Youtube;
        let queue = vec![queued];
        assert!(is_duplicate(
            &queue,
            MusicProvider::Spotify,
            "spotify:123",
            "Song A",
            "Test Artist"
        ));
    }

    #[test]
    fn test_youtube_candidate_only_matches_by_track_id() {
        // The title+artist arm applies to Spotify candidates only.
        let queue = vec![item(1, 0, "spotify:123", "Song A")];
        assert!(!is_duplicate(
            &queue,
            MusicProvider::Youtube,
            "yt:abc",
            "Song A",
            "Test Artist"
        ));
        assert!(is_duplicate(
            &queue,
            MusicProvider::Youtube,
            "spotify:123",
            "Other Title",
            "Other Artist"
        ));
    }

    #[test]
    fn test_new_track_not_duplicate() {
        let queue = vec![item(1, 0, "spotify:123", "Song A")];
        assert!(!is_duplicate(
            &queue,
            MusicProvider::Spotify,
            "spotify:789",
            "Song B",
            "Test Artist"
        ));
    }
}
