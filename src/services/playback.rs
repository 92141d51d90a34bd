//! Episode playback sequencing.
//!
//! A session resolves the playable URL for a watch target and moves between
//! episodes of a series. It never fetches or plays media; every transition
//! just yields the next `WatchTarget` for the caller to navigate to.

use serde::{Deserialize, Serialize};

use crate::models::{CatalogEntry, ContentKind, Episode, WatchTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing playable was resolved
    Unresolved,
    MovieReady,
    EpisodeReady { index: usize },
}

/// Input events from the caller and the playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackEvent {
    Next,
    Previous,
    /// The playback surface finished the current media
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Ready(PlaybackSession),
    /// A series opened without an episode goes to the series detail page
    SeriesOverview { content_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    content_id: String,
    state: PlaybackState,
    video_url: Option<String>,
    episodes: Vec<Episode>,
}

/// Per-content stream endpoint for movies
pub fn movie_stream_url(stream_path_prefix: &str, content_id: &str) -> String {
    format!(
        "{}/{}/stream",
        stream_path_prefix.trim_end_matches('/'),
        content_id
    )
}

impl PlaybackSession {
    pub fn unresolved(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            state: PlaybackState::Unresolved,
            video_url: None,
            episodes: Vec::new(),
        }
    }

    /// Resolves a watch target against its catalog entry.
    ///
    /// The episode index is trusted on entry; only `next` and `previous`
    /// check bounds.
    pub fn load(
        entry: &CatalogEntry,
        content_id: &str,
        episode_index: Option<usize>,
        stream_path_prefix: &str,
    ) -> LoadOutcome {
        match (entry.kind, episode_index) {
            (Some(ContentKind::Series), None) => {
                tracing::debug!(content_id = %content_id, "Series without episode, handing off to overview");
                LoadOutcome::SeriesOverview {
                    content_id: content_id.to_string(),
                }
            }
            (Some(ContentKind::Series), Some(index)) => {
                let mut session = Self {
                    content_id: content_id.to_string(),
                    state: PlaybackState::EpisodeReady { index },
                    video_url: None,
                    episodes: entry.episodes.clone().unwrap_or_default(),
                };
                session.video_url = session.episode_url(index);
                LoadOutcome::Ready(session)
            }
            (Some(ContentKind::Movie), _) => LoadOutcome::Ready(Self {
                content_id: content_id.to_string(),
                state: PlaybackState::MovieReady,
                video_url: Some(movie_stream_url(stream_path_prefix, content_id)),
                episodes: Vec::new(),
            }),
            _ => LoadOutcome::Ready(Self::unresolved(content_id)),
        }
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn episode_index(&self) -> Option<usize> {
        match self.state {
            PlaybackState::EpisodeReady { index } => Some(index),
            _ => None,
        }
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.episode_index().and_then(|index| self.episodes.get(index))
    }

    fn episode_url(&self, index: usize) -> Option<String> {
        self.episodes
            .get(index)
            .and_then(|episode| episode.video_url.clone())
            .filter(|url| !url.is_empty())
    }

    fn next_index(&self) -> Option<usize> {
        self.episode_index()
            .map(|index| index + 1)
            .filter(|next| *next < self.episode_count())
    }

    fn previous_index(&self) -> Option<usize> {
        self.episode_index().and_then(|index| index.checked_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    /// Target `next` would move to, without moving
    pub fn next_target(&self) -> Option<WatchTarget> {
        self.next_index()
            .map(|index| WatchTarget::episode(self.content_id.as_str(), index))
    }

    /// Target `previous` would move to, without moving
    pub fn previous_target(&self) -> Option<WatchTarget> {
        self.previous_index()
            .map(|index| WatchTarget::episode(self.content_id.as_str(), index))
    }

    fn move_to(&mut self, index: usize) -> WatchTarget {
        self.state = PlaybackState::EpisodeReady { index };
        self.video_url = self.episode_url(index);
        WatchTarget::episode(self.content_id.as_str(), index)
    }

    /// Advances one episode; `None` when there is no next episode
    pub fn next(&mut self) -> Option<WatchTarget> {
        let index = self.next_index()?;
        Some(self.move_to(index))
    }

    /// Steps back one episode; `None` on the first episode
    pub fn previous(&mut self) -> Option<WatchTarget> {
        let index = self.previous_index()?;
        Some(self.move_to(index))
    }

    /// Applies one event. Each `Ended` advances at most once, and never past
    /// the final episode.
    pub fn handle(&mut self, event: PlaybackEvent) -> Option<WatchTarget> {
        let target = match event {
            PlaybackEvent::Next | PlaybackEvent::Ended => self.next(),
            PlaybackEvent::Previous => self.previous(),
        };

        match &target {
            Some(target) => tracing::debug!(?event, target = %target, "Playback transition"),
            None => tracing::debug!(?event, state = ?self.state, "Playback transition unavailable"),
        }

        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PREFIX: &str = "/api/content";

    fn series(episodes: usize) -> CatalogEntry {
        let episodes: Vec<_> = (0..episodes)
            .map(|i| json!({ "title": format!("Ep {}", i + 1), "videoUrl": format!("/v/{}.mp4", i) }))
            .collect();
        serde_json::from_value::<CatalogEntry>(json!({
            "_id": "s1",
            "title": "Show",
            "type": "series",
            "episodes": episodes
        }))
        .unwrap()
        .canonicalize()
    }

    fn ready(outcome: LoadOutcome) -> PlaybackSession {
        match outcome {
            LoadOutcome::Ready(session) => session,
            other => panic!("expected a playback session, got {:?}", other),
        }
    }

    #[test]
    fn test_movie_resolves_stream_endpoint() {
        let movie: CatalogEntry =
            serde_json::from_value(json!({ "_id": "m1", "type": "movie" })).unwrap();
        let session = ready(PlaybackSession::load(&movie, "m1", None, PREFIX));

        assert_eq!(session.state(), PlaybackState::MovieReady);
        assert_eq!(session.video_url(), Some("/api/content/m1/stream"));
        assert!(!session.has_next());
        assert!(!session.has_previous());
    }

    #[test]
    fn test_movie_ignores_episode_index() {
        let movie: CatalogEntry =
            serde_json::from_value(json!({ "_id": "m1", "type": "movie" })).unwrap();
        let mut session = ready(PlaybackSession::load(&movie, "m1", Some(2), PREFIX));

        assert_eq!(session.episode_index(), None);
        assert_eq!(session.handle(PlaybackEvent::Ended), None);
    }

    #[test]
    fn test_series_without_episode_hands_off() {
        let outcome = PlaybackSession::load(&series(3), "s1", None, PREFIX);
        assert_eq!(
            outcome,
            LoadOutcome::SeriesOverview {
                content_id: "s1".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_unresolved() {
        let outcome = PlaybackSession::load(&CatalogEntry::default(), "x", None, PREFIX);
        let session = ready(outcome);
        assert_eq!(session.state(), PlaybackState::Unresolved);
        assert_eq!(session.video_url(), None);

        let channel: CatalogEntry =
            serde_json::from_value(json!({ "_id": "c1", "type": "channel" })).unwrap();
        let session = ready(PlaybackSession::load(&channel, "c1", None, PREFIX));
        assert_eq!(session.state(), PlaybackState::Unresolved);
        assert_eq!(session.video_url(), None);
    }

    #[test]
    fn test_next_then_noop_at_end() {
        let mut session = ready(PlaybackSession::load(&series(3), "s1", Some(1), PREFIX));
        assert_eq!(session.video_url(), Some("/v/1.mp4"));

        assert_eq!(session.next(), Some(WatchTarget::episode("s1", 2)));
        assert_eq!(session.episode_index(), Some(2));
        assert_eq!(session.video_url(), Some("/v/2.mp4"));

        assert_eq!(session.next(), None);
        assert_eq!(session.episode_index(), Some(2));
    }

    #[test]
    fn test_previous_twice_then_noop() {
        let mut session = ready(PlaybackSession::load(&series(3), "s1", Some(2), PREFIX));

        assert_eq!(session.previous(), Some(WatchTarget::episode("s1", 1)));
        assert_eq!(session.previous(), Some(WatchTarget::episode("s1", 0)));
        assert_eq!(session.previous(), None);
        assert_eq!(session.episode_index(), Some(0));
    }

    #[test]
    fn test_ended_advances_once_per_signal() {
        let mut session = ready(PlaybackSession::load(&series(3), "s1", Some(0), PREFIX));

        assert_eq!(
            session.handle(PlaybackEvent::Ended),
            Some(WatchTarget::episode("s1", 1))
        );
        assert_eq!(session.episode_index(), Some(1));
    }

    #[test]
    fn test_no_auto_advance_on_final_episode() {
        let mut session = ready(PlaybackSession::load(&series(2), "s1", Some(1), PREFIX));
        assert_eq!(session.handle(PlaybackEvent::Ended), None);
        assert_eq!(session.state(), PlaybackState::EpisodeReady { index: 1 });
    }

    #[test]
    fn test_out_of_range_entry_index_is_not_revalidated() {
        let mut session = ready(PlaybackSession::load(&series(2), "s1", Some(5), PREFIX));

        assert_eq!(session.state(), PlaybackState::EpisodeReady { index: 5 });
        assert_eq!(session.video_url(), None);
        assert!(session.current_episode().is_none());
        assert_eq!(session.next(), None);

        // Stepping back only needs a non-zero index
        assert!(session.has_previous());
        assert_eq!(session.previous(), Some(WatchTarget::episode("s1", 4)));
        assert_eq!(session.state(), PlaybackState::EpisodeReady { index: 4 });
        assert_eq!(session.video_url(), None);
    }

    #[test]
    fn test_empty_episode_url_resolves_to_none() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "_id": "s1",
            "type": "series",
            "episodes": [{ "title": "Pilot", "videoUrl": "" }]
        }))
        .unwrap();
        let session = ready(PlaybackSession::load(&entry, "s1", Some(0), PREFIX));

        assert_eq!(session.video_url(), None);
        assert_eq!(session.current_episode().unwrap().title.as_deref(), Some("Pilot"));
    }

    #[test]
    fn test_targets_peek_without_moving() {
        let session = ready(PlaybackSession::load(&series(3), "s1", Some(1), PREFIX));
        assert_eq!(session.next_target(), Some(WatchTarget::episode("s1", 2)));
        assert_eq!(session.previous_target(), Some(WatchTarget::episode("s1", 0)));
        assert_eq!(session.episode_index(), Some(1));
    }

    #[test]
    fn test_event_deserialization() {
        let event: PlaybackEvent = serde_json::from_str("\"ended\"").unwrap();
        assert_eq!(event, PlaybackEvent::Ended);
    }
}
