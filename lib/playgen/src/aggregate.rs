use shared::catalog::{PlaylistItem, TrackId};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::{error::Result, paging, CatalogGateway};

/// Deduplicated library: one representative item per track id.
///
/// When two items share a track id, the one whose `added_at` is strictly
/// earlier wins. A readable timestamp beats an unreadable one. Ties, and
/// items that are all unreadable, keep whichever item arrived first.
#[derive(Debug, Clone, Default)]
pub struct UniqueTracks {
    items: HashMap<TrackId, PlaylistItem>,
}

impl UniqueTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: PlaylistItem) {
        match self.items.get_mut(item.track_id()) {
            None => {
                self.items.insert(item.track_id().clone(), item);
            }
            Some(existing) => {
                let replace = match (existing.added_instant(), item.added_instant()) {
                    (Ok(old), Ok(new)) => new < old,
                    (Err(_), Ok(_)) => true,
                    (_, Err(_)) => false,
                };
                if replace {
                    *existing = item;
                }
            }
        }
    }

    pub fn get(&self, id: &TrackId) -> Option<&PlaylistItem> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &PlaylistItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<PlaylistItem> for UniqueTracks {
    fn from_iter<I: IntoIterator<Item = PlaylistItem>>(iter: I) -> Self {
        let mut unique = Self::new();
        for item in iter {
            unique.insert(item);
        }
        unique
    }
}

impl IntoIterator for UniqueTracks {
    type Item = PlaylistItem;
    type IntoIter = std::collections::hash_map::IntoValues<TrackId, PlaylistItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

/// Merges every playlist owned by the current user into one deduplicated set.
///
/// A playlist whose items cannot be fetched is logged and skipped; failing to
/// resolve the user or list the playlists fails the whole call.
pub async fn aggregate(gateway: &dyn CatalogGateway) -> Result<UniqueTracks> {
    let user = gateway.current_user().await?;
    let playlists = paging::owned_playlists(gateway, &user.id).await?;

    let mut unique = UniqueTracks::new();
    let mut seen = 0usize;
    for playlist in &playlists {
        match paging::playlist_items(gateway, &playlist.id).await {
            Ok(items) => {
                seen += items.len();
                for item in items {
                    unique.insert(item);
                }
            }
            Err(e) => {
                warn!("could not get tracks from playlist {}: {}", playlist.name, e);
            }
        }
    }

    info!(
        "aggregated {} unique tracks from {} items across {} playlists",
        unique.len(),
        seen,
        playlists.len()
    );
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mocks::{item, track, MockCatalog};

    #[test]
    fn earliest_added_item_wins() {
        let t = track("t1", &[("a1", "Artist")]);
        let unique: UniqueTracks = vec![
            item(&t, "2023-03-01T00:00:00Z", "p1"),
            item(&t, "2023-01-01T00:00:00Z", "p2"),
            item(&t, "2023-02-01T00:00:00Z", "p3"),
        ]
        .into_iter()
        .collect();

        assert_eq!(unique.len(), 1);
        let kept = unique.get(&"t1".into()).unwrap();
        assert_eq!(kept.playlist_id.as_str(), "p2");
    }

    #[test]
    fn offsets_are_compared_as_instants() {
        let t = track("t1", &[]);
        let unique: UniqueTracks = vec![
            item(&t, "2023-01-01T09:00:00Z", "p2"),
            item(&t, "2023-01-01T10:00:00+02:00", "p1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(unique.get(&"t1".into()).unwrap().playlist_id.as_str(), "p1");
    }

    #[test]
    fn readable_timestamps_win_and_ties_keep_the_first_item() {
        let t = track("t1", &[]);
        let unique: UniqueTracks = vec![
            item(&t, "2023-01-01T00:00:00Z", "first"),
            item(&t, "2023-01-01T00:00:00Z", "tie"),
            item(&t, "not a date", "garbage"),
        ]
        .into_iter()
        .collect();
        assert_eq!(unique.get(&"t1".into()).unwrap().playlist_id.as_str(), "first");

        let unique: UniqueTracks = vec![
            item(&t, "yesterday", "first"),
            item(&t, "2020-01-01T00:00:00Z", "parsable"),
            item(&t, "last week", "other"),
        ]
        .into_iter()
        .collect();
        assert_eq!(unique.get(&"t1".into()).unwrap().playlist_id.as_str(), "parsable");

        let unique: UniqueTracks = vec![
            item(&t, "yesterday", "first"),
            item(&t, "last week", "other"),
        ]
        .into_iter()
        .collect();
        assert_eq!(unique.get(&"t1".into()).unwrap().playlist_id.as_str(), "first");
    }

    #[tokio::test]
    async fn aggregates_only_owned_playlists() {
        let t1 = track("t1", &[]);
        let t2 = track("t2", &[]);
        let t3 = track("t3", &[]);
        let catalog = MockCatalog::new("me")
            .with_playlist("p1", "Mine", "me", &[(&t1, "2023-01-01T00:00:00Z")])
            .with_playlist(
                "p2",
                "Also mine",
                "me",
                &[(&t1, "2022-01-01T00:00:00Z"), (&t2, "2023-01-01T00:00:00Z")],
            )
            .with_playlist("p3", "Followed", "someone-else", &[(&t3, "2023-01-01T00:00:00Z")]);

        let unique = aggregate(&catalog).await.unwrap();

        assert_eq!(unique.len(), 2);
        assert!(unique.get(&"t3".into()).is_none());
        assert_eq!(unique.get(&"t1".into()).unwrap().playlist_id.as_str(), "p2");
    }

    #[tokio::test]
    async fn skips_playlists_whose_items_fail() {
        let t1 = track("t1", &[]);
        let t2 = track("t2", &[]);
        let catalog = MockCatalog::new("me")
            .with_playlist("p1", "Broken", "me", &[(&t1, "2023-01-01T00:00:00Z")])
            .with_playlist("p2", "Fine", "me", &[(&t2, "2023-01-01T00:00:00Z")])
            .failing_items("p1");

        let unique = aggregate(&catalog).await.unwrap();

        assert_eq!(unique.len(), 1);
        assert!(unique.get(&"t2".into()).is_some());
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let catalog = MockCatalog::new("me").failing_listing();
        let err = aggregate(&catalog).await.unwrap_err();
        assert!(err.is_catalog());
    }
}
