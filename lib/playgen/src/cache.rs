//! Run-scoped lookup caches.
//!
//! Both caches fill on first access per key and are never invalidated. They
//! live as long as the [`Pipeline`](crate::Pipeline) that owns them, so
//! nothing leaks from one run into the next.

use itertools::Itertools;
use shared::catalog::{ArtistId, PlaylistId, Track, TrackId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{error::Result, paging, CatalogGateway};

/// Playlist id → ids of the tracks it contains.
#[derive(Debug, Default)]
pub struct MembershipCache {
    sets: HashMap<PlaylistId, HashSet<TrackId>>,
}

impl MembershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track ids of `playlist`, fetched from the catalog on the first call only.
    pub async fn track_ids(
        &mut self,
        gateway: &dyn CatalogGateway,
        playlist: &PlaylistId,
    ) -> Result<&HashSet<TrackId>> {
        if !self.sets.contains_key(playlist) {
            let items = paging::playlist_items(gateway, playlist).await?;
            let ids: HashSet<TrackId> = items.into_iter().map(|item| item.track.id).collect();
            debug!("cached {} track ids for playlist {}", ids.len(), playlist);
            self.sets.insert(playlist.clone(), ids);
        }
        Ok(&self.sets[playlist])
    }

    pub async fn contains(
        &mut self,
        gateway: &dyn CatalogGateway,
        playlist: &PlaylistId,
        track: &TrackId,
    ) -> Result<bool> {
        Ok(self.track_ids(gateway, playlist).await?.contains(track))
    }

    /// Marks a playlist known to be empty, e.g. one this run just created.
    pub fn seed_empty(&mut self, playlist: &PlaylistId) {
        self.sets.entry(playlist.clone()).or_default();
    }

    /// Records tracks this run added to `playlist`. Uncached playlists are left
    /// alone; their first fetch will include the additions anyway.
    pub fn record_added(&mut self, playlist: &PlaylistId, ids: &[TrackId]) {
        if let Some(set) = self.sets.get_mut(playlist) {
            set.extend(ids.iter().cloned());
        }
    }
}

/// Artist id → that artist's genre tags.
#[derive(Debug, Default)]
pub struct GenreCache {
    genres: HashMap<ArtistId, Vec<String>>,
}

impl GenreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn artist_genres(
        &mut self,
        gateway: &dyn CatalogGateway,
        artist: &ArtistId,
    ) -> Result<&[String]> {
        if !self.genres.contains_key(artist) {
            let fetched = gateway.fetch_artist(artist).await?;
            self.genres.insert(artist.clone(), fetched.genres);
        }
        Ok(&self.genres[artist])
    }

    /// Union of the genres of every artist on `track`, in first-seen order.
    pub async fn track_genres(
        &mut self,
        gateway: &dyn CatalogGateway,
        track: &Track,
    ) -> Result<Vec<String>> {
        let mut all = Vec::new();
        for artist in &track.artists {
            all.extend_from_slice(self.artist_genres(gateway, &artist.id).await?);
        }
        Ok(all.into_iter().unique().collect())
    }
}
