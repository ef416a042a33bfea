//! Grouping strategies over the deduplicated library.
//!
//! Month and weekday grouping are pure. Genre and artist grouping resolve
//! genres through the [`GenreCache`], and any lookup failure fails the whole
//! call rather than dropping the track. Combine-into-one reads memberships
//! through the [`MembershipCache`].

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use shared::catalog::{PlaylistItem, PlaylistSummary, Track, TrackId};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

use crate::{
    aggregate::UniqueTracks,
    cache::{GenreCache, MembershipCache},
    error::{PlaygenError, Result},
    paging,
    ranker::Ranker,
    traits::MAX_TRACK_FETCH,
    CatalogGateway,
};

/// Group label → tracks, in contribution order within each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedTracks {
    groups: BTreeMap<String, Vec<Track>>,
}

impl GroupedTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, track: Track) {
        self.groups.entry(label.into()).or_default().push(track);
    }

    pub fn insert(&mut self, label: impl Into<String>, tracks: Vec<Track>) {
        self.groups.insert(label.into(), tracks);
    }

    pub fn get(&self, label: &str) -> Option<&[Track]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for GroupedTracks {
    type Item = (String, Vec<Track>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<Track>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Items sorted by track id so group contents come out the same on every run.
fn ordered(tracks: &UniqueTracks) -> Vec<&PlaylistItem> {
    let mut items: Vec<&PlaylistItem> = tracks.items().collect();
    items.sort_by(|a, b| a.track.id.cmp(&b.track.id));
    items
}

fn parse_added(item: &PlaylistItem) -> Result<DateTime<FixedOffset>> {
    item.added_instant()
        .map_err(|source| PlaygenError::Timestamp {
            value: item.added_at.clone(),
            source,
        })
}

/// One group per calendar month, read in the offset the timestamp was written in.
pub fn by_month(tracks: &UniqueTracks) -> Result<GroupedTracks> {
    let mut grouped = GroupedTracks::new();
    for item in ordered(tracks) {
        let added = parse_added(item)?;
        grouped.push(added.format("%B").to_string(), item.track.clone());
    }
    Ok(grouped)
}

/// One group per weekday, after converting the timestamp into `zone`.
pub fn by_weekday(tracks: &UniqueTracks, zone: Tz) -> Result<GroupedTracks> {
    let mut grouped = GroupedTracks::new();
    for item in ordered(tracks) {
        let added = parse_added(item)?.with_timezone(&zone);
        grouped.push(added.format("%A").to_string(), item.track.clone());
    }
    Ok(grouped)
}

/// Keeps the `k` largest groups, ranked by track count.
fn select_top(mut groups: BTreeMap<String, Vec<Track>>, k: usize, kind: &str) -> GroupedTracks {
    let mut ranker = Ranker::new();
    for (label, tracks) in &groups {
        ranker.push(label.clone(), tracks.len());
    }
    for entry in ranker.entries() {
        debug!("{} {:?} has {} tracks", kind, entry.label, entry.priority);
    }

    let mut selected = GroupedTracks::new();
    for label in ranker.top_k(k) {
        if let Some(tracks) = groups.remove(&label) {
            selected.insert(label, tracks);
        }
    }
    info!(
        "selected {} of {} {} groups",
        selected.len(),
        selected.len() + groups.len(),
        kind
    );
    selected
}

/// The `k` genres with the most tracks. A track counts towards every genre of
/// every one of its artists.
pub async fn by_genre(
    gateway: &dyn CatalogGateway,
    genres: &mut GenreCache,
    tracks: &UniqueTracks,
    k: usize,
) -> Result<GroupedTracks> {
    let mut by_label: BTreeMap<String, Vec<Track>> = BTreeMap::new();
    for item in ordered(tracks) {
        for genre in genres.track_genres(gateway, &item.track).await? {
            by_label.entry(genre).or_default().push(item.track.clone());
        }
    }
    Ok(select_top(by_label, k, "genre"))
}

/// The `k` artists with the most tracks, keyed by display name. A track is
/// not counted for an artist tagged with any of `banned_genres`.
pub async fn by_artist(
    gateway: &dyn CatalogGateway,
    genres: &mut GenreCache,
    tracks: &UniqueTracks,
    k: usize,
    banned_genres: &HashSet<String>,
) -> Result<GroupedTracks> {
    let mut by_label: BTreeMap<String, Vec<Track>> = BTreeMap::new();
    for item in ordered(tracks) {
        for artist in &item.track.artists {
            let artist_genres = genres.artist_genres(gateway, &artist.id).await?;
            if artist_genres.iter().any(|g| banned_genres.contains(g)) {
                continue;
            }
            by_label
                .entry(artist.name.clone())
                .or_default()
                .push(item.track.clone());
        }
    }
    Ok(select_top(by_label, k, "artist"))
}

/// Union of `output`'s current tracks and the tracks of every input playlist,
/// as a single group named `output`.
///
/// Inputs that don't exist are skipped. A missing output simply contributes
/// nothing; the reconciler creates it later.
pub async fn combine_into_one(
    gateway: &dyn CatalogGateway,
    membership: &mut MembershipCache,
    owned: &[PlaylistSummary],
    inputs: &[String],
    output: &str,
) -> Result<GroupedTracks> {
    let mut sources = Vec::new();
    match paging::find_by_name(owned, output) {
        Ok(playlist) => sources.push(playlist.id.clone()),
        Err(PlaygenError::NotFound(_)) => {
            info!("output playlist {} does not exist yet", output)
        }
        Err(e) => return Err(e),
    }
    for name in inputs {
        match paging::find_by_name(owned, name) {
            Ok(playlist) => sources.push(playlist.id.clone()),
            Err(PlaygenError::NotFound(_)) => {
                warn!("input playlist {} not found, skipping", name)
            }
            Err(e) => return Err(e),
        }
    }

    let mut seen: HashSet<TrackId> = HashSet::new();
    let mut union: Vec<TrackId> = Vec::new();
    for playlist in &sources {
        let mut members: Vec<TrackId> = membership
            .track_ids(gateway, playlist)
            .await?
            .iter()
            .cloned()
            .collect();
        members.sort();
        for id in members {
            if seen.insert(id.clone()) {
                union.push(id);
            }
        }
    }

    let mut hydrated = Vec::with_capacity(union.len());
    for batch in union.chunks(MAX_TRACK_FETCH) {
        hydrated.extend(gateway.fetch_tracks(batch).await?);
    }
    info!(
        "combined {} playlists into {} tracks for {}",
        sources.len(),
        hydrated.len(),
        output
    );

    let mut grouped = GroupedTracks::new();
    grouped.insert(output, hydrated);
    Ok(grouped)
}
