use async_trait::async_trait;
use shared::catalog::{
    Artist, ArtistId, NewPlaylist, Page, PlaylistId, PlaylistItem, PlaylistSummary, Track,
    TrackId, User, UserId,
};

use crate::error::Result;

/// Most tracks the catalog hydrates in one `fetch_tracks` call.
pub const MAX_TRACK_FETCH: usize = 50;

/// Most tracks the catalog accepts in one `add_tracks` call.
pub const MAX_TRACK_ADD: usize = 100;

/// Read/write access to a remote music catalog.
///
/// Listings are paginated: pass `None` for the first page and the returned
/// `next` cursor for the following ones until `next` is `None`.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn current_user(&self) -> Result<User>;

    /// Playlists visible to the current user, including ones they merely follow.
    async fn playlists_page(&self, cursor: Option<&str>) -> Result<Page<PlaylistSummary>>;

    async fn playlist_items_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
    ) -> Result<Page<PlaylistItem>>;

    /// `ids.len()` must not exceed [`MAX_TRACK_FETCH`].
    async fn fetch_tracks(&self, ids: &[TrackId]) -> Result<Vec<Track>>;

    async fn fetch_artist(&self, id: &ArtistId) -> Result<Artist>;

    async fn create_playlist(&self, owner: &UserId, playlist: &NewPlaylist)
        -> Result<PlaylistSummary>;

    /// `ids.len()` must not exceed [`MAX_TRACK_ADD`].
    async fn add_tracks(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()>;
}
