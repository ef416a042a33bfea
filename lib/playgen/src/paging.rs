//! Draining helpers for the gateway's paginated listings.

use shared::catalog::{PlaylistId, PlaylistItem, PlaylistSummary, UserId};
use tracing::debug;

use crate::{
    error::{PlaygenError, Result},
    CatalogGateway,
};

/// All playlists whose owner is `owner`, following pagination to the end.
pub async fn owned_playlists(
    gateway: &dyn CatalogGateway,
    owner: &UserId,
) -> Result<Vec<PlaylistSummary>> {
    let mut playlists = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = gateway.playlists_page(cursor.as_deref()).await?;
        playlists.extend(page.items.into_iter().filter(|p| &p.owner_id == owner));
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    debug!("{} playlists owned by {}", playlists.len(), owner);
    Ok(playlists)
}

/// Every item of one playlist, following pagination to the end.
pub async fn playlist_items(
    gateway: &dyn CatalogGateway,
    playlist: &PlaylistId,
) -> Result<Vec<PlaylistItem>> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = gateway
            .playlist_items_page(playlist, cursor.as_deref())
            .await?;
        items.extend(page.items);
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(items)
}

/// Exact-name lookup in an already fetched listing.
pub fn find_by_name<'a>(
    playlists: &'a [PlaylistSummary],
    name: &str,
) -> Result<&'a PlaylistSummary> {
    playlists
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PlaygenError::NotFound(name.to_string()))
}

/// Exact-name lookup among `owner`'s playlists.
pub async fn find_owned_by_name(
    gateway: &dyn CatalogGateway,
    owner: &UserId,
    name: &str,
) -> Result<PlaylistSummary> {
    let playlists = owned_playlists(gateway, owner).await?;
    find_by_name(&playlists, name).cloned()
}
