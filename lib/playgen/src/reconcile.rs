use shared::catalog::{NewPlaylist, PlaylistSummary, Track, TrackId, UserId};
use std::collections::HashSet;
use tracing::info;

use crate::{
    cache::MembershipCache,
    error::{PlaygenError, Result},
    paging,
    traits::MAX_TRACK_ADD,
    CatalogGateway,
};

/// Finds `owner`'s playlist called `name`, creating it when there is none.
pub async fn resolve_or_create(
    gateway: &dyn CatalogGateway,
    membership: &mut MembershipCache,
    owner: &UserId,
    name: &str,
) -> Result<PlaylistSummary> {
    match paging::find_owned_by_name(gateway, owner, name).await {
        Ok(playlist) => Ok(playlist),
        Err(PlaygenError::NotFound(_)) => {
            let created = gateway
                .create_playlist(owner, &NewPlaylist::generated(name))
                .await?;
            info!("created playlist {} ({})", created.name, created.id);
            membership.seed_empty(&created.id);
            Ok(created)
        }
        Err(e) => Err(e),
    }
}

/// Adds the tracks of `desired` that `target` doesn't have yet.
///
/// Nothing is written when every track is already present. Additions go out
/// in batches of [`MAX_TRACK_ADD`]; the first failing batch aborts the rest.
/// Returns how many tracks were added.
pub async fn reconcile(
    gateway: &dyn CatalogGateway,
    membership: &mut MembershipCache,
    target: &PlaylistSummary,
    desired: &[Track],
) -> Result<usize> {
    let mut queued: HashSet<&TrackId> = HashSet::new();
    let mut missing: Vec<TrackId> = Vec::new();
    for track in desired {
        if queued.contains(&track.id) {
            continue;
        }
        if !membership.contains(gateway, &target.id, &track.id).await? {
            queued.insert(&track.id);
            missing.push(track.id.clone());
        }
    }

    info!(
        "out of {} tracks, {} will be added to playlist {}",
        desired.len(),
        missing.len(),
        target.name
    );
    if missing.is_empty() {
        return Ok(0);
    }

    for batch in missing.chunks(MAX_TRACK_ADD) {
        gateway.add_tracks(&target.id, batch).await?;
        membership.record_added(&target.id, batch);
    }
    Ok(missing.len())
}
