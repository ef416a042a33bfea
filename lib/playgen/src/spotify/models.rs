use serde::{Deserialize, Serialize};
use shared::catalog::{Artist, ArtistRef, PlaylistId, PlaylistItem, PlaylistSummary, Track, User};

// Internal structs for deserializing raw Web API responses
#[derive(Deserialize, Debug)]
pub(crate) struct PagingObject<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct UserObject {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct OwnerObject {
    pub id: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct PlaylistObject {
    pub id: String,
    pub name: String,
    pub owner: OwnerObject,
}

#[derive(Deserialize, Debug)]
pub(crate) struct PlaylistTrackObject {
    pub added_at: Option<String>,
    pub track: Option<TrackObject>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SimpleArtistObject {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct AlbumObject {
    pub name: String,
}

/// A track, or an episode when a playlist mixes in podcasts.
#[derive(Deserialize, Debug)]
pub(crate) struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimpleArtistObject>,
    pub album: Option<AlbumObject>,
    pub duration_ms: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ArtistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SeveralTracks {
    pub tracks: Vec<Option<TrackObject>>,
}

#[derive(Serialize, Debug)]
pub(crate) struct CreatePlaylistBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct AddTracksBody {
    pub uris: Vec<String>,
}

impl From<UserObject> for User {
    fn from(user: UserObject) -> Self {
        User {
            id: user.id.into(),
            display_name: user.display_name,
        }
    }
}

impl From<PlaylistObject> for PlaylistSummary {
    fn from(playlist: PlaylistObject) -> Self {
        PlaylistSummary {
            id: playlist.id.into(),
            name: playlist.name,
            owner_id: playlist.owner.id.into(),
        }
    }
}

impl From<ArtistObject> for Artist {
    fn from(artist: ArtistObject) -> Self {
        Artist {
            id: artist.id.into(),
            name: artist.name,
            genres: artist.genres,
        }
    }
}

impl TrackObject {
    /// `None` for episodes and local files, which have no catalog track id.
    pub fn into_track(self) -> Option<Track> {
        if self.kind.as_deref().is_some_and(|k| k != "track") {
            return None;
        }
        Some(Track {
            id: self.id?.into(),
            title: self.name,
            artists: self
                .artists
                .into_iter()
                .filter_map(|a| {
                    Some(ArtistRef {
                        id: a.id?.into(),
                        name: a.name,
                    })
                })
                .collect(),
            album: self.album.map(|a| a.name),
            duration_ms: self.duration_ms,
        })
    }
}

impl PlaylistTrackObject {
    pub fn into_item(self, playlist: &PlaylistId) -> Option<PlaylistItem> {
        Some(PlaylistItem {
            track: self.track?.into_track()?,
            added_at: self.added_at.unwrap_or_default(),
            playlist_id: playlist.clone(),
        })
    }
}

pub(crate) fn track_uri(id: &str) -> String {
    format!("spotify:track:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_playlist_items_page() {
        let json = r#"{
            "href": "https://api.spotify.com/v1/playlists/p1/tracks?offset=0&limit=100",
            "items": [
                {
                    "added_at": "2023-01-01T00:00:00Z",
                    "track": {
                        "id": "t1",
                        "name": "First",
                        "type": "track",
                        "duration_ms": 201000,
                        "album": { "name": "Debut" },
                        "artists": [
                            { "id": "a1", "name": "Band" },
                            { "id": null, "name": "Local Guest" }
                        ]
                    }
                },
                { "added_at": "2023-01-02T00:00:00Z", "track": null },
                {
                    "added_at": "2023-01-03T00:00:00Z",
                    "track": { "id": null, "name": "demo.mp3", "type": "track", "artists": [] }
                },
                {
                    "added_at": "2023-01-04T00:00:00Z",
                    "track": { "id": "e1", "name": "Episode", "type": "episode" }
                }
            ],
            "next": "https://api.spotify.com/v1/playlists/p1/tracks?offset=100&limit=100"
        }"#;

        let page: PagingObject<PlaylistTrackObject> = serde_json::from_str(json).unwrap();
        assert!(page.next.is_some());

        let playlist = PlaylistId::from("p1");
        let items: Vec<PlaylistItem> = page
            .items
            .into_iter()
            .filter_map(|i| i.into_item(&playlist))
            .collect();

        assert_eq!(items.len(), 1);
        let first = &items[0];
        assert_eq!(first.track.id.as_str(), "t1");
        assert_eq!(first.track.album.as_deref(), Some("Debut"));
        assert_eq!(first.track.artists.len(), 1);
        assert_eq!(first.added_at, "2023-01-01T00:00:00Z");
        assert_eq!(first.playlist_id, playlist);
    }

    #[test]
    fn decodes_playlists_and_artists() {
        let playlists: PagingObject<PlaylistObject> = serde_json::from_str(
            r#"{ "items": [ { "id": "p1", "name": "Mine", "owner": { "id": "me", "display_name": "Me" }, "public": true } ], "next": null }"#,
        )
        .unwrap();
        let summary: PlaylistSummary = playlists.items.into_iter().next().unwrap().into();
        assert_eq!(summary.owner_id.as_str(), "me");
        assert!(playlists.next.is_none());

        let artist: Artist = serde_json::from_str::<ArtistObject>(
            r#"{ "id": "a1", "name": "Band", "genres": ["indie", "shoegaze"], "popularity": 40 }"#,
        )
        .unwrap()
        .into();
        assert_eq!(artist.genres, vec!["indie", "shoegaze"]);
    }

    #[test]
    fn serializes_write_bodies() {
        let body = AddTracksBody {
            uris: vec![track_uri("t1")],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "uris": ["spotify:track:t1"] })
        );
    }
}
