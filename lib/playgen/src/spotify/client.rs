use super::models::{
    track_uri, AddTracksBody, ArtistObject, CreatePlaylistBody, PagingObject, PlaylistObject,
    PlaylistTrackObject, SeveralTracks, UserObject,
};
use crate::{
    config::{PlaygenConfig, DEFAULT_API_URL},
    error::{PlaygenError, Result},
    traits::{CatalogGateway, MAX_TRACK_ADD, MAX_TRACK_FETCH},
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::catalog::{
    Artist, ArtistId, NewPlaylist, Page, PlaylistId, PlaylistItem, PlaylistSummary, Track,
    TrackId, User, UserId,
};
use std::time::Duration;
use tracing::debug;
use url::Url;

const PLAYLIST_PAGE_LIMIT: u32 = 50;
const ITEM_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    base_url: Url,
    access_token: String,
    client: Client,
}

#[derive(Default)]
pub struct SpotifyClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

impl SpotifyClientBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_config(config: &PlaygenConfig) -> Self {
        Self::new()
            .base_url(&config.api_url)
            .access_token(&config.access_token)
            .timeout(config.http_timeout)
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<SpotifyClient> {
        let access_token = self.access_token.ok_or(PlaygenError::NotConfigured)?;
        let base = self.base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;

        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(SpotifyClient {
            base_url,
            access_token,
            client: client.build()?,
        })
    }
}

impl SpotifyClient {
    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// First page comes from `path`, later pages from the cursor (an absolute URL).
    fn page_url(&self, path: &str, cursor: Option<&str>) -> Result<Url> {
        match cursor {
            Some(next) => Ok(Url::parse(next)?),
            None => self.endpoint(path),
        }
    }

    async fn make_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T> {
        debug!("Request: {} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.access_token);
        if let Some(b) = body {
            request = request.json(b);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            let text = if text.trim().is_empty() { "null" } else { &text };
            serde_json::from_str(text).map_err(|e| PlaygenError::Api {
                status: status.as_u16(),
                message: format!("JSON parse error: {e}"),
            })
        } else {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            Err(PlaygenError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.make_request::<T, ()>(Method::GET, url, None).await
    }
}

#[async_trait]
impl CatalogGateway for SpotifyClient {
    fn name(&self) -> &'static str {
        "Spotify"
    }

    async fn current_user(&self) -> Result<User> {
        let user: UserObject = self.get(self.endpoint("me")?).await?;
        Ok(user.into())
    }

    async fn playlists_page(&self, cursor: Option<&str>) -> Result<Page<PlaylistSummary>> {
        let url = self.page_url(&format!("me/playlists?limit={PLAYLIST_PAGE_LIMIT}"), cursor)?;
        let page: PagingObject<PlaylistObject> = self.get(url).await?;
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            next: page.next,
        })
    }

    async fn playlist_items_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
    ) -> Result<Page<PlaylistItem>> {
        let url = self.page_url(
            &format!("playlists/{playlist}/tracks?limit={ITEM_PAGE_LIMIT}"),
            cursor,
        )?;
        let page: PagingObject<PlaylistTrackObject> = self.get(url).await?;
        Ok(Page {
            items: page
                .items
                .into_iter()
                .filter_map(|item| item.into_item(playlist))
                .collect(),
            next: page.next,
        })
    }

    async fn fetch_tracks(&self, ids: &[TrackId]) -> Result<Vec<Track>> {
        if ids.len() > MAX_TRACK_FETCH {
            return Err(PlaygenError::BatchTooLarge {
                limit: MAX_TRACK_FETCH,
                len: ids.len(),
            });
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = self.endpoint("tracks")?;
        let joined = ids.iter().map(TrackId::as_str).collect::<Vec<_>>().join(",");
        url.query_pairs_mut().append_pair("ids", &joined);

        let several: SeveralTracks = self.get(url).await?;
        Ok(several
            .tracks
            .into_iter()
            .flatten()
            .filter_map(|t| t.into_track())
            .collect())
    }

    async fn fetch_artist(&self, id: &ArtistId) -> Result<Artist> {
        let artist: ArtistObject = self.get(self.endpoint(&format!("artists/{id}"))?).await?;
        Ok(artist.into())
    }

    async fn create_playlist(
        &self,
        owner: &UserId,
        playlist: &NewPlaylist,
    ) -> Result<PlaylistSummary> {
        let body = CreatePlaylistBody {
            name: &playlist.name,
            description: &playlist.description,
            public: playlist.public,
            collaborative: playlist.collaborative,
        };
        let url = self.endpoint(&format!("users/{owner}/playlists"))?;
        let created: PlaylistObject = self.make_request(Method::POST, url, Some(&body)).await?;
        Ok(created.into())
    }

    async fn add_tracks(&self, playlist: &PlaylistId, ids: &[TrackId]) -> Result<()> {
        if ids.len() > MAX_TRACK_ADD {
            return Err(PlaygenError::BatchTooLarge {
                limit: MAX_TRACK_ADD,
                len: ids.len(),
            });
        }
        let body = AddTracksBody {
            uris: ids.iter().map(|id| track_uri(id.as_str())).collect(),
        };
        let url = self.endpoint(&format!("playlists/{playlist}/tracks"))?;
        // Response carries only a snapshot id
        let _: serde_json::Value = self.make_request(Method::POST, url, Some(&body)).await?;
        Ok(())
    }
}
