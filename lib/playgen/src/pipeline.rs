use chrono_tz::Tz;
use shared::{
    catalog::{Track, UserId},
    library::{GroupReport, RunReport},
};
use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};
use tracing::info;

use crate::{
    aggregate::aggregate,
    cache::{GenreCache, MembershipCache},
    error::{PlaygenError, Result},
    grouping::{self, GroupedTracks},
    paging, reconcile, CatalogGateway,
};

/// Reference zone for weekday grouping unless configured otherwise.
pub const DEFAULT_WEEKDAY_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// How the library is split into generated playlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Monthly,
    Weekday,
    Genre,
    Artist,
    Combine,
}

impl FromStr for Strategy {
    type Err = PlaygenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Strategy::Monthly),
            "weekday" | "daily" | "day" => Ok(Strategy::Weekday),
            "genre" => Ok(Strategy::Genre),
            "artist" => Ok(Strategy::Artist),
            "combine" => Ok(Strategy::Combine),
            other => Err(PlaygenError::Config(format!("unknown strategy {other:?}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Monthly => "monthly",
            Strategy::Weekday => "weekday",
            Strategy::Genre => "genre",
            Strategy::Artist => "artist",
            Strategy::Combine => "combine",
        })
    }
}

/// Strategy parameters. Each strategy reads only the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// K for the genre and artist strategies
    pub num_playlists: usize,
    pub banned_genres: HashSet<String>,
    pub input_playlists: Vec<String>,
    pub output_playlist: String,
}

/// One generate-and-reconcile execution against an authenticated catalog.
///
/// Owns the membership and genre caches, so they live exactly as long as the
/// run. Create a new pipeline for every run.
pub struct Pipeline {
    gateway: Arc<dyn CatalogGateway>,
    membership: MembershipCache,
    genres: GenreCache,
    user: Option<UserId>,
    weekday_zone: Tz,
}

impl Pipeline {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self {
            gateway,
            membership: MembershipCache::new(),
            genres: GenreCache::new(),
            user: None,
            weekday_zone: DEFAULT_WEEKDAY_ZONE,
        }
    }

    pub fn with_weekday_zone(mut self, zone: Tz) -> Self {
        self.weekday_zone = zone;
        self
    }

    async fn user_id(&mut self) -> Result<UserId> {
        if let Some(id) = &self.user {
            return Ok(id.clone());
        }
        let user = self.gateway.current_user().await?;
        info!(
            "logged in to {} as {}",
            self.gateway.name(),
            user.display_name.as_deref().unwrap_or(user.id.as_str())
        );
        self.user = Some(user.id.clone());
        Ok(user.id)
    }

    pub async fn generate(
        &mut self,
        strategy: Strategy,
        request: &GenerationRequest,
    ) -> Result<GroupedTracks> {
        info!("generating playlists with the {} strategy", strategy);
        let gateway = self.gateway.clone();
        let gateway = gateway.as_ref();
        match strategy {
            Strategy::Monthly => grouping::by_month(&aggregate(gateway).await?),
            Strategy::Weekday => {
                grouping::by_weekday(&aggregate(gateway).await?, self.weekday_zone)
            }
            Strategy::Genre => {
                let tracks = aggregate(gateway).await?;
                grouping::by_genre(gateway, &mut self.genres, &tracks, request.num_playlists).await
            }
            Strategy::Artist => {
                let tracks = aggregate(gateway).await?;
                grouping::by_artist(
                    gateway,
                    &mut self.genres,
                    &tracks,
                    request.num_playlists,
                    &request.banned_genres,
                )
                .await
            }
            Strategy::Combine => {
                if request.output_playlist.trim().is_empty() {
                    return Err(PlaygenError::Config(
                        "combine needs an output playlist name".to_string(),
                    ));
                }
                let owner = self.user_id().await?;
                let owned = paging::owned_playlists(gateway, &owner).await?;
                grouping::combine_into_one(
                    gateway,
                    &mut self.membership,
                    &owned,
                    &request.input_playlists,
                    &request.output_playlist,
                )
                .await
            }
        }
    }

    /// Brings the playlist called `name` up to date with `desired`, creating it
    /// if needed. Returns the number of tracks added.
    pub async fn reconcile(&mut self, name: &str, desired: &[Track]) -> Result<usize> {
        let owner = self.user_id().await?;
        let gateway = self.gateway.clone();
        let gateway = gateway.as_ref();
        let target =
            reconcile::resolve_or_create(gateway, &mut self.membership, &owner, name).await?;
        reconcile::reconcile(gateway, &mut self.membership, &target, desired).await
    }

    /// Generates the groups and reconciles each one. With `dry_run` set nothing
    /// is written and each group only reports its size.
    pub async fn run(
        &mut self,
        strategy: Strategy,
        request: &GenerationRequest,
        dry_run: bool,
    ) -> Result<RunReport> {
        let groups = self.generate(strategy, request).await?;
        let mut report = RunReport {
            dry_run,
            groups: Vec::with_capacity(groups.len()),
        };
        for (playlist, tracks) in groups {
            let added = if dry_run {
                info!("dry run: playlist {} has {} tracks", playlist, tracks.len());
                0
            } else {
                self.reconcile(&playlist, &tracks).await?
            };
            report.groups.push(GroupReport {
                playlist,
                track_count: tracks.len(),
                added,
            });
        }
        Ok(report)
    }
}

/// Runs one strategy against an already authenticated catalog client.
pub async fn generate(
    gateway: Arc<dyn CatalogGateway>,
    strategy: Strategy,
    request: &GenerationRequest,
) -> Result<GroupedTracks> {
    Pipeline::new(gateway).generate(strategy, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mocks::{track, MockCatalog};

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [
            Strategy::Monthly,
            Strategy::Weekday,
            Strategy::Genre,
            Strategy::Artist,
            Strategy::Combine,
        ] {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!(" Daily ".parse::<Strategy>().unwrap(), Strategy::Weekday);
        assert!(matches!(
            "shuffle".parse::<Strategy>(),
            Err(PlaygenError::Config(_))
        ));
    }

    #[tokio::test]
    async fn dry_run_reports_counts_without_writing() {
        let t1 = track("t1", &[]);
        let t2 = track("t2", &[]);
        let catalog = Arc::new(MockCatalog::new("me").with_playlist(
            "p1",
            "Library",
            "me",
            &[(&t1, "2023-01-05T00:00:00Z"), (&t2, "2023-03-05T00:00:00Z")],
        ));

        let mut pipeline = Pipeline::new(catalog.clone());
        let report = pipeline
            .run(Strategy::Monthly, &GenerationRequest::default(), true)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.total_added(), 0);
        assert!(catalog.add_calls().await.is_empty());
        assert_eq!(catalog.playlist_names().await, vec!["Library"]);
    }

    #[tokio::test]
    async fn combine_requires_output_name() {
        let catalog = Arc::new(MockCatalog::new("me"));
        let err = generate(catalog, Strategy::Combine, &GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PlaygenError::Config(_)));
    }

    #[tokio::test]
    async fn combine_run_creates_output_and_is_idempotent() {
        let t1 = track("t1", &[]);
        let t2 = track("t2", &[]);
        let catalog = Arc::new(MockCatalog::new("me").with_playlist(
            "pa",
            "A",
            "me",
            &[(&t1, "2023-01-01T00:00:00Z"), (&t2, "2023-01-01T00:00:00Z")],
        ));
        let request = GenerationRequest {
            input_playlists: vec!["A".to_string(), "B".to_string()],
            output_playlist: "Mix".to_string(),
            ..Default::default()
        };

        let mut pipeline = Pipeline::new(catalog.clone());
        let first = pipeline.run(Strategy::Combine, &request, false).await.unwrap();
        assert_eq!(first.total_added(), 2);

        let second = pipeline.run(Strategy::Combine, &request, false).await.unwrap();
        assert_eq!(second.total_added(), 0);
        assert_eq!(second.groups[0].track_count, 2);

        assert_eq!(catalog.add_calls().await.len(), 1);
        assert_eq!(catalog.playlist_names().await, vec!["A", "Mix"]);
    }

    #[tokio::test]
    async fn genre_lookups_are_cached_across_strategies() {
        let t1 = track("t1", &[("a1", "Solo")]);
        let t2 = track("t2", &[("a1", "Solo")]);
        let catalog = Arc::new(
            MockCatalog::new("me")
                .with_artist("a1", "Solo", &["ambient"])
                .with_playlist(
                    "p1",
                    "Library",
                    "me",
                    &[(&t1, "2023-01-01T00:00:00Z"), (&t2, "2023-01-02T00:00:00Z")],
                ),
        );
        let request = GenerationRequest {
            num_playlists: 3,
            ..Default::default()
        };

        let mut pipeline = Pipeline::new(catalog.clone());
        let genres = pipeline.generate(Strategy::Genre, &request).await.unwrap();
        let artists = pipeline.generate(Strategy::Artist, &request).await.unwrap();

        assert_eq!(genres.get("ambient").unwrap().len(), 2);
        assert_eq!(artists.get("Solo").unwrap().len(), 2);
        assert_eq!(catalog.artist_fetches().await, 1);
    }
}
