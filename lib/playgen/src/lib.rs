pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod grouping;
pub mod handoff;
pub mod paging;
pub mod pipeline;
pub mod ranker;
pub mod reconcile;
pub mod spotify;
pub mod traits;

pub use aggregate::{aggregate, UniqueTracks};
pub use config::PlaygenConfig;
pub use error::{PlaygenError, Result};
pub use grouping::GroupedTracks;
pub use pipeline::{generate, GenerationRequest, Pipeline, Strategy};
pub use ranker::{QueueEmpty, Ranker};
pub use traits::CatalogGateway;
