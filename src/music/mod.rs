use crate::auth::Session;
use crate::error::Result;
use async_trait::async_trait;

mod spotify;
pub mod types;

pub use spotify::SpotifyClient;
pub use types::{
    CreatedPlaylist, RawTrack, RecommendationQuery, TopArtist, TopTrack, UserProfile,
};

/// Bearer-authenticated music-service REST API.
///
/// A 401 from any call comes back as `Error::Auth`; other non-2xx statuses as
/// `Error::Upstream`.
#[async_trait]
pub trait MusicService: Send + Sync {
    async fn profile(&self, session: &Session) -> Result<UserProfile>;
    async fn top_artists(&self, session: &Session, limit: u8) -> Result<Vec<TopArtist>>;
    async fn top_tracks(&self, session: &Session, limit: u8) -> Result<Vec<TopTrack>>;

    /// The closed set of genre strings the recommendations endpoint accepts.
    async fn genre_seeds(&self, session: &Session) -> Result<Vec<String>>;

    async fn recommendations(
        &self,
        session: &Session,
        query: &RecommendationQuery,
    ) -> Result<Vec<RawTrack>>;

    async fn create_playlist(
        &self,
        session: &Session,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist>;

    async fn add_tracks(&self, session: &Session, playlist_id: &str, uris: &[String])
        -> Result<()>;
}
