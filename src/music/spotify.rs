use super::types::{
    AddTracks, CreatedPlaylist, GenreSeeds, NewPlaylist, Paging, RawTrack, Recommendations,
    RecommendationQuery, TopArtist, TopTrack, UserProfile,
};
use super::MusicService;
use crate::auth::Session;
use crate::error::{check_response, Error, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

const SERVICE: &str = "music service";

/// Playlist item additions are capped per request by the API.
const ADD_TRACKS_BATCH: usize = 100;

pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint URL with each segment percent-encoded, so ids cannot reshape the path.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid music API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("music API base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self
            .http
            .get(self.url(segments)?)
            .query(query)
            .bearer_auth(session.access_token())
            .send()
            .await
            .map_err(Error::transport(SERVICE))?;
        let resp = check_response(SERVICE, resp)
            .await
            .map_err(Error::unauthorized_to_auth)?;
        decode(segments, resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.url(segments)?)
            .bearer_auth(session.access_token())
            .json(body)
            .send()
            .await
            .map_err(Error::transport(SERVICE))?;
        let resp = check_response(SERVICE, resp)
            .await
            .map_err(Error::unauthorized_to_auth)?;
        decode(segments, resp).await
    }
}

async fn decode<T: DeserializeOwned>(segments: &[&str], resp: reqwest::Response) -> Result<T> {
    let text = resp.text().await.map_err(Error::transport(SERVICE))?;
    serde_json::from_str(&text).map_err(|e| {
        Error::validation(
            SERVICE,
            format!("unexpected {} payload: {}", segments.join("/"), e),
        )
    })
}

#[async_trait::async_trait]
impl MusicService for SpotifyClient {
    async fn profile(&self, session: &Session) -> Result<UserProfile> {
        self.get_json(session, &["me"], &[]).await
    }

    async fn top_artists(&self, session: &Session, limit: u8) -> Result<Vec<TopArtist>> {
        let page: Paging<TopArtist> = self
            .get_json(
                session,
                &["me", "top", "artists"],
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    async fn top_tracks(&self, session: &Session, limit: u8) -> Result<Vec<TopTrack>> {
        let page: Paging<TopTrack> = self
            .get_json(
                session,
                &["me", "top", "tracks"],
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    async fn genre_seeds(&self, session: &Session) -> Result<Vec<String>> {
        let seeds: GenreSeeds = self
            .get_json(session, &["recommendations", "available-genre-seeds"], &[])
            .await?;
        Ok(seeds.genres)
    }

    async fn recommendations(
        &self,
        session: &Session,
        query: &RecommendationQuery,
    ) -> Result<Vec<RawTrack>> {
        let recs: Recommendations = self
            .get_json(session, &["recommendations"], &query.to_params())
            .await?;
        Ok(recs.tracks)
    }

    async fn create_playlist(
        &self,
        session: &Session,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist> {
        let body = NewPlaylist {
            name,
            description,
            public,
        };
        self.post_json(session, &["users", user_id, "playlists"], &body)
            .await
    }

    async fn add_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<()> {
        let segments = ["playlists", playlist_id, "tracks"];
        for chunk in uris.chunks(ADD_TRACKS_BATCH) {
            let _: serde_json::Value = self
                .post_json(session, &segments, &AddTracks { uris: chunk })
                .await?;
        }
        Ok(())
    }
}
