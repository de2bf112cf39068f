// Wire schemas for the music-service endpoints we call. Anything that fails to
// deserialize into these is reported as a validation error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Spotify User")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TopArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TopTrack {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreSeeds {
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Album {
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Track record as the recommendations endpoint returns it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Album,
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recommendations {
    pub tracks: Vec<RawTrack>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedPlaylist {
    pub id: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Serialize)]
pub struct NewPlaylist<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Serialize)]
pub struct AddTracks<'a> {
    pub uris: &'a [String],
}

/// Parameters of one recommendations request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub seed_artists: Vec<String>,
    pub seed_genres: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub limit: u8,
    pub target_popularity: u8,
}

impl RecommendationQuery {
    /// Query pairs; empty seed categories are left out.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.seed_artists.is_empty() {
            params.push(("seed_artists", self.seed_artists.join(",")));
        }
        if !self.seed_genres.is_empty() {
            params.push(("seed_genres", self.seed_genres.join(",")));
        }
        if !self.seed_tracks.is_empty() {
            params.push(("seed_tracks", self.seed_tracks.join(",")));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("target_popularity", self.target_popularity.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_track_tolerates_missing_album() {
        let t: RawTrack = serde_json::from_str(
            r#"{"id":"t1","name":"Song","artists":[{"name":"A"},{"name":"B"}],"uri":"spotify:track:t1"}"#,
        )
        .expect("parse");
        assert!(t.album.images.is_empty());
        assert_eq!(t.artists.len(), 2);
    }

    #[test]
    fn query_skips_empty_categories() {
        let q = RecommendationQuery {
            seed_genres: vec!["ambient".into(), "pop".into()],
            limit: 20,
            target_popularity: 50,
            ..Default::default()
        };
        assert_eq!(
            q.to_params(),
            vec![
                ("seed_genres", "ambient,pop".to_string()),
                ("limit", "20".to_string()),
                ("target_popularity", "50".to_string()),
            ]
        );
    }
}
