use crate::auth::Session;
use crate::error::Result;
use crate::model::SeedSet;
use crate::music::{MusicService, RawTrack, RecommendationQuery};

pub const RECOMMENDATION_LIMIT: u8 = 20;

/// The recommendations endpoint accepts at most this many seeds across all categories.
pub const MAX_TOTAL_SEEDS: usize = 5;

/// Higher discovery means less mainstream catalog.
pub fn target_popularity(discovery_preference: u8) -> u8 {
    100 - discovery_preference.min(100)
}

/// Build the request, trimming to the combined seed cap: genres kept first, then
/// artists, then tracks.
pub fn build_query(seeds: &SeedSet, discovery_preference: u8) -> RecommendationQuery {
    let mut remaining = MAX_TOTAL_SEEDS;
    let mut take = |items: &[String]| -> Vec<String> {
        let n = items.len().min(remaining);
        remaining -= n;
        items[..n].to_vec()
    };
    let seed_genres = take(&seeds.genres);
    let seed_artists = take(&seeds.artists);
    let seed_tracks = take(&seeds.tracks);

    if seeds.len() > MAX_TOTAL_SEEDS {
        tracing::debug!(
            resolved = seeds.len(),
            sent = MAX_TOTAL_SEEDS,
            "trimmed seeds to the combined cap"
        );
    }

    RecommendationQuery {
        seed_artists,
        seed_genres,
        seed_tracks,
        limit: RECOMMENDATION_LIMIT,
        target_popularity: target_popularity(discovery_preference),
    }
}

pub async fn fetch_recommendations(
    music: &dyn MusicService,
    session: &Session,
    seeds: &SeedSet,
    discovery_preference: u8,
) -> Result<Vec<RawTrack>> {
    let query = build_query(seeds, discovery_preference);
    tracing::info!(
        genres = ?query.seed_genres,
        artists = query.seed_artists.len(),
        tracks = query.seed_tracks.len(),
        target_popularity = query.target_popularity,
        "requesting recommendations"
    );
    let tracks = music.recommendations(session, &query).await?;
    tracing::debug!(count = tracks.len(), "recommendations received");
    Ok(tracks)
}
