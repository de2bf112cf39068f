//! Seed resolution: AI suggestions first, taste data as the safety net, a fixed
//! genre triad when both come up empty. No I/O.

use crate::model::{SeedSet, UserTasteProfile};
use std::collections::HashSet;

pub const MAX_GENRE_SEEDS: usize = 3;
pub const MAX_ARTIST_SEEDS: usize = 2;
pub const MAX_TRACK_SEEDS: usize = 5;
pub const FALLBACK_GENRES: [&str; 3] = ["pop", "dance", "electronic"];

/// Lower-cased genre vocabulary for case-insensitive membership checks.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary(HashSet<String>);

impl Vocabulary {
    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            genres
                .into_iter()
                .map(|g| g.as_ref().trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect(),
        )
    }

    /// The vocabulary form of `genre`, if it is a member.
    pub fn normalize(&self, genre: &str) -> Option<String> {
        let key = genre.trim().to_lowercase();
        self.0.contains(&key).then_some(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An artist/track seed must be a bare id token: it is joined with commas into a query.
fn is_id_token(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

fn push_unique(out: &mut Vec<String>, item: String, cap: usize) {
    if out.len() < cap && !out.contains(&item) {
        out.push(item);
    }
}

pub fn resolve(
    ai_genres: &[String],
    ai_artists: &[String],
    taste: &UserTasteProfile,
    vocabulary: &Vocabulary,
) -> SeedSet {
    let mut seeds = SeedSet::default();

    for g in ai_genres.iter().chain(&taste.top_genres) {
        if let Some(g) = vocabulary.normalize(g) {
            push_unique(&mut seeds.genres, g, MAX_GENRE_SEEDS);
        }
    }

    for id in ai_artists.iter().chain(&taste.top_artist_ids) {
        let id = id.trim();
        if is_id_token(id) {
            push_unique(&mut seeds.artists, id.to_string(), MAX_ARTIST_SEEDS);
        }
    }

    for id in &taste.top_track_ids {
        let id = id.trim();
        if is_id_token(id) {
            push_unique(&mut seeds.tracks, id.to_string(), MAX_TRACK_SEEDS);
        }
    }

    if seeds.is_empty() {
        tracing::warn!("no usable seeds from suggestion or taste data; using fallback genres");
        seeds.genres = FALLBACK_GENRES.iter().map(|g| g.to_string()).collect();
        seeds.used_fallback = true;
    }

    tracing::debug!(
        genres = ?seeds.genres,
        artists = seeds.artists.len(),
        tracks = seeds.tracks.len(),
        fallback = seeds.used_fallback,
        "seeds resolved"
    );
    seeds
}
