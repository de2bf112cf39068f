//! Generative-AI suggestion step: a playlist name plus seed genres and seed artists.

use crate::error::{Error, Result};
use crate::model::{SceneContext, UserTasteProfile};
use async_trait::async_trait;
use serde::Deserialize;

mod gemini;

pub use gemini::GeminiClient;

pub(crate) const SERVICE: &str = "suggestion service";

/// Genres handed to the model as a hint are capped at this many.
pub const HINT_GENRE_LIMIT: usize = 5;

/// Everything the model is told about the user for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub scene_name: String,
    pub genres: Vec<String>,
    pub custom_mood: String,
    pub top_artists: Vec<String>,
    pub top_tracks: Vec<String>,
}

impl SuggestionRequest {
    pub fn new(scene: &SceneContext, taste: &UserTasteProfile) -> Self {
        Self {
            scene_name: scene.scene_name.clone(),
            genres: hint_genres(&scene.selected_genres, &taste.top_genres),
            custom_mood: scene.custom_mood.clone(),
            top_artists: taste.top_artist_names.clone(),
            top_tracks: taste.top_track_names.clone(),
        }
    }
}

/// Reply contract. Exactly these three fields; anything else is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreativeSuggestion {
    #[serde(rename = "playlistNameSuggestion")]
    pub playlist_name_suggestion: String,
    #[serde(rename = "seedGenres", alias = "spotifySeedGenres")]
    pub seed_genres: Vec<String>,
    #[serde(rename = "seedArtists", alias = "spotifySeedArtists")]
    pub seed_artists: Vec<String>,
}

#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<CreativeSuggestion>;
}

/// Selected genres first, then the user's top genres; case-insensitive dedup.
pub fn hint_genres(selected: &[String], top_genres: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for g in selected.iter().chain(top_genres) {
        if out.len() == HINT_GENRE_LIMIT {
            break;
        }
        if !out.iter().any(|o| o.eq_ignore_ascii_case(g)) {
            out.push(g.clone());
        }
    }
    out
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

pub fn build_prompt(req: &SuggestionRequest) -> String {
    let scene = if req.scene_name.trim().is_empty() {
        "N/A"
    } else {
        req.scene_name.as_str()
    };
    let mood = if req.custom_mood.trim().is_empty() {
        "None"
    } else {
        req.custom_mood.as_str()
    };
    format!(
        "You are an AI music curator. Based on the user's input, suggest a creative playlist name. \
Also suggest relevant seed genres (up to 3) and seed artist IDs (up to 2) for a music recommendation engine.\n\
The user describes their mood and the situation; interpret this holistically.\n\n\
User's selected scene: {scene}\n\
User's selected genres: {genres}\n\
User's detailed situation/mood description: \"{mood}\"\n\
User's top artists (for taste reference): {artists}\n\
User's top tracks (for taste reference): {tracks}\n\n\
Respond with a JSON object of the form \
{{\"playlistNameSuggestion\": \"...\", \"seedGenres\": [\"...\"], \"seedArtists\": [\"...\"]}}.",
        scene = scene,
        genres = list_or_none(&req.genres),
        mood = mood,
        artists = list_or_none(&req.top_artists),
        tracks = list_or_none(&req.top_tracks),
    )
}

/// Second parse pass: the model's text must itself be the reply contract.
pub fn parse_suggestion(text: &str) -> Result<CreativeSuggestion> {
    serde_json::from_str(text.trim()).map_err(|e| {
        Error::validation(
            SERVICE,
            format!("reply does not match the suggestion shape: {}", e),
        )
    })
}
