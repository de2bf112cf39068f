//! Domain types handed between pipeline stages.

/// What the front-end picked for one run. Not modified while the run is in flight.
#[derive(Debug, Clone, Default)]
pub struct SceneContext {
    pub scene_name: String,
    /// Selected genre labels in the order they were picked, without duplicates.
    pub selected_genres: Vec<String>,
    pub custom_mood: String,
    /// 0 means "only what I know", 100 means "all new".
    pub discovery_preference: u8,
}

impl SceneContext {
    pub fn new(scene_name: impl Into<String>) -> Self {
        Self {
            scene_name: scene_name.into(),
            discovery_preference: 50,
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        let genre = genre.into();
        if !self.selected_genres.iter().any(|g| g.eq_ignore_ascii_case(&genre)) {
            self.selected_genres.push(genre);
        }
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.custom_mood = mood.into();
        self
    }

    pub fn with_discovery(mut self, discovery: u8) -> Self {
        self.discovery_preference = discovery.min(100);
        self
    }
}

/// Listening-taste signals gathered fresh for each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTasteProfile {
    pub top_artist_ids: Vec<String>,
    pub top_artist_names: Vec<String>,
    pub top_track_ids: Vec<String>,
    pub top_track_names: Vec<String>,
    /// Genres of the top artists, first occurrence order, no duplicates.
    pub top_genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub tracks: Vec<String>,
    pub used_fallback: bool,
}

impl SeedSet {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.genres.is_empty() && self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artists.len() + self.genres.len() + self.tracks.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Artist display names joined with ", ".
    pub artist: String,
    pub album_art_url: String,
    pub playable_uri: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_context_dedups_genres_and_clamps_discovery() {
        let ctx = SceneContext::new("Focus")
            .with_genre("Ambient")
            .with_genre("ambient")
            .with_genre("Classical")
            .with_discovery(250);
        assert_eq!(ctx.selected_genres, vec!["Ambient", "Classical"]);
        assert_eq!(ctx.discovery_preference, 100);
    }
}
