use crate::auth::Session;
use crate::error::Result;
use crate::model::UserTasteProfile;
use crate::music::{MusicService, TopArtist, TopTrack};

pub const TOP_ITEMS_LIMIT: u8 = 5;

/// Top artists and top tracks are independent lookups, so both are in flight at once.
pub async fn fetch_taste(music: &dyn MusicService, session: &Session) -> Result<UserTasteProfile> {
    let (artists, tracks) = tokio::try_join!(
        music.top_artists(session, TOP_ITEMS_LIMIT),
        music.top_tracks(session, TOP_ITEMS_LIMIT),
    )?;
    let profile = build_profile(artists, tracks);
    tracing::debug!(
        artists = profile.top_artist_ids.len(),
        tracks = profile.top_track_ids.len(),
        genres = profile.top_genres.len(),
        "taste profile fetched"
    );
    Ok(profile)
}

pub fn build_profile(artists: Vec<TopArtist>, tracks: Vec<TopTrack>) -> UserTasteProfile {
    let limit = TOP_ITEMS_LIMIT as usize;
    let mut profile = UserTasteProfile::default();

    for artist in artists.into_iter().take(limit) {
        for genre in artist.genres {
            if !profile.top_genres.contains(&genre) {
                profile.top_genres.push(genre);
            }
        }
        profile.top_artist_ids.push(artist.id);
        profile.top_artist_names.push(artist.name);
    }
    for track in tracks.into_iter().take(limit) {
        profile.top_track_ids.push(track.id);
        profile.top_track_names.push(track.name);
    }
    profile
}
