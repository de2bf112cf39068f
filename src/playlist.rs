use crate::auth::Session;
use crate::error::Result;
use crate::model::{Playlist, Track};
use crate::music::{CreatedPlaylist, MusicService, RawTrack};

pub const PLACEHOLDER_ALBUM_ART: &str = "https://placehold.co/60x60/000/FFF?text=NA";
pub const GENERIC_LABEL: &str = "AuraSync";

pub fn playlist_name(suggested: Option<&str>, scene_name: &str) -> String {
    if let Some(name) = suggested.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    let scene = scene_name.trim();
    let label = if scene.is_empty() { GENERIC_LABEL } else { scene };
    format!("{} Mix", label)
}

pub fn to_track(raw: RawTrack, user_top_track_ids: &[String]) -> Track {
    let is_new = !user_top_track_ids.contains(&raw.id);
    let artist = raw
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let album_art_url = raw
        .album
        .images
        .into_iter()
        .map(|i| i.url)
        .find(|u| !u.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_ALBUM_ART.to_string());
    Track {
        id: raw.id,
        title: raw.name,
        artist,
        album_art_url,
        playable_uri: raw.uri,
        is_new,
    }
}

pub fn assemble(
    raw_tracks: Vec<RawTrack>,
    user_top_track_ids: &[String],
    suggested_name: Option<&str>,
    scene_name: &str,
) -> Playlist {
    let tracks: Vec<Track> = raw_tracks
        .into_iter()
        .map(|t| to_track(t, user_top_track_ids))
        .collect();
    let name = playlist_name(suggested_name, scene_name);
    tracing::debug!(
        name = %name,
        tracks = tracks.len(),
        new = tracks.iter().filter(|t| t.is_new).count(),
        "playlist assembled"
    );
    Playlist { name, tracks }
}

pub fn description_for(scene_name: &str) -> String {
    let scene = scene_name.trim();
    let scene = if scene.is_empty() { "custom" } else { scene };
    format!("AuraSync playlist for your {} vibe.", scene)
}

/// Create a private playlist on the user's account and fill it with `playlist`'s tracks.
pub async fn save(
    music: &dyn MusicService,
    session: &Session,
    playlist: &Playlist,
    scene_name: &str,
) -> Result<CreatedPlaylist> {
    let profile = music.profile(session).await?;
    let created = music
        .create_playlist(
            session,
            &profile.id,
            &playlist.name,
            &description_for(scene_name),
            false,
        )
        .await?;
    let uris: Vec<String> = playlist
        .tracks
        .iter()
        .map(|t| t.playable_uri.clone())
        .collect();
    if !uris.is_empty() {
        music.add_tracks(session, &created.id, &uris).await?;
    }
    tracing::info!(playlist_id = %created.id, tracks = uris.len(), "playlist saved");
    Ok(created)
}
