//! Playlist-generation orchestrator.
//!
//! Stages run strictly in order and the first failure ends the run. Only one run may
//! be in flight per pipeline; a second trigger gets `Error::Busy`.

use crate::auth::{CredentialBroker, Session};
use crate::error::{Error, Result};
use crate::model::{Playlist, SceneContext, SeedSet};
use crate::music::{CreatedPlaylist, MusicService};
use crate::playlist;
use crate::recommend::fetch_recommendations;
use crate::seeds::{resolve, Vocabulary};
use crate::suggest::{SuggestionRequest, SuggestionService};
use crate::taste::fetch_taste;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of one successful run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub playlist: Playlist,
    pub seeds: SeedSet,
}

pub struct Pipeline {
    music: Arc<dyn MusicService>,
    suggest: Arc<dyn SuggestionService>,
    running: AtomicBool,
}

// Clears the in-flight flag however the run ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Pipeline {
    pub fn new(music: Arc<dyn MusicService>, suggest: Arc<dyn SuggestionService>) -> Self {
        Self {
            music,
            suggest,
            running: AtomicBool::new(false),
        }
    }

    pub fn music(&self) -> &dyn MusicService {
        &*self.music
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> Result<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::Busy)?;
        Ok(RunGuard(&self.running))
    }

    pub async fn run(&self, scene: &SceneContext, session: &Session) -> Result<PipelineRun> {
        let _guard = self.acquire()?;
        tracing::info!(scene = %scene.scene_name, "generating playlist");

        let (taste, vocabulary) = tokio::try_join!(
            fetch_taste(&*self.music, session),
            self.music.genre_seeds(session),
        )?;
        let vocabulary = Vocabulary::new(vocabulary);

        let request = SuggestionRequest::new(scene, &taste);
        let suggestion = self.suggest.suggest(&request).await?;

        let seeds = resolve(
            &suggestion.seed_genres,
            &suggestion.seed_artists,
            &taste,
            &vocabulary,
        );

        let raw = fetch_recommendations(
            &*self.music,
            session,
            &seeds,
            scene.discovery_preference,
        )
        .await?;

        let playlist = playlist::assemble(
            raw,
            &taste.top_track_ids,
            Some(&suggestion.playlist_name_suggestion),
            &scene.scene_name,
        );
        Ok(PipelineRun { playlist, seeds })
    }

    /// Run against the broker's session; an auth failure tears the session down.
    pub async fn run_with(
        &self,
        broker: &mut CredentialBroker,
        scene: &SceneContext,
    ) -> Result<PipelineRun> {
        let session = broker.require_session()?.clone();
        let result = self.run(scene, &session).await;
        if let Err(e) = &result {
            broker.invalidate(e);
        }
        result
    }

    pub async fn save_with(
        &self,
        broker: &mut CredentialBroker,
        playlist: &Playlist,
        scene_name: &str,
    ) -> Result<CreatedPlaylist> {
        let session = broker.require_session()?.clone();
        let result = playlist::save(&*self.music, &session, playlist, scene_name).await;
        if let Err(e) = &result {
            broker.invalidate(e);
        }
        result
    }
}
