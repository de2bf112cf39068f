use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::auth::CredentialBroker;
use crate::config::load_config;
use crate::model::SceneContext;
use crate::music::SpotifyClient;
use crate::pipeline::Pipeline;
use crate::scenes::{self, SCENES};
use crate::suggest::GeminiClient;

#[derive(Parser)]
#[command(name = "aurasync")]
#[command(
    about = "Turn a scene and a mood into a playlist from your own listening taste",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in scenes and their genre palettes
    Scenes,
    /// Connect to the music service, generate a playlist and print it
    Generate {
        #[arg(long)]
        scene: String,
        /// Genre picked for this scene (repeatable)
        #[arg(long = "genre")]
        genres: Vec<String>,
        /// Free-text description of the situation and mood
        #[arg(long, default_value = "")]
        mood: String,
        /// 0 = familiar, 100 = all new
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        discovery: u8,
        /// Save the result as a private playlist on the account
        #[arg(long)]
        save: bool,
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scenes => {
            for s in SCENES {
                println!("{:<8} {}", s.name, s.default_genres.join(", "));
            }
        }
        Commands::Generate {
            scene,
            genres,
            mood,
            discovery,
            save,
            no_browser,
        } => {
            let ctx = scene_context(&scene, genres, mood, discovery)?;
            generate(ctx, save, no_browser).await?;
        }
    }

    Ok(())
}

/// Built-in scenes fall back to their default palette when no `--genre` is given.
/// A run needs at least one genre or a mood.
fn scene_context(
    scene: &str,
    genres: Vec<String>,
    mood: String,
    discovery: u8,
) -> anyhow::Result<SceneContext> {
    let known = scenes::find(scene);
    let scene_name = known
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| scene.trim().to_string());
    let genres: Vec<String> = match known {
        Some(s) if genres.is_empty() => s
            .default_genres
            .iter()
            .map(|g| g.to_string())
            .collect(),
        _ => genres,
    };

    let mut ctx = SceneContext::new(scene_name)
        .with_mood(mood)
        .with_discovery(discovery);
    for g in genres {
        ctx = ctx.with_genre(g);
    }
    if ctx.selected_genres.is_empty() && ctx.custom_mood.trim().is_empty() {
        anyhow::bail!("pick at least one --genre or describe a --mood");
    }
    Ok(ctx)
}

async fn generate(ctx: SceneContext, save: bool, no_browser: bool) -> anyhow::Result<()> {
    let cfg = load_config();
    cfg.validate().context("incomplete configuration")?;

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build http client")?;
    let music = Arc::new(SpotifyClient::new(http.clone(), cfg.api_base_url.clone()));
    let suggest = Arc::new(GeminiClient::new(
        http.clone(),
        cfg.gemini_base_url.clone(),
        cfg.gemini_model.clone(),
        cfg.gemini_api_key.clone(),
    ));
    let pipeline = Pipeline::new(music, suggest);
    let mut broker = CredentialBroker::new(cfg, http);

    let url = broker
        .begin_authorization()
        .context("could not start authorization")?;
    println!("Authorize the app in your browser:\n\n  {}\n", url);
    if !no_browser {
        if let Err(e) = open_in_browser(url.as_str()).await {
            tracing::warn!(error = %e, "could not open a browser");
        }
    }
    println!("After approving, paste the full URL you were redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read callback URL")?;
    broker
        .complete_from_url(&line)
        .await
        .context("login failed")?;

    let profile = {
        let session = broker.require_session()?;
        pipeline.music().profile(session).await
    };
    match profile {
        Ok(p) => println!("Connected as {}", p.display_name()),
        Err(e) => {
            broker.logout();
            return Err(e).context("could not fetch the user profile");
        }
    }

    let run = pipeline
        .run_with(&mut broker, &ctx)
        .await
        .context("failed to generate playlist")?;

    if run.seeds.used_fallback {
        println!("Could not derive specific seeds; used general genres instead.");
    }
    println!("\n{}\n", run.playlist.name);
    for (i, t) in run.playlist.tracks.iter().enumerate() {
        let badge = if t.is_new { "  [new]" } else { "" };
        println!("{:>2}. {} - {}{}", i + 1, t.title, t.artist, badge);
    }

    if save {
        let created = pipeline
            .save_with(&mut broker, &run.playlist, &ctx.scene_name)
            .await
            .context("failed to save playlist")?;
        match created.external_urls.spotify {
            Some(u) => println!("\nSaved: {}", u),
            None => println!("\nSaved playlist {}", created.id),
        }
    }

    broker.logout();
    Ok(())
}

async fn open_in_browser(target: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "linux")]
    let mut cmd = Command::new("xdg-open");
    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = Command::new("cmd");

    #[cfg(target_os = "windows")]
    {
        cmd.arg("/C").arg("start").arg("").arg(target);
    }

    #[cfg(not(target_os = "windows"))]
    {
        cmd.arg(target);
    }

    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    let _ = cmd.spawn().context("failed to spawn system opener")?;
    Ok(())
}
