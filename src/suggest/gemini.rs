use super::{
    build_prompt, parse_suggestion, CreativeSuggestion, SuggestionRequest, SuggestionService,
    SERVICE,
};
use crate::error::{check_response, Error, Result};
use serde::Deserialize;
use serde_json::json;

/// generateContent client. No retries, no caching.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

pub(crate) fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "playlistNameSuggestion": { "type": "STRING" },
                    "seedGenres": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "seedArtists": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["playlistNameSuggestion", "seedGenres", "seedArtists"],
                "propertyOrdering": ["playlistNameSuggestion", "seedGenres", "seedArtists"]
            }
        }
    })
}

/// First parse pass: dig the first candidate's text out of the envelope.
pub(crate) fn candidate_text(raw: &str) -> Result<String> {
    let envelope: Envelope = serde_json::from_str(raw)
        .map_err(|e| Error::validation(SERVICE, format!("malformed envelope: {}", e)))?;
    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::validation(SERVICE, "reply carried no candidate text"))
}

#[async_trait::async_trait]
impl SuggestionService for GeminiClient {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<CreativeSuggestion> {
        let prompt = build_prompt(request);
        let resp = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body(&prompt))
            .send()
            .await
            .map_err(Error::transport(SERVICE))?;
        let resp = check_response(SERVICE, resp).await?;
        let raw = resp.text().await.map_err(Error::transport(SERVICE))?;

        let text = candidate_text(&raw)?;
        let suggestion = parse_suggestion(&text)?;
        tracing::debug!(
            name = %suggestion.playlist_name_suggestion,
            genres = ?suggestion.seed_genres,
            artists = suggestion.seed_artists.len(),
            "suggestion received"
        );
        Ok(suggestion)
    }
}
