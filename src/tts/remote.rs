//! Google Cloud Text-to-Speech client.
//!
//! Synchronous facade over the REST API: the client owns a current-thread
//! tokio runtime and drives each request with `block_on`, so callers on
//! plain threads never see async. Audio comes back base64-encoded inside
//! a JSON envelope.

use crate::audio::buffer::AudioEncoding;
use crate::error::{DiktatError, Result};
use crate::tts::synthesizer::Synthesizer;
use crate::tts::voice::{Gender, Language, Voice, VoiceDirectory};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

const TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
    speaking_rate: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<RemoteVoice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteVoice {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
    #[serde(default)]
    ssml_gender: String,
}

fn parse_ssml_gender(s: &str) -> Gender {
    match s {
        "MALE" => Gender::Male,
        "FEMALE" => Gender::Female,
        _ => Gender::Neutral,
    }
}

/// Client for the Google Cloud Text-to-Speech REST API.
pub struct GoogleTtsClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
    runtime: Runtime,
}

impl GoogleTtsClient {
    /// # Errors
    /// Fails when the tokio runtime cannot be created.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, TTS_ENDPOINT)
    }

    /// Client pointed at a non-default endpoint, for tests against a
    /// local HTTP stub.
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DiktatError::Synthesis {
                message: format!("cannot create async runtime: {e}"),
            })?;
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    async fn synthesize_async(
        &self,
        text: &str,
        encoding: AudioEncoding,
        voice: &Voice,
        speaking_rate: f64,
    ) -> Result<Vec<u8>> {
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: voice.language.code(),
                name: &voice.name,
                ssml_gender: voice.gender.ssml(),
            },
            audio_config: AudioConfig {
                audio_encoding: encoding.as_str(),
                speaking_rate,
            },
        };

        let url = format!("{}/text:synthesize?key={}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiktatError::Synthesis {
                message: format!("synthesis request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiktatError::Synthesis {
                message: format!("synthesis returned status {status}: {body}"),
            });
        }

        let parsed: SynthesizeResponse =
            response.json().await.map_err(|e| DiktatError::Synthesis {
                message: format!("cannot parse synthesis response: {e}"),
            })?;

        if parsed.audio_content.is_empty() {
            // soft failure, handled upstream
            log::warn!("synthesis returned no audio for {} chars of text", text.len());
            return Ok(Vec::new());
        }

        BASE64
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| DiktatError::Synthesis {
                message: format!("cannot decode audio content: {e}"),
            })
    }

    async fn list_voices_async(&self, language: Language) -> Result<Vec<Voice>> {
        let url = format!(
            "{}/voices?languageCode={}&key={}",
            self.endpoint,
            language.code(),
            self.api_key
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DiktatError::VoiceLookup {
                message: format!("voice listing request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiktatError::VoiceLookup {
                message: format!("voice listing returned status {status}"),
            });
        }

        let parsed: ListVoicesResponse =
            response.json().await.map_err(|e| DiktatError::VoiceLookup {
                message: format!("cannot parse voice listing: {e}"),
            })?;

        let voices = parsed
            .voices
            .into_iter()
            .filter(|v| {
                v.language_codes
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(language.code()))
            })
            .map(|v| Voice {
                language,
                gender: parse_ssml_gender(&v.ssml_gender),
                name: v.name,
            })
            .collect();
        Ok(voices)
    }
}

impl Synthesizer for GoogleTtsClient {
    fn synthesize(
        &self,
        text: &str,
        encoding: AudioEncoding,
        voice: &Voice,
        speaking_rate: f64,
    ) -> Result<Vec<u8>> {
        self.runtime
            .block_on(self.synthesize_async(text, encoding, voice, speaking_rate))
    }
}

impl VoiceDirectory for GoogleTtsClient {
    fn list_voices(&self, language: Language) -> Result<Vec<Voice>> {
        self.runtime.block_on(self.list_voices_async(language))
    }
}
