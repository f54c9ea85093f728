//! One method per feature, each a single proxy call under the retry policy.

use crate::config::{ModelSet, ProxyConfig};
use crate::error::{AugurError, UpstreamError};
use crate::proxy::{Operation, ProxyClient, ProxyRequest, ProxyResponse};
use crate::retry::{RetryLayer, RetryService, Sleeper, TokioSleeper};
use crate::types::{
    AspectRatio, Content, GenerateContentConfig, GenerateContentRequest, GenerateContentResponse,
    GenerateImagesConfig, GenerateImagesRequest, GenerateImagesResponse, GenerateVideosConfig,
    GenerateVideosRequest, Image, InlineData, LatLng, Modality, Part, RetrievalConfig,
    SpeechConfig, ThinkingConfig, Tool, ToolConfig, VideoOperation,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tower::{ServiceBuilder, ServiceExt};
use tower_service::Service;

/// Voice used for spoken fortunes
pub const TTS_VOICE: &str = "Kore";

/// Thinking budget granted when deep thinking is requested
pub const THINKING_BUDGET: u32 = 32768;

pub const TRANSCRIBE_PROMPT: &str = "Transcribe this audio.";

/// Upper bound on status checks made by [`AiServices::wait_for_video`]
pub const MAX_VIDEO_POLLS: u32 = 60;

const BILLING_MARKER: &str = "only accessible to billed users";

/// Chat toggles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    /// Ground answers with Google Search
    pub search: bool,
    pub thinking: bool,
    /// Ground answers with Google Maps
    pub maps: bool,
    pub location: Option<LatLng>,
}

impl ChatOptions {
    fn to_config(self) -> GenerateContentConfig {
        let mut config = GenerateContentConfig::default();

        if self.thinking {
            config.thinking_config = Some(ThinkingConfig {
                thinking_budget: THINKING_BUDGET,
            });
        }

        let mut tools = Vec::new();
        if self.search {
            tools.push(Tool::google_search());
        }
        if self.maps {
            tools.push(Tool::google_maps());
        }
        if !tools.is_empty() {
            config.tools = Some(tools);
        }

        if self.maps {
            if let Some(lat_lng) = self.location {
                config.tool_config = Some(ToolConfig {
                    retrieval_config: RetrievalConfig { lat_lng },
                });
            }
        }

        config
    }
}

/// Downloaded video
#[derive(Debug, Clone)]
pub struct VideoBlob {
    pub content_type: String,
    pub data: Bytes,
}

/// Production transport: the proxy client behind the retry layer
pub type RetryingProxy = RetryService<ProxyClient>;

/// The AI features, generic over the transport that reaches the proxy
#[derive(Debug, Clone)]
pub struct AiServices<T = RetryingProxy> {
    transport: T,
    models: ModelSet,
}

impl AiServices<RetryingProxy> {
    pub fn new(config: &ProxyConfig) -> Result<Self, AugurError> {
        let transport = ServiceBuilder::new()
            .layer(RetryLayer::new(config.retry))
            .service(ProxyClient::new(config)?);

        Ok(Self::with_transport(transport, config.models.clone()))
    }
}

impl<T> AiServices<T>
where
    T: Service<ProxyRequest, Response = ProxyResponse, Error = AugurError> + Clone,
{
    pub fn with_transport(transport: T, models: ModelSet) -> Self {
        Self { transport, models }
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, AugurError> {
        self.transport.clone().oneshot(request).await
    }

    async fn call_json<R: DeserializeOwned>(
        &self,
        operation: Operation,
        params: impl serde::Serialize,
    ) -> Result<R, AugurError> {
        let request = ProxyRequest::new(operation, params)?;
        self.send(request).await?.into_json()
    }

    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AugurError> {
        log::debug!("generateContent with {}", request.model);
        self.call_json(Operation::GenerateContent, request).await
    }

    /// Fortune from a text prompt (usually built from a birth date)
    pub async fn get_fortune(&self, prompt: &str) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(GenerateContentRequest::new(&self.models.flash, prompt))
            .await
    }

    /// Fortune read from a photo of a palm or a face
    pub async fn read_palm_or_face(
        &self,
        image: &InlineData,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(GenerateContentRequest::with_parts(
            &self.models.flash,
            vec![Part::inline(image.clone()), Part::text(prompt)],
        ))
        .await
    }

    /// High quality image generation.
    ///
    /// Accounts without billing get [`AugurError::BillingRequired`]; callers
    /// usually fall back to [`AiServices::generate_image_with_flash`].
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GenerateImagesResponse, AugurError> {
        let request = GenerateImagesRequest {
            model: self.models.imagen.clone(),
            prompt: prompt.to_string(),
            config: GenerateImagesConfig {
                number_of_images: 1,
                output_mime_type: "image/jpeg".to_string(),
                aspect_ratio,
            },
        };

        self.call_json(Operation::GenerateImages, request)
            .await
            .map_err(billing_required)
    }

    /// Image generation on the flash image model.
    ///
    /// A candidate stopped by the safety filters fails with
    /// [`AugurError::SafetyBlocked`] rather than coming back without an image.
    pub async fn generate_image_with_flash(
        &self,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(
            GenerateContentRequest::with_parts(&self.models.flash_image, vec![Part::text(prompt)])
                .with_config(image_output()),
        )
        .await
        .and_then(reject_safety_block)
    }

    pub async fn edit_image(
        &self,
        image: &InlineData,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(
            GenerateContentRequest::with_parts(
                &self.models.flash_image,
                vec![Part::inline(image.clone()), Part::text(prompt)],
            )
            .with_config(image_output()),
        )
        .await
        .and_then(reject_safety_block)
    }

    /// Start a video generation; poll the returned operation until done
    pub async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        image: Option<&InlineData>,
    ) -> Result<VideoOperation, AugurError> {
        if !aspect_ratio.supports_video() {
            return Err(AugurError::validation(format!(
                "Videos can only be {} or {}, not {aspect_ratio}",
                AspectRatio::Wide,
                AspectRatio::Tall
            )));
        }

        let request = GenerateVideosRequest {
            model: self.models.veo.clone(),
            prompt: prompt.to_string(),
            config: GenerateVideosConfig {
                number_of_videos: 1,
                resolution: "720p".to_string(),
                aspect_ratio,
            },
            image: image.cloned().map(Image::from),
        };

        self.call_json(Operation::GenerateVideos, request).await
    }

    pub async fn check_video_status(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, AugurError> {
        self.call_json(
            Operation::GetVideosOperation,
            json!({ "operation": operation }),
        )
        .await
    }

    /// Poll until the operation is done.
    ///
    /// Fails when the operation reports an error or is still running after
    /// [`MAX_VIDEO_POLLS`] checks.
    pub async fn wait_for_video(
        &self,
        operation: VideoOperation,
        poll_interval: Duration,
    ) -> Result<VideoOperation, AugurError> {
        self.wait_for_video_with(operation, poll_interval, &TokioSleeper).await
    }

    /// [`AiServices::wait_for_video`] with the pause between polls taken by `sleeper`
    pub async fn wait_for_video_with<S: Sleeper>(
        &self,
        operation: VideoOperation,
        poll_interval: Duration,
        sleeper: &S,
    ) -> Result<VideoOperation, AugurError> {
        let mut operation = operation;

        for poll in 0..=MAX_VIDEO_POLLS {
            if let Some(error) = &operation.error {
                return Err(AugurError::Upstream(operation_error(error)));
            }
            if operation.is_done() {
                return Ok(operation);
            }
            if poll == MAX_VIDEO_POLLS {
                break;
            }

            log::info!(
                "Video still rendering, checking again in {}s (poll {}/{MAX_VIDEO_POLLS})",
                poll_interval.as_secs(),
                poll + 1
            );
            sleeper.sleep(poll_interval).await;
            operation = self.check_video_status(&operation).await?;
        }

        Err(AugurError::unknown(format!(
            "Video generation did not finish after {MAX_VIDEO_POLLS} status checks"
        )))
    }

    /// Download a finished video through the proxy
    pub async fn fetch_video(&self, uri: &str) -> Result<VideoBlob, AugurError> {
        let request = ProxyRequest::new(Operation::FetchVideo, json!({ "url": uri }))?;
        let (content_type, data) = self.send(request).await?.into_bytes()?;

        if data.is_empty() {
            return Err(AugurError::empty_response("Downloaded video is empty"));
        }

        Ok(VideoBlob {
            content_type: content_type.unwrap_or_else(|| "video/mp4".to_string()),
            data,
        })
    }

    /// Spoken audio; the answer carries base64 PCM as inline data
    pub async fn text_to_speech(&self, text: &str) -> Result<GenerateContentResponse, AugurError> {
        let config = GenerateContentConfig {
            response_modalities: Some(vec![Modality::Audio]),
            speech_config: Some(SpeechConfig::prebuilt_voice(TTS_VOICE)),
            ..Default::default()
        };

        self.generate_content(
            GenerateContentRequest::new(
                &self.models.tts,
                vec![Content::from_parts(vec![Part::text(text)])],
            )
            .with_config(config),
        )
        .await
    }

    pub async fn get_daily_advice(
        &self,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(GenerateContentRequest::new(&self.models.flash, prompt))
            .await
    }

    pub async fn analyze_video(
        &self,
        video: &InlineData,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(GenerateContentRequest::with_parts(
            &self.models.pro,
            vec![Part::inline(video.clone()), Part::text(prompt)],
        ))
        .await
    }

    pub async fn send_chat_message(
        &self,
        prompt: &str,
        options: ChatOptions,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(
            GenerateContentRequest::new(&self.models.pro, prompt).with_config(options.to_config()),
        )
        .await
    }

    pub async fn transcribe_audio(
        &self,
        audio: &InlineData,
    ) -> Result<GenerateContentResponse, AugurError> {
        self.generate_content(GenerateContentRequest::with_parts(
            &self.models.flash,
            vec![Part::inline(audio.clone()), Part::text(TRANSCRIBE_PROMPT)],
        ))
        .await
    }
}

fn image_output() -> GenerateContentConfig {
    GenerateContentConfig {
        response_modalities: Some(vec![Modality::Image]),
        ..Default::default()
    }
}

fn reject_safety_block(
    response: GenerateContentResponse,
) -> Result<GenerateContentResponse, AugurError> {
    if response.is_safety_blocked() {
        return Err(AugurError::safety_blocked("the model declined to draw this prompt"));
    }
    Ok(response)
}

fn billing_required(error: AugurError) -> AugurError {
    let restricted = match &error {
        AugurError::Upstream(upstream) => upstream.message.contains(BILLING_MARKER),
        AugurError::Unknown { message, .. } => message.contains(BILLING_MARKER),
        _ => false,
    };

    if restricted {
        AugurError::BillingRequired
    } else {
        error
    }
}

fn operation_error(error: &serde_json::Value) -> UpstreamError {
    serde_json::from_value(error.clone())
        .unwrap_or_else(|_| UpstreamError::proxy(format!("Video generation failed: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{Retrier, RetryPolicy};
    use crate::types::AspectRatio;
    use crate::utils::test_helpers::{
        RecordingSleeper, RecordingTransport, overloaded, rate_limited, text_response,
    };
    use std::sync::{Arc, Mutex};

    fn services(transport: &RecordingTransport) -> AiServices<RecordingTransport> {
        AiServices::with_transport(transport.clone(), ModelSet::default())
    }

    fn image() -> InlineData {
        InlineData::new("image/png", "iVBORw0KGgo=")
    }

    #[tokio::test]
    async fn fortune_uses_flash_with_plain_prompt() {
        let transport = RecordingTransport::json(text_response("A journey awaits."));

        let response = services(&transport)
            .get_fortune("Born on 1990-04-12")
            .await
            .unwrap();

        assert_eq!(response.text().as_deref(), Some("A journey awaits."));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].operation, Operation::GenerateContent);
        assert_eq!(
            requests[0].params,
            json!({ "model": "gemini-2.5-flash", "contents": "Born on 1990-04-12" })
        );
    }

    #[tokio::test]
    async fn palm_reading_sends_image_before_prompt() {
        let transport = RecordingTransport::json(text_response("Long life line."));

        services(&transport)
            .read_palm_or_face(&image(), "Read this palm")
            .await
            .unwrap();

        assert_eq!(
            transport.last_params(),
            json!({
                "model": "gemini-2.5-flash",
                "contents": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } },
                    { "text": "Read this palm" }
                ]}
            })
        );
    }

    #[tokio::test]
    async fn imagen_request_shape() {
        let transport = RecordingTransport::json(json!({
            "generatedImages": [{ "image": { "imageBytes": "AAAA", "mimeType": "image/jpeg" } }]
        }));

        let response = services(&transport)
            .generate_image("a crystal ball", AspectRatio::Portrait)
            .await
            .unwrap();

        assert!(response.first_image().is_some());
        let request = &transport.requests()[0];
        assert_eq!(request.operation, Operation::GenerateImages);
        assert_eq!(
            request.params,
            json!({
                "model": "imagen-4.0-generate-001",
                "prompt": "a crystal ball",
                "config": {
                    "numberOfImages": 1,
                    "outputMimeType": "image/jpeg",
                    "aspectRatio": "3:4"
                }
            })
        );
    }

    #[tokio::test]
    async fn imagen_billing_error_is_mapped() {
        let transport = RecordingTransport::new(|_| {
            Err(AugurError::Upstream(UpstreamError::proxy(
                "Imagen API is only accessible to billed users at this time.",
            )))
        });

        let err = services(&transport)
            .generate_image("a tarot card", AspectRatio::Square)
            .await
            .unwrap_err();

        assert!(matches!(err, AugurError::BillingRequired));
    }

    #[tokio::test]
    async fn other_imagen_errors_pass_through() {
        let transport = RecordingTransport::new(|_| {
            Err(AugurError::upstream("INVALID_ARGUMENT", "prompt blocked"))
        });

        let err = services(&transport)
            .generate_image("a tarot card", AspectRatio::Square)
            .await
            .unwrap_err();

        assert!(matches!(err, AugurError::Upstream(_)));
    }

    #[tokio::test]
    async fn flash_image_generation_and_editing_request_image_modality() {
        let transport = RecordingTransport::json(json!({ "candidates": [] }));
        let services = services(&transport);

        services
            .generate_image_with_flash("a moonlit owl")
            .await
            .unwrap();
        services
            .edit_image(&image(), "add a starry sky")
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].params,
            json!({
                "model": "gemini-2.5-flash-image",
                "contents": { "parts": [{ "text": "a moonlit owl" }] },
                "config": { "responseModalities": ["IMAGE"] }
            })
        );
        assert_eq!(
            requests[1].params["contents"]["parts"][1],
            json!({ "text": "add a starry sky" })
        );
        assert_eq!(
            requests[1].params["config"],
            json!({ "responseModalities": ["IMAGE"] })
        );
    }

    #[tokio::test]
    async fn safety_stopped_images_are_reported() {
        let transport = RecordingTransport::json(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
        }));
        let services = services(&transport);

        let err = services
            .generate_image_with_flash("a guardian angel")
            .await
            .unwrap_err();
        assert!(matches!(err, AugurError::SafetyBlocked { .. }));

        let err = services
            .edit_image(&image(), "make it darker")
            .await
            .unwrap_err();
        assert!(matches!(err, AugurError::SafetyBlocked { .. }));
    }

    #[tokio::test]
    async fn video_generation_with_seed_image() {
        let transport =
            RecordingTransport::json(json!({ "name": "operations/123", "done": false }));

        let operation = services(&transport)
            .generate_video("a comet", AspectRatio::Wide, Some(&image()))
            .await
            .unwrap();

        assert_eq!(operation.name.as_deref(), Some("operations/123"));
        assert_eq!(
            transport.last_params(),
            json!({
                "model": "veo-3.1-fast-generate-preview",
                "prompt": "a comet",
                "config": {
                    "numberOfVideos": 1,
                    "resolution": "720p",
                    "aspectRatio": "16:9"
                },
                "image": { "imageBytes": "iVBORw0KGgo=", "mimeType": "image/png" }
            })
        );
    }

    #[tokio::test]
    async fn video_rejects_square_aspect_ratio() {
        let transport = RecordingTransport::json(json!({}));

        let err = services(&transport)
            .generate_video("a comet", AspectRatio::Square, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AugurError::Validation { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn waiting_polls_until_done() {
        let polls = Arc::new(Mutex::new(0));
        let counter = polls.clone();
        let transport = RecordingTransport::new(move |request| {
            assert_eq!(request.operation, Operation::GetVideosOperation);
            let mut polls = counter.lock().unwrap();
            *polls += 1;
            let done = *polls >= 2;
            Ok(ProxyResponse::Json(json!({
                "name": "operations/123",
                "done": done,
                "response": { "generatedVideos": [{ "video": { "uri": "https://v/1" } }] }
            })))
        });
        let start: VideoOperation =
            serde_json::from_value(json!({ "name": "operations/123" })).unwrap();

        let sleeper = RecordingSleeper::default();

        let finished = services(&transport)
            .wait_for_video_with(start, Duration::from_secs(10), &sleeper)
            .await
            .unwrap();

        assert_eq!(finished.video_uri(), Some("https://v/1"));
        assert_eq!(*polls.lock().unwrap(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(10); 2]);
        assert_eq!(
            transport.requests()[0].params,
            json!({ "operation": { "name": "operations/123" } })
        );
    }

    #[tokio::test]
    async fn waiting_surfaces_operation_error() {
        let transport = RecordingTransport::json(json!({}));
        let failed: VideoOperation = serde_json::from_value(json!({
            "name": "operations/9",
            "done": true,
            "error": { "code": 3, "message": "unsafe prompt", "status": "INVALID_ARGUMENT" }
        }))
        .unwrap();

        let err = services(&transport)
            .wait_for_video(failed, Duration::ZERO)
            .await
            .unwrap_err();

        assert_eq!(err.upstream_error().unwrap().message, "unsafe prompt");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn waiting_gives_up_after_poll_bound() {
        let transport =
            RecordingTransport::json(json!({ "name": "operations/slow", "done": false }));
        let start: VideoOperation =
            serde_json::from_value(json!({ "name": "operations/slow" })).unwrap();

        let sleeper = RecordingSleeper::default();

        let err = services(&transport)
            .wait_for_video_with(start, Duration::from_secs(10), &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, AugurError::Unknown { .. }));
        assert_eq!(transport.requests().len(), MAX_VIDEO_POLLS as usize);
        assert_eq!(sleeper.delays().len(), MAX_VIDEO_POLLS as usize);
    }

    #[tokio::test]
    async fn fetch_video_returns_bytes_with_default_type() {
        let transport = RecordingTransport::new(|_| {
            Ok(ProxyResponse::Bytes {
                content_type: None,
                data: Bytes::from_static(b"\x00\x00\x00\x18ftypmp42"),
            })
        });

        let video = services(&transport)
            .fetch_video("https://v/1?alt=media")
            .await
            .unwrap();

        assert_eq!(video.content_type, "video/mp4");
        assert_eq!(video.data.len(), 12);
        assert_eq!(
            transport.requests()[0].params,
            json!({ "url": "https://v/1?alt=media" })
        );
    }

    #[tokio::test]
    async fn speech_uses_kore_voice_and_list_contents() {
        let transport = RecordingTransport::json(json!({ "candidates": [] }));

        services(&transport)
            .text_to_speech("Your fortune awaits")
            .await
            .unwrap();

        assert_eq!(
            transport.last_params(),
            json!({
                "model": "gemini-2.5-flash-preview-tts",
                "contents": [{ "parts": [{ "text": "Your fortune awaits" }] }],
                "config": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": { "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": "Kore" }
                    }}
                }
            })
        );
    }

    #[tokio::test]
    async fn advice_analysis_and_transcription_models() {
        let transport = RecordingTransport::json(text_response("ok"));
        let services = services(&transport);
        let video = InlineData::new("video/mp4", "AAAA");
        let audio = InlineData::new("audio/webm", "BBBB");

        services.get_daily_advice("today?").await.unwrap();
        services.analyze_video(&video, "what happens?").await.unwrap();
        services.transcribe_audio(&audio).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].params["model"], "gemini-2.5-flash");
        assert_eq!(requests[1].params["model"], "gemini-2.5-pro");
        assert_eq!(
            requests[1].params["contents"]["parts"][0]["inlineData"]["mimeType"],
            "video/mp4"
        );
        assert_eq!(requests[2].params["model"], "gemini-2.5-flash");
        assert_eq!(
            requests[2].params["contents"]["parts"][1],
            json!({ "text": "Transcribe this audio." })
        );
    }

    #[tokio::test]
    async fn plain_chat_sends_empty_config() {
        let transport = RecordingTransport::json(text_response("hello"));

        services(&transport)
            .send_chat_message("hi", ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(
            transport.last_params(),
            json!({ "model": "gemini-2.5-pro", "contents": "hi", "config": {} })
        );
    }

    #[tokio::test]
    async fn chat_with_every_option() {
        let transport = RecordingTransport::json(text_response("hello"));
        let options = ChatOptions {
            search: true,
            thinking: true,
            maps: true,
            location: Some(LatLng::new(40.7, -74.0).unwrap()),
        };

        services(&transport)
            .send_chat_message("coffee nearby?", options)
            .await
            .unwrap();

        assert_eq!(
            transport.last_params()["config"],
            json!({
                "thinkingConfig": { "thinkingBudget": 32768 },
                "tools": [{ "googleSearch": {} }, { "googleMaps": {} }],
                "toolConfig": { "retrievalConfig": {
                    "latLng": { "latitude": 40.7, "longitude": -74.0 }
                }}
            })
        );
    }

    #[test]
    fn location_ignored_without_maps() {
        let options = ChatOptions {
            location: Some(LatLng::new(1.0, 2.0).unwrap()),
            ..Default::default()
        };

        assert_eq!(options.to_config(), GenerateContentConfig::default());
    }

    #[test]
    fn maps_without_location_has_no_tool_config() {
        let config = ChatOptions {
            maps: true,
            ..Default::default()
        }
        .to_config();

        assert_eq!(config.tools, Some(vec![Tool::google_maps()]));
        assert!(config.tool_config.is_none());
    }

    #[tokio::test]
    async fn calls_are_retried_through_the_layer() {
        let attempts = Arc::new(Mutex::new(0));
        let counter = attempts.clone();
        let inner = RecordingTransport::new(move |_| {
            let mut attempts = counter.lock().unwrap();
            *attempts += 1;
            match *attempts {
                1 => Err(rate_limited(Some("2s"))),
                2 => Err(overloaded()),
                _ => Ok(ProxyResponse::Json(text_response("third time lucky"))),
            }
        });
        let sleeper = RecordingSleeper::default();
        let transport = ServiceBuilder::new()
            .layer(RetryLayer::with_retrier(Retrier::with_sleeper(
                RetryPolicy::default(),
                sleeper.clone(),
            )))
            .service(inner.clone());
        let services = AiServices::with_transport(transport, ModelSet::default());

        let response = services.get_fortune("hello").await.unwrap();

        assert_eq!(response.text().as_deref(), Some("third time lucky"));
        assert_eq!(inner.requests().len(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(2500), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn production_services_validate_config() {
        assert!(AiServices::new(&ProxyConfig::new("not a url")).is_err());

        let services = AiServices::new(&ProxyConfig::new("http://localhost:3000")).unwrap();
        assert_eq!(services.models().pro, "gemini-2.5-pro");
    }
}
