//! Imagen (Google) text-to-image client.
//!
//! One request per generation: a single square PNG from the `:predict`
//! endpoint, returned as decoded bytes.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// API model identifier.
pub const MODEL: &str = "imagen-4.0-generate-001";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Wraps the user's description in the fixed stylistic template sent to
/// the API. Product copy, kept verbatim.
pub fn decorate_prompt(prompt: &str) -> String {
    format!(
        "A Pixar-style 3D character of \"{prompt}\". Spectacular character design, \
         3D neon light effects, maximum quality, cinematic lighting, God mode activated."
    )
}

/// A successfully generated PNG.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    png: Vec<u8>,
}

impl GeneratedImage {
    /// Wraps already-decoded PNG bytes.
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// Raw PNG bytes.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// The image as a `data:image/png;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// Imagen API client. The key is read from the environment at startup;
/// a missing or invalid key surfaces as an API error, not up front.
pub struct ImagenClient {
    client: reqwest::Client,
    api_key: String,
}

impl ImagenClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Generates one square PNG for the decorated prompt.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let url = format!("{API_BASE}/models/{MODEL}:predict");
        let body = ImagenRequest::for_prompt(prompt);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_api_error(status.as_u16(), &text));
        }

        let parsed: ImagenResponse = response.json().await?;
        parsed.into_image()
    }
}

/// Extracts the error message from a non-success response body. The API
/// wraps it in `{"error": {"message": ...}}`; anything else is passed
/// through as-is.
fn parse_api_error(status: u16, text: &str) -> FusionError {
    let message = serde_json::from_str::<ApiErrorBody>(text)
        .map(|body| body.error.message)
        .unwrap_or_else(|_| text.trim().to_string());
    FusionError::Api { status, message }
}

// Request/response wire types

#[derive(Debug, Serialize)]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

impl ImagenRequest {
    /// One square PNG for the decorated form of `prompt`.
    fn for_prompt(prompt: &str) -> Self {
        Self {
            instances: vec![ImagenInstance {
                prompt: decorate_prompt(prompt),
            }],
            parameters: ImagenParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
                output_mime_type: "image/png".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    bytes_base64_encoded: String,
}

impl ImagenResponse {
    /// Decodes the first prediction, or fails with the no-image condition
    /// when the list is empty.
    fn into_image(self) -> Result<GeneratedImage> {
        let first = self
            .predictions
            .into_iter()
            .next()
            .ok_or(FusionError::NoImage)?;

        let png = base64::engine::general_purpose::STANDARD
            .decode(&first.bytes_base64_encoded)?;

        Ok(GeneratedImage::from_png(png))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}
