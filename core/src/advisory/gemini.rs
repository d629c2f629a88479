//! Google Generative AI scoring backend.
//!
//! One non-streaming `generateContent` call per report. The model is asked for
//! raw JSON; markdown fences are stripped anyway because models add them.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::config::AdvisoryConfig;
use crate::record::ApplicationRecord;
use crate::settings::ScoringCredentials;

use super::AdvisoryError;
use super::AdvisoryReport;
use super::ScoringBackend;

/// Google error wrapper.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// The JSON object the prompt asks for.
#[derive(Debug, Deserialize)]
struct RawReport {
    score: Value,
    verdict: String,
    summary: String,
}

pub struct GeminiScorer {
    client: reqwest::Client,
    base_url: String,
    credentials: ScoringCredentials,
}

impl GeminiScorer {
    pub fn new(
        config: &AdvisoryConfig,
        credentials: ScoringCredentials,
    ) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url, credentials))
    }

    /// Creates a scorer with a custom HTTP client and endpoint.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        credentials: ScoringCredentials,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.credentials.model)
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, AdvisoryError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.credentials.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .ok()
                .and_then(|e| e.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "API Request Failed".to_string());
            tracing::warn!("generateContent returned {status}: {error_text}");
            return Err(AdvisoryError::ApiResponse {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<GenerateResponse>().await?)
    }

    /// Send a one-word prompt to check the credential and model.
    pub async fn ping(&self) -> Result<(), AdvisoryError> {
        self.generate("Ping").await.map(|_| ())
    }
}

#[async_trait]
impl ScoringBackend for GeminiScorer {
    async fn score(&self, record: &ApplicationRecord) -> Result<AdvisoryReport, AdvisoryError> {
        tracing::info!("requesting remote analysis of {} using {}", record.id, self.model());
        let response = self.generate(&build_prompt(record)).await?;
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(AdvisoryError::EmptyResponse)?;
        parse_report(&text)
    }
}

pub fn build_prompt(record: &ApplicationRecord) -> String {
    format!(
        "You are an expert venture capitalist analyst. Analyze this startup:\n\
         Name: {name}\n\
         Stage: {stage}\n\
         Description: {description}\n\
         \n\
         Provide a JSON response with these keys:\n\
         - score: A number between 0-100 representing investment fit.\n\
         - verdict: A short 2-3 word category (e.g. \"Strong Contender\", \"High Risk\").\n\
         - summary: A 2-sentence executive summary.\n\
         \n\
         Do not include emojis. Keep it professional. \
         Do not include markdown formatting, just raw JSON.",
        name = record.display_title(),
        stage = record.stage,
        description = record.description,
    )
}

/// Remove every ```json and ``` marker, then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse generated text into a report. The score may arrive as a number or a
/// numeric string; it is rounded and clamped to 0-100.
pub fn parse_report(text: &str) -> Result<AdvisoryReport, AdvisoryError> {
    let cleaned = strip_code_fences(text);
    let raw: RawReport =
        serde_json::from_str(&cleaned).map_err(|e| AdvisoryError::Parse(e.to_string()))?;

    let score = match &raw.score {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| AdvisoryError::Parse(format!("score is not a number: {}", raw.score)))?;

    Ok(AdvisoryReport {
        score: score.round().clamp(0.0, 100.0) as u8,
        verdict: raw.verdict,
        summary: raw.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use crate::record::Stage;
    use crate::record::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn parses_fenced_report() {
        let report = parse_report(
            "```json\n{\"score\": 72.4, \"verdict\": \"Strong Contender\", \"summary\": \"Solid.\"}\n```",
        )
        .unwrap();
        assert_eq!(
            report,
            AdvisoryReport {
                score: 72,
                verdict: "Strong Contender".to_string(),
                summary: "Solid.".to_string(),
            }
        );
    }

    #[test]
    fn score_strings_and_out_of_range_values() {
        let report = parse_report(r#"{"score": "88", "verdict": "v", "summary": "s"}"#).unwrap();
        assert_eq!(report.score, 88);
        let report = parse_report(r#"{"score": 140, "verdict": "v", "summary": "s"}"#).unwrap();
        assert_eq!(report.score, 100);
        let report = parse_report(r#"{"score": -3, "verdict": "v", "summary": "s"}"#).unwrap();
        assert_eq!(report.score, 0);
    }

    #[test]
    fn unparseable_text_is_a_parse_error() {
        assert!(matches!(
            parse_report("The startup looks great!"),
            Err(AdvisoryError::Parse(_))
        ));
        assert!(matches!(
            parse_report(r#"{"score": "high", "verdict": "v", "summary": "s"}"#),
            Err(AdvisoryError::Parse(_))
        ));
        assert!(matches!(
            parse_report(r#"{"score": 50}"#),
            Err(AdvisoryError::Parse(_))
        ));
    }

    #[test]
    fn prompt_names_business_stage_and_description() {
        let mut record = ApplicationRecord::new(RecordId(1), "Ada", Stage::Mvp, Status::New);
        record.description = "Analytical engines".to_string();
        let prompt = build_prompt(&record);
        assert!(prompt.contains("Name: Ada\n"));
        assert!(prompt.contains("Stage: mvp\n"));
        assert!(prompt.contains("Description: Analytical engines\n"));
        assert!(prompt.ends_with("just raw JSON."));

        record.business_name = Some("Engines Ltd".to_string());
        assert!(build_prompt(&record).contains("Name: Engines Ltd\n"));
    }
}
