//! Language-model clients that turn free text into an [`Interpretation`].

use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::domain::time::parse_timestamp;
use crate::domain::{Concept, Interpretation};
use crate::error::AppError;

/// Anything that can read a prompt as `(start, end, concept)`.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, prompt: &str) -> Result<Interpretation, AppError>;
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaInterpreter {
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaInterpreter {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.ollama_url, &settings.ollama_model, settings.prompt_timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    /// Raw completion text for `instruction`.
    pub fn complete(&self, instruction: &str) -> Result<String, AppError> {
        // Built per call so the blocking client never drops on an async worker.
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::ExternalProcess(format!("Failed to build language model client: {e}")))?;

        let resp = client
            .post(self.endpoint())
            .json(&GenerateRequest {
                model: &self.model,
                prompt: instruction,
                stream: false,
            })
            .send()
            .map_err(|e| AppError::ExternalProcess(format!("Language model request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::ExternalProcess(format!(
                "Language model request failed with status {}.",
                resp.status()
            )));
        }

        let body: GenerateResponse = resp
            .json()
            .map_err(|e| AppError::ExternalProcess(format!("Failed to parse language model response: {e}")))?;
        Ok(body.response)
    }
}

impl Interpreter for OllamaInterpreter {
    fn interpret(&self, prompt: &str) -> Result<Interpretation, AppError> {
        let today = chrono::Utc::now().date_naive();
        let text = self.complete(&instruction(prompt, today))?;
        tracing::debug!(response = %text.trim(), "language model replied");
        parse_interpretation(&text)
    }
}

/// Extraction instructions sent to the model.
pub fn instruction(prompt: &str, today: NaiveDate) -> String {
    let concepts = Concept::ALL
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Extract the start date, end date and concept from this request: '{prompt}'.\n\
         Today is {today}.\n\
         Rules:\n\
         1. The concept must be one of {concepts}. Questions about the highest emissions map to \
         'maximum_carbon_intensity', the lowest to 'minimum_carbon_intensity', typical or mean \
         levels to 'average_carbon_intensity', and the best future time to 'predict_least_carbon'.\n\
         2. A month and year such as 'April 2022' spans the first through the last day of that month.\n\
         3. A bare year spans January 1st through December 31st.\n\
         4. 'this year' and 'next year' span the current and the following calendar year.\n\
         5. Format dates as YYYY-MM-DDTHH:MM:SS.SSSZ.\n\
         Reply with exactly one line and nothing else:\n\
         Start Date: YYYY-MM-DDTHH:MM:SS.SSSZ End Date: YYYY-MM-DDTHH:MM:SS.SSSZ Concept: <concept>"
    )
}

/// Read the `Start Date: .. End Date: .. Concept: ..` line out of a reply.
pub fn parse_interpretation(text: &str) -> Result<Interpretation, AppError> {
    let re = Regex::new(r"Start Date:\s*(\S+)\s*End Date:\s*(\S+)\s*Concept:\s*(\w+)")
        .map_err(|e| AppError::ExternalProcess(format!("Invalid interpretation pattern: {e}")))?;

    let caps = re.captures(text).ok_or_else(|| {
        AppError::ExternalProcess("Could not extract dates and concept from the language model reply.".into())
    })?;

    let date = |idx: usize| {
        let raw = &caps[idx];
        parse_timestamp(raw)
            .ok_or_else(|| AppError::ExternalProcess(format!("Language model returned an unparsable date '{raw}'.")))
    };

    Ok(Interpretation {
        start: date(1)?,
        end: date(2)?,
        concept: caps[3].parse()?,
    })
}
