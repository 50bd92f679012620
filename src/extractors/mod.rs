pub mod command;

use crate::collections::new_id;
use crate::errors::{AppError, AppResult};
use crate::models::{Household, ImageUpload};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const EXTRACTION_PROMPT: &str = "Ekstrak semua informasi dari gambar Kartu Keluarga ini. Pastikan NIK dan No. KK 16 digit. Format tanggal lahir YYYY-MM-DD.";

pub const EXTRACTION_FAILED: &str = "Gagal memproses gambar KK. Pastikan gambar jelas dan coba lagi.";

/// What is sent to the document-extraction service for one family card photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub mime_type: String,
    pub data: String,
    pub prompt: String,
    pub response_schema: Value,
}

/// A service that reads a family card image and answers with JSON text
/// shaped by `request.response_schema`.
pub trait FamilyCardExtractor: Send + Sync {
    fn extract(&self, request: &ExtractionRequest) -> AppResult<String>;
}

pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "Nomor Kartu Keluarga (16 digit)" },
            "headName": { "type": "string" },
            "address": { "type": "string" },
            "rt": { "type": "string" },
            "rw": { "type": "string" },
            "village": { "type": "string" },
            "district": { "type": "string" },
            "city": { "type": "string" },
            "province": { "type": "string" },
            "postalCode": { "type": "string" },
            "members": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "nik": { "type": "string", "description": "Nomor Induk Kependudukan (16 digit)" },
                        "name": { "type": "string" },
                        "gender": { "type": "string", "enum": ["Laki-laki", "Perempuan"] },
                        "birthPlace": { "type": "string" },
                        "birthDate": { "type": "string", "description": "Format YYYY-MM-DD" },
                        "religion": { "type": "string" },
                        "education": { "type": "string" },
                        "occupation": { "type": "string" },
                        "relationship": { "type": "string" }
                    }
                }
            }
        }
    })
}

pub fn build_request(upload: &ImageUpload) -> AppResult<ExtractionRequest> {
    let mime_type = upload.mime_type.trim();
    if !mime_type.starts_with("image/") {
        return Err(AppError::Validation(format!("expected an image, got '{}'", mime_type)));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("image is empty".to_string()));
    }
    Ok(ExtractionRequest {
        mime_type: mime_type.to_string(),
        data: B64.encode(&upload.bytes),
        prompt: EXTRACTION_PROMPT.to_string(),
        response_schema: response_schema(),
    })
}

/// Services sometimes wrap JSON in a markdown fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn validate_against_schema(value: &Value, schema: &Value) -> Result<(), Vec<String>> {
    let compiled = jsonschema::JSONSchema::compile(schema)
        .map_err(|error| vec![format!("invalid response schema: {}", error)])?;

    let errors: Vec<String> = compiled
        .validate(value)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parses a service answer into an unsaved household draft. Every member
/// gets a fresh id; the draft is not validated as a household yet.
pub fn parse_response(raw: &str) -> AppResult<Household> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(AppError::Extraction("extraction service returned no content".to_string()));
    }
    let mut value: Value = serde_json::from_str(body)
        .map_err(|error| AppError::Extraction(format!("response is not JSON: {}", error)))?;
    validate_against_schema(&value, &response_schema())
        .map_err(|errors| AppError::Extraction(format!("response did not match schema: {}", errors.join("; "))))?;

    blank_unreadable_birth_dates(&mut value);

    let mut household: Household = serde_json::from_value(value)
        .map_err(|error| AppError::Extraction(format!("response has unusable fields: {}", error)))?;
    for member in &mut household.members {
        member.id = new_id("new");
    }
    household.family_card_image = None;
    Ok(household)
}

/// A date the form cannot hold is dropped so the draft still opens and the
/// user can type it in.
fn blank_unreadable_birth_dates(value: &mut Value) {
    let Some(members) = value.get_mut("members").and_then(Value::as_array_mut) else {
        return;
    };
    for member in members {
        let Some(birth_date) = member.get_mut("birthDate") else {
            continue;
        };
        let Some(raw) = birth_date.as_str().map(str::trim) else {
            continue;
        };
        if raw.is_empty() || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
            continue;
        }
        tracing::warn!(birth_date = raw, "extracted birth date is not YYYY-MM-DD, leaving it blank");
        *birth_date = Value::String(String::new());
    }
}

/// One extraction attempt. Any failure collapses into a single
/// user-facing message; the cause is logged.
pub fn scan_family_card(extractor: &dyn FamilyCardExtractor, upload: &ImageUpload) -> AppResult<Household> {
    let result = build_request(upload)
        .and_then(|request| extractor.extract(&request))
        .and_then(|raw| parse_response(&raw));

    match result {
        Ok(household) => {
            tracing::info!(members = household.members.len(), "family card extracted");
            Ok(household)
        }
        Err(error) => {
            tracing::error!(error = %error, "Error processing KK image");
            Err(AppError::Extraction(EXTRACTION_FAILED.to_string()))
        }
    }
}
