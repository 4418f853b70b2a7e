//! Multipart draining and upload form validation
//!
//! Every part of the request is consumed before anything else happens: the
//! designated file is buffered, other files are read and dropped, and text
//! parts are collected by name. Validation then runs on the buffered form so
//! a rejected request never reaches storage or the database.

use actix_multipart::Multipart;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};
use crate::models::seconds_to_ms;
use crate::utils::filesystem::content_type_for;
use crate::utils::validation::is_valid_release_date;

/// Multipart field carrying the release cover
pub const COVER_FIELD: &str = "coverFile";

/// Multipart field carrying a track's audio
pub const AUDIO_FIELD: &str = "audioFile";

/// Largest accepted text part
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Longest accepted track, in seconds (24 hours)
const MAX_TRACK_SECONDS: f64 = 86_400.0;

/// A fully buffered file part
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Text fields plus the one file the endpoint cares about
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    /// Trimmed, non-empty value of a text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_file(&mut self, file: UploadedFile) {
        self.file = Some(file);
    }

    /// The captured file, ignoring zero-byte uploads
    fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take().filter(|f| !f.data.is_empty())
    }
}

/// Drain the whole multipart stream, keeping only `file_field`'s file
pub async fn drain_multipart(
    mut payload: Multipart,
    file_field: &str,
    max_file_bytes: usize,
) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            tracing::debug!("Multipart error: {}", e);
            ApiError::bad_request("Malformed multipart body")
        })?;

        let disp = field.content_disposition().clone();
        let name = disp.get_name().map(|s| s.to_string()).unwrap_or_default();

        match disp.get_filename() {
            Some(filename) if name == file_field => {
                let declared = field.content_type().map(|ct| ct.to_string());
                let data = read_limited(&mut field, max_file_bytes).await?;
                form.set_file(UploadedFile {
                    filename: filename.to_string(),
                    content_type: content_type_for(filename, declared.as_deref()),
                    data,
                });
            }
            Some(_) => {
                // unconsumed parts would stall the stream
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
                }
            }
            None => {
                let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES).await?;
                form.insert_field(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(form)
}

async fn read_limited(field: &mut actix_multipart::Field, limit: usize) -> ApiResult<Bytes> {
    let mut buf = BytesMut::new();

    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|_| ApiError::bad_request("Malformed multipart body"))?;
        if buf.len() + data.len() > limit {
            return Err(ApiError::PayloadTooLarge(format!(
                "Upload exceeds the {} byte limit",
                limit
            )));
        }
        buf.extend_from_slice(&data);
    }

    Ok(buf.freeze())
}

/// Validated Step 1 input
#[derive(Debug)]
pub struct ReleaseDraft {
    pub title: String,
    pub release_type: Option<String>,
    pub release_date: Option<String>,
    pub cover: UploadedFile,
}

impl ReleaseDraft {
    pub fn from_form(mut form: UploadForm) -> ApiResult<Self> {
        let title = form.field("title").map(str::to_string);
        let cover = form.take_file();

        let (Some(title), Some(cover)) = (title, cover) else {
            return Err(ApiError::bad_request("Missing title or cover file."));
        };

        let release_date = form.field("releaseDate").map(str::to_string);
        if let Some(date) = &release_date {
            if !is_valid_release_date(date) {
                return Err(ApiError::bad_request(
                    "Release date must be formatted as YYYY-MM-DD.",
                ));
            }
        }

        Ok(Self {
            title,
            release_type: form.field("releaseType").map(|t| t.to_lowercase()),
            release_date,
            cover,
        })
    }
}

/// Validated Step 2 input
#[derive(Debug)]
pub struct TrackDraft {
    pub title: String,
    pub genre: String,
    pub isrc: Option<String>,
    pub duration_ms: i64,
    pub track_number: i64,
    pub featuring: Vec<String>,
    pub audio: UploadedFile,
}

impl TrackDraft {
    pub fn from_form(mut form: UploadForm) -> ApiResult<Self> {
        let audio = form.take_file();
        let title = form.field("title").map(str::to_string);
        let genre = form.field("genre").map(str::to_string);
        let duration = form.field("duration").map(str::to_string);
        let track_number = form.field("trackNumber").map(str::to_string);

        let (Some(audio), Some(title), Some(genre), Some(duration), Some(track_number)) =
            (audio, title, genre, duration, track_number)
        else {
            return Err(ApiError::bad_request(
                "Missing required track metadata, audio file, or track number.",
            ));
        };

        let duration_secs = duration
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && (0.0..=MAX_TRACK_SECONDS).contains(d))
            .ok_or_else(|| {
                ApiError::bad_request("Duration must be a number of seconds, at most 24 hours.")
            })?;

        let track_number = track_number
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ApiError::bad_request("Track number must be a positive integer."))?;

        Ok(Self {
            title,
            genre,
            isrc: form.field("isrc").map(|s| s.to_uppercase()),
            duration_ms: seconds_to_ms(duration_secs),
            track_number,
            featuring: parse_featuring(form.field("featuring")),
            audio,
        })
    }
}

/// Comma separated artist ids, deduplicated in order
fn parse_featuring(raw: Option<&str>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.unwrap_or("").split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
