use serde::{Deserialize, Serialize};

use super::lenient::{self, LegacyKeys};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Image,
    Document,
}

impl MediaType {
    /// Guess from a MIME type such as `image/png` or `video/mp4`.
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaType::Video
        } else if mime.starts_with("image/") {
            MediaType::Image
        } else {
            MediaType::Document
        }
    }

    /// Cloudinary resource type used for uploads.
    pub fn resource_type(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Image => "image",
            MediaType::Document => "raw",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MediaType::Video => "video",
                MediaType::Image => "image",
                MediaType::Document => "document",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Session,
    Assessment,
    Profile,
    #[default]
    Other,
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MediaCategory::Session => "session",
                MediaCategory::Assessment => "assessment",
                MediaCategory::Profile => "profile",
                MediaCategory::Other => "other",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploaderRole {
    #[default]
    Admin,
    Volunteer,
}

#[derive(Debug, Clone, Serialize)]
pub struct Media {
    pub url: String,
    pub media_type: MediaType,
    pub category: MediaCategory,
    pub uploaded_by: UploaderRole,
    pub boy_id: Option<String>,
    pub volunteer_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `true` when `url` points at our cloud storage rather than an external link.
    pub hosted: bool,
}

pub const LEGACY_KEYS: LegacyKeys = &[("boyId", "boy_id"), ("volunteerId", "volunteer_id")];

#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    /// Base64 data URI to upload.
    #[serde(default, deserialize_with = "lenient::text")]
    pub file: Option<String>,
    /// External link (e.g. a hosted video); stored as-is.
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    pub media_type: Option<MediaType>,
    pub category: Option<MediaCategory>,
    pub uploaded_by: Option<UploaderRole>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub boy_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub volunteer_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub boy_id: Option<String>,
    pub volunteer_id: Option<String>,
    pub category: Option<MediaCategory>,
    pub media_type: Option<MediaType>,
}
