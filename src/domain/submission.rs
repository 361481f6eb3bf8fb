use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Attachment references may point at a readme or a slide deck already
/// persisted by the upload collaborator; only the reference and its
/// metadata pass through here.
pub const MAX_ATTACHMENT_BYTES: i64 = 10 * 1024 * 1024;
pub const ALLOWED_ATTACHMENT_EXTENSIONS: &[&str] = &["md", "txt", "pdf", "ppt", "pptx"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub team_id: Uuid,
    pub hackathon_id: Uuid,
    pub github_url: Option<String>,
    pub video_url: Option<String>,
    pub live_url: Option<String>,
    pub readme_path: Option<String>,
    pub ppt_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// A submission must always retain at least one content reference.
    pub fn has_content_reference(&self) -> bool {
        self.github_url.is_some()
            || self.video_url.is_some()
            || self.live_url.is_some()
            || self.readme_path.is_some()
            || self.ppt_path.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(url)]
    pub github_url: String,
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub live_url: Option<String>,
    pub readme: Option<AttachmentRef>,
    pub ppt: Option<AttachmentRef>,
}

/// Partial update. `Some(None)`-style clearing is modelled by explicit
/// nulls: a field present in the JSON replaces the stored value, including
/// replacing it with nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubmissionRequest {
    #[serde(default, with = "double_option")]
    pub github_url: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub video_url: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub live_url: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub readme: Option<Option<AttachmentRef>>,
    #[serde(default, with = "double_option")]
    pub ppt: Option<Option<AttachmentRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub path: String,
    pub size_bytes: i64,
}

impl AttachmentRef {
    pub fn extension(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Deserializes an absent field as `None` and a present field (even a JSON
/// null) as `Some(value)`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
