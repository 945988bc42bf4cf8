use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use crate::error::{Result, ScanError};

/// Author sub-record of a post. Optional fields collapse JSON `null` and a
/// missing key into `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRecord {
    pub screen_name: Value,
    pub date: Option<Value>,
    pub description: Option<Value>,
    pub geolocation: Option<Value>,
}

impl AuthorRecord {
    pub fn screen_name_str(&self) -> Option<&str> {
        self.screen_name.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub author: AuthorRecord,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    author: Option<RawAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    // Kept apart from `Option<Value>` so that an explicit `null` handle is
    // still "present" and only a missing key fails validation.
    #[serde(default, deserialize_with = "present_value")]
    screen_name: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    geolocation: Option<Value>,
}

fn present_value<'de, D>(d: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(d).map(Some)
}

/// Parse and validate a JSON array of posts. Every post must carry
/// `author.screen_name`; the first post that does not aborts the load.
pub fn load_posts_from_slice(bytes: &[u8]) -> Result<Vec<PostRecord>> {
    let start_time = Instant::now();

    let root: Value = serde_json::from_slice(bytes)?;
    if !root.is_array() {
        return Err(ScanError::NotAnArray {
            found: json_kind(&root),
        });
    }

    let raw: Vec<RawPost> = serde_json::from_value(root)?;
    let posts = raw
        .into_iter()
        .enumerate()
        .map(|(index, post)| validate_post(index, post))
        .collect::<Result<Vec<_>>>()?;

    info!(
        action = "complete",
        component = "dataset",
        post_count = posts.len(),
        byte_count = bytes.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded post dataset"
    );
    Ok(posts)
}

fn validate_post(index: usize, post: RawPost) -> Result<PostRecord> {
    let author = post.author.ok_or(ScanError::MissingField {
        index,
        field: "author",
    })?;
    let screen_name = author.screen_name.ok_or(ScanError::MissingField {
        index,
        field: "author.screen_name",
    })?;

    Ok(PostRecord {
        author: AuthorRecord {
            screen_name,
            date: author.date,
            description: author.description,
            geolocation: author.geolocation,
        },
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
