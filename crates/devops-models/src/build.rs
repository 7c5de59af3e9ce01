//! Build definitions and builds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference to a definition by id (and optionally name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionReference {
    /// Definition id.
    pub id: i32,

    /// Definition name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DefinitionReference {
    /// Creates a reference to the definition with the given id.
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }
}

/// A build definition (the template a build is queued from).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinition {
    /// Definition id.
    pub id: i32,

    /// Definition name.
    pub name: String,

    /// Folder path of the definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// REST URL of the definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BuildDefinition {
    /// Creates a build definition.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path: None,
            url: None,
        }
    }
}

/// A build: one execution of a build definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Build id.
    pub id: i32,

    /// Human readable build number (e.g. "20240101.3").
    #[serde(default)]
    pub build_number: String,

    /// Build status (e.g. "notStarted", "inProgress", "completed").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Build result once completed (e.g. "succeeded").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// When the build was last changed.
    pub last_changed_date: DateTime<Utc>,

    /// The definition this build ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionReference>,
}

impl Build {
    /// Creates a build with the given id, number and last-changed time.
    pub fn new(id: i32, build_number: impl Into<String>, last_changed_date: DateTime<Utc>) -> Self {
        Self {
            id,
            build_number: build_number.into(),
            status: None,
            result: None,
            last_changed_date,
            definition: None,
        }
    }

    /// Returns the build with the most recent `last_changed_date`, if any.
    pub fn latest(builds: &[Build]) -> Option<&Build> {
        builds.iter().max_by_key(|b| b.last_changed_date)
    }
}

/// Body of a queue-build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBuildRequest {
    /// Definition to queue.
    pub definition: DefinitionReference,
}

impl QueueBuildRequest {
    /// Creates a request to queue the given definition.
    pub fn new(definition_id: i32) -> Self {
        Self {
            definition: DefinitionReference::new(definition_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_latest_picks_most_recent() {
        let builds = vec![
            Build::new(1, "1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Build::new(2, "2", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            Build::new(3, "3", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        ];
        assert_eq!(Build::latest(&builds).map(|b| b.id), Some(2));
    }

    #[test]
    fn test_latest_empty() {
        assert!(Build::latest(&[]).is_none());
    }

    #[test]
    fn test_queue_request_shape() {
        let json = serde_json::to_value(QueueBuildRequest::new(42)).unwrap();
        assert_eq!(json["definition"]["id"], 42);
        assert!(json["definition"].get("name").is_none());
    }

    #[test]
    fn test_build_deserialize() {
        let json = r#"{
            "id": 7,
            "buildNumber": "20240101.1",
            "status": "completed",
            "result": "succeeded",
            "lastChangedDate": "2024-01-01T10:00:00Z",
            "definition": {"id": 3, "name": "CI"}
        }"#;
        let build: Build = serde_json::from_str(json).unwrap();
        assert_eq!(build.id, 7);
        assert_eq!(build.definition.unwrap().id, 3);
    }
}
