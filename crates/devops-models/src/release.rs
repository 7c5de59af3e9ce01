//! Release definitions, releases and the release start request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Artifact type of artifacts produced by a build definition.
pub const BUILD_ARTIFACT_TYPE: &str = "Build";

/// Key in `definitionReference` pointing at the linked build definition.
pub const DEFINITION_REFERENCE_KEY: &str = "definition";

/// One entry of an artifact's definition reference map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSourceReference {
    /// Referenced id, always serialized as a string by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Referenced name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An artifact source of a release definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Artifact type ("Build", "Git", ...).
    #[serde(rename = "type")]
    pub artifact_type: String,

    /// Alias the artifact is exposed under in the release.
    pub alias: String,

    /// References describing the artifact source.
    #[serde(default)]
    pub definition_reference: HashMap<String, ArtifactSourceReference>,
}

impl Artifact {
    /// Creates a build artifact linked to the given build definition.
    pub fn build(alias: impl Into<String>, build_definition_id: i32) -> Self {
        let mut definition_reference = HashMap::new();
        definition_reference.insert(
            DEFINITION_REFERENCE_KEY.to_string(),
            ArtifactSourceReference {
                id: Some(build_definition_id.to_string()),
                name: None,
            },
        );
        Self {
            artifact_type: BUILD_ARTIFACT_TYPE.to_string(),
            alias: alias.into(),
            definition_reference,
        }
    }

    /// Whether the artifact comes from a build definition.
    pub fn is_build(&self) -> bool {
        self.artifact_type.eq_ignore_ascii_case(BUILD_ARTIFACT_TYPE)
    }

    /// Raw id of the linked build definition, if present.
    pub fn linked_definition_id(&self) -> Option<&str> {
        self.definition_reference
            .get(DEFINITION_REFERENCE_KEY)
            .and_then(|r| r.id.as_deref())
    }
}

/// A release definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDefinition {
    /// Definition id.
    pub id: i32,

    /// Definition name.
    pub name: String,

    /// Artifact sources.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl ReleaseDefinition {
    /// Creates a definition without artifacts.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            artifacts: Vec::new(),
        }
    }

    /// Adds an artifact.
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }
}

/// A release: one instantiation of a release definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release id.
    pub id: i32,

    /// Release name (e.g. "Release-12").
    pub name: String,

    /// Release status ("active", "draft", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Release {
    /// Creates a release.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: None,
        }
    }
}

/// Build instance chosen for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildVersion {
    /// Build id, as a string.
    pub id: String,

    /// Build number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A resolved `(alias, build)` pair submitted when starting a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    /// Artifact alias.
    pub alias: String,

    /// Chosen build.
    pub instance_reference: BuildVersion,
}

/// Body of a start-release request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStartMetadata {
    /// Release definition to instantiate.
    pub definition_id: i32,

    /// One entry per resolved artifact.
    pub artifacts: Vec<ArtifactMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_deserialize() {
        let json = r#"{
            "type": "Build",
            "alias": "_CI",
            "definitionReference": {
                "definition": {"id": "12", "name": "CI"},
                "project": {"id": "p-1", "name": "Fabrikam"}
            }
        }"#;
        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert!(artifact.is_build());
        assert_eq!(artifact.linked_definition_id(), Some("12"));
    }

    #[test]
    fn test_non_build_artifact() {
        let json = r#"{"type": "Git", "alias": "src"}"#;
        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert!(!artifact.is_build());
        assert!(artifact.linked_definition_id().is_none());
    }

    #[test]
    fn test_start_metadata_shape() {
        let metadata = ReleaseStartMetadata {
            definition_id: 4,
            artifacts: vec![ArtifactMetadata {
                alias: "_CI".into(),
                instance_reference: BuildVersion {
                    id: "99".into(),
                    name: Some("20240101.1".into()),
                },
            }],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["definitionId"], 4);
        assert_eq!(json["artifacts"][0]["alias"], "_CI");
        assert_eq!(json["artifacts"][0]["instanceReference"]["id"], "99");
    }
}
