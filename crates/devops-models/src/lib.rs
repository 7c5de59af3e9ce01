//! Core data models for the DevOps bot.
//!
//! This crate provides the types shared by the remote access layer and the
//! dialogs: the DevOps resources (accounts, projects, build and release
//! definitions, builds, releases, approvals) as the REST API serializes them,
//! and the conversational activities and replies exchanged with a channel.

pub mod account;
pub mod activity;
pub mod approval;
pub mod build;
pub mod release;
pub mod reply;

// Re-export main types
pub use account::{Account, Profile, TeamProject};
pub use activity::{Activity, ActivityType, ChannelAccount, ConversationRef};
pub use approval::{Approval, ApprovalStatus, ApprovalType, IdentityRef, ShallowReference};
pub use build::{Build, BuildDefinition, DefinitionReference, QueueBuildRequest};
pub use release::{
    Artifact, ArtifactMetadata, ArtifactSourceReference, BuildVersion, Release,
    ReleaseDefinition, ReleaseStartMetadata, BUILD_ARTIFACT_TYPE, DEFINITION_REFERENCE_KEY,
};
pub use reply::{Card, CardAction, CardActionKind, Reply};
