//! Remote access facade for the Azure DevOps / VSTS REST API.
//!
//! [`VstsService`] exposes the operations the bot needs (profile, accounts,
//! projects, builds, releases, approvals). Each call validates its
//! arguments, opens a fresh [`Connection`] from a [`ConnectionFactory`] for
//! the right [`Endpoint`], and releases it before returning.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use devops_client::{HttpConnectionFactory, VstsService};
//!
//! # async fn run() -> devops_client::Result<()> {
//! let service = VstsService::new(Arc::new(HttpConnectionFactory::new()));
//! let profile = service.get_profile("access-token").await?;
//! let accounts = service.get_accounts(&profile.id, "access-token").await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod mock;
pub mod oauth;
pub mod service;

pub use connection::{Connection, ConnectionFactory};
pub use credential::Credential;
pub use endpoint::{Endpoint, PROFILE_ENDPOINT};
pub use error::{ClientError, Result};
pub use http::{HttpConnection, HttpConnectionFactory};
pub use mock::{MockConnectionFactory, MockData, RemoteCall};
pub use oauth::{OAuthClient, TokenResponse};
pub use service::VstsService;
