//! Command router and conversational dialogs for the DevOps bot.
//!
//! [`RootDialog`] receives every activity of a conversation. It welcomes new
//! members, resumes the dialog waiting for input, or resolves the message
//! text against a [`CommandRegistry`] and starts the matching [`Dialog`].
//! Dialogs talk to Azure DevOps through [`devops_client::VstsService`] and
//! reply through a [`Channel`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use devops_client::{HttpConnectionFactory, VstsService};
//! use devops_core::TracingTelemetry;
//! use devops_dialogs::{dialogs, ConversationState, MemoryChannel, RootDialog};
//! use devops_models::{Activity, ChannelAccount, ConversationRef};
//!
//! # async fn run() -> devops_dialogs::Result<()> {
//! let service = VstsService::new(Arc::new(HttpConnectionFactory::new()));
//! let registry = Arc::new(dialogs::default_registry(service, None));
//! let root = RootDialog::new(registry, Arc::new(TracingTelemetry), "https://example.com/eula");
//!
//! let channel = MemoryChannel::new();
//! let mut state = ConversationState::default();
//! let activity = Activity::message(
//!     ConversationRef::new("42"),
//!     ChannelAccount::new("user", "Ada"),
//!     ChannelAccount::new("bot", "devops-bot"),
//!     "help",
//! );
//! root.handle(&activity, &channel, &mut state).await?;
//! # Ok(())
//! # }
//! ```

pub mod cards;
pub mod channel;
pub mod context;
pub mod dialog;
pub mod dialogs;
pub mod error;
pub mod registry;
pub mod root;
pub mod state;
pub mod store;

pub use channel::{Channel, MemoryChannel};
pub use context::DialogContext;
pub use dialog::{Dialog, DialogOutcome};
pub use error::{DialogError, Result};
pub use registry::CommandRegistry;
pub use root::{RootDialog, MAX_RESOLUTION_PASSES};
pub use state::{ConversationState, DialogStep, SignIn};
pub use store::ConversationStore;
