//! The dialog capability.

use async_trait::async_trait;

use crate::context::DialogContext;
use crate::error::Result;

/// How a dialog finished handling an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Done; the conversation returns to the router.
    Handled,
    /// The dialog wants the next message of this conversation.
    AwaitingInput,
    /// The dialog cannot handle this text; the router resolves it again.
    Unrecognized,
}

/// A conversational handler invoked by command name.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Registry key of this dialog.
    fn name(&self) -> &str;

    /// Starts the dialog for the command that selected it.
    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome>;

    /// Continues the dialog with the next message after `AwaitingInput`.
    async fn resume(&self, _ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        Ok(DialogOutcome::Unrecognized)
    }
}
