//! Command menu.

use async_trait::async_trait;

use crate::cards;
use crate::context::DialogContext;
use crate::dialog::{Dialog, DialogOutcome};
use crate::error::Result;

/// `help`: shows the command menu.
pub struct HelpDialog {
    commands: Vec<String>,
}

impl HelpDialog {
    /// A help dialog listing `commands`, in order.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

#[async_trait]
impl Dialog for HelpDialog {
    fn name(&self) -> &str {
        "help"
    }

    async fn begin(&self, ctx: &mut DialogContext<'_>) -> Result<DialogOutcome> {
        ctx.reply(cards::menu(self.commands.iter().map(String::as_str)))
            .await?;
        Ok(DialogOutcome::Handled)
    }
}
