//! Canned replies.

use devops_models::{Card, CardAction, ChannelAccount, Reply};

/// Welcome message for a member who just joined.
pub fn welcome(member: &ChannelAccount, eula_url: &str) -> Reply {
    let name = if member.name.trim().is_empty() {
        "there"
    } else {
        member.name.trim()
    };
    Reply::text(format!(
        "Welcome {}! I can show your builds, start releases and handle approvals \
         on Azure DevOps. Type \"help\" to see what I can do.\n\n\
         By using this bot you agree to the license terms: {}",
        name, eula_url
    ))
}

/// Menu card listing the available commands.
pub fn menu<'a>(commands: impl IntoIterator<Item = &'a str>) -> Reply {
    let card = commands.into_iter().fold(
        Card::new("What can I do for you?").text("Pick a command or type its name."),
        |card, command| card.action(CardAction::im_back(command, command)),
    );
    card.into()
}
