//! State shared by the Telegram handlers and the callback server.

use std::sync::Arc;

use devops_client::{ConnectionFactory, OAuthClient, VstsService};
use devops_core::{BotConfig, TelemetrySink};
use devops_dialogs::{dialogs, Channel, ConversationStore, DialogError, RootDialog};
use devops_models::{Activity, ChannelAccount};
use tracing::{debug, warn};

/// Everything a turn needs.
pub struct BotState {
    pub root: RootDialog,
    pub store: ConversationStore,
    pub service: VstsService,
    pub oauth: Option<OAuthClient>,
    /// The bot's own account, the recipient of every activity.
    pub me: ChannelAccount,
}

impl BotState {
    /// Wires the router, dialogs and facade together.
    pub fn new(
        config: &BotConfig,
        me: ChannelAccount,
        factory: Arc<dyn ConnectionFactory>,
        telemetry: Arc<dyn TelemetrySink>,
        store: ConversationStore,
    ) -> Self {
        let service = VstsService::new(factory);
        let oauth = config.oauth.clone().map(OAuthClient::new);
        let registry = Arc::new(dialogs::default_registry(service.clone(), oauth.clone()));
        let root = RootDialog::new(registry, telemetry, config.eula_url.clone());

        Self {
            root,
            store,
            service,
            oauth,
            me,
        }
    }

    /// Runs one turn: loads the conversation state, routes the activity and
    /// stores the state again, also when a dialog failed. Rejected activities
    /// leave the store untouched.
    pub async fn handle_activity(
        &self,
        activity: &Activity,
        channel: &dyn Channel,
    ) -> devops_dialogs::Result<()> {
        let conversation_id = activity.conversation.id.as_str();
        let mut state = self.store.get(conversation_id).await;

        let result = self.root.handle(activity, channel, &mut state).await;
        if let Err(DialogError::InvalidArgument(_)) = result {
            return result;
        }

        if let Err(e) = self.store.put(conversation_id, state).await {
            warn!(conversation_id, error = %e, "Failed to save conversation state");
        }
        debug!(conversation_id, ok = result.is_ok(), "Turn finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devops_client::{ClientError, MockConnectionFactory};
    use devops_core::NoopTelemetry;
    use devops_dialogs::{ConversationState, DialogStep, MemoryChannel, SignIn};
    use devops_models::{ApprovalStatus, ConversationRef, Profile};

    fn config() -> BotConfig {
        BotConfig::from_lookup(|name| (name == "TELEGRAM_BOT_TOKEN").then(|| "t".to_string()))
            .unwrap()
    }

    fn state(factory: MockConnectionFactory) -> BotState {
        BotState::new(
            &config(),
            ChannelAccount::new("99", "devops_bot"),
            Arc::new(factory),
            Arc::new(NoopTelemetry),
            ConversationStore::in_memory(),
        )
    }

    #[tokio::test]
    async fn test_turn_saves_dialog_state() {
        let bot = state(MockConnectionFactory::default());
        let channel = MemoryChannel::new();
        let activity = Activity::message(
            ConversationRef::new("42"),
            ChannelAccount::new("7", "Ada"),
            bot.me.clone(),
            "help",
        );

        bot.handle_activity(&activity, &channel).await.unwrap();

        assert_eq!(channel.replies_to("42").len(), 1);
        assert_eq!(bot.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_turn_still_saves_state() {
        let factory = MockConnectionFactory::default();
        let bot = state(factory.clone());
        let channel = MemoryChannel::new();
        let conversation = ConversationState {
            sign_in: Some(SignIn::new("tok", Profile::new("me", "Me"))),
            account: Some("contoso".into()),
            team_project: Some("Fabrikam".into()),
            ..Default::default()
        };
        bot.store.put("42", conversation).await.unwrap();
        factory.fail_next(ClientError::Http("connection reset".into()));

        let activity = Activity::message(
            ConversationRef::new("42"),
            ChannelAccount::new("7", "Ada"),
            bot.me.clone(),
            "builds",
        );
        let err = bot.handle_activity(&activity, &channel).await.unwrap_err();

        assert!(matches!(err, DialogError::Client(_)));
        assert_eq!(bot.store.get("42").await.account.as_deref(), Some("contoso"));
        assert!(bot.oauth.is_none());
    }

    #[tokio::test]
    async fn test_help_works_after_failed_approval() {
        let bot = state(MockConnectionFactory::default());
        let channel = MemoryChannel::new();
        let conversation = ConversationState {
            sign_in: Some(SignIn::new("tok", Profile::new("me", "Me"))),
            account: Some("contoso".into()),
            team_project: Some("Fabrikam".into()),
            active_dialog: Some("approvals".into()),
            step: Some(DialogStep::ApprovalComment {
                approval_id: 5,
                status: ApprovalStatus::Rejected,
            }),
            ..Default::default()
        };
        bot.store.put("42", conversation).await.unwrap();
        let say = |text: &str| {
            Activity::message(
                ConversationRef::new("42"),
                ChannelAccount::new("7", "Ada"),
                bot.me.clone(),
                text,
            )
        };

        let err = bot.handle_activity(&say("wrong build"), &channel).await.unwrap_err();
        assert!(matches!(err, DialogError::Client(ref e) if e.is_not_found()));
        assert!(bot.store.get("42").await.active_dialog.is_none());

        bot.handle_activity(&say("help"), &channel).await.unwrap();
        let menu = channel.replies_to("42").pop().unwrap();
        assert_eq!(menu.as_card().unwrap().title, "What can I do for you?");
    }
}
