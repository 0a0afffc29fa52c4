use miette::Diagnostic;
use ratebot_core::{CoreError, DISCORD_MESSAGE_LIMIT};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DiscordError {
    #[error("Discord authentication failed")]
    #[diagnostic(
        code(ratebot::discord::auth_failed),
        help("Check that your Discord bot token is valid and has not been regenerated")
    )]
    AuthenticationFailed {
        #[source]
        cause: serenity::Error,
        token_preview: String, // First/last few chars of token for debugging
    },

    #[error("Discord client stopped")]
    #[diagnostic(
        code(ratebot::discord::client_stopped),
        help("The gateway connection ended with an error; restart the bot")
    )]
    ClientStopped {
        #[source]
        cause: serenity::Error,
    },

    #[error("Command registration failed")]
    #[diagnostic(
        code(ratebot::discord::command_registration_failed),
        help("Failed to register slash command '{command_name}'")
    )]
    CommandRegistrationFailed {
        command_name: String,
        #[source]
        cause: serenity::Error,
    },

    #[error("Interaction failed")]
    #[diagnostic(
        code(ratebot::discord::interaction_failed),
        help("Failed to handle Discord interaction '{interaction_name}'")
    )]
    InteractionFailed {
        interaction_name: String,
        user_id: u64,
        #[source]
        cause: serenity::Error,
    },

    #[error("Invalid bot configuration")]
    #[diagnostic(
        code(ratebot::discord::invalid_bot_config),
        help("Bot configuration error: {issues}")
    )]
    InvalidBotConfiguration {
        issues: String,
        missing_fields: Vec<String>,
    },

    #[error("Message too long")]
    #[diagnostic(
        code(ratebot::discord::message_too_long),
        help("Message length ({length} chars) exceeds Discord's limit of {limit} characters")
    )]
    MessageTooLong {
        length: usize,
        limit: usize,
        truncated_preview: String,
        suggestion: MessageSplitSuggestion,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSplitSuggestion {
    SplitIntoMultiple { parts: usize },
    Truncate { safe_length: usize },
}

impl std::fmt::Display for MessageSplitSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SplitIntoMultiple { parts } => {
                write!(f, "Split message into {} parts", parts)
            }
            Self::Truncate { safe_length } => {
                write!(f, "Truncate to {} characters", safe_length)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscordError>;

// Helper functions for creating common errors
impl DiscordError {
    pub fn auth_failed(cause: serenity::Error, token: &str) -> Self {
        // Show first 6 and last 4 characters of token for debugging
        let chars: Vec<char> = token.chars().collect();
        let token_preview = if chars.len() > 10 {
            let head: String = chars[..6].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***".to_string()
        };

        Self::AuthenticationFailed {
            cause,
            token_preview,
        }
    }

    pub fn message_too_long(content: &str) -> Self {
        let length = content.chars().count();

        let suggestion = if length <= DISCORD_MESSAGE_LIMIT * 3 {
            MessageSplitSuggestion::SplitIntoMultiple {
                parts: length.div_ceil(DISCORD_MESSAGE_LIMIT),
            }
        } else {
            MessageSplitSuggestion::Truncate {
                safe_length: DISCORD_MESSAGE_LIMIT - 100,
            }
        };

        let truncated_preview = if length > 100 {
            format!("{}...", content.chars().take(100).collect::<String>())
        } else {
            content.to_string()
        };

        Self::MessageTooLong {
            length,
            limit: DISCORD_MESSAGE_LIMIT,
            truncated_preview,
            suggestion,
        }
    }

    pub fn missing_token() -> Self {
        Self::InvalidBotConfiguration {
            issues: "no bot token configured (set DISCORD_TOKEN)".to_string(),
            missing_fields: vec!["discord.token".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    #[test]
    fn test_auth_error_hides_token() {
        let fake_error = serenity::Error::Other("test");
        let error = DiscordError::auth_failed(
            fake_error,
            "MTE2MzU5NzE0MjQ5NzI1NTQyNA.GqvKfH.verysecrettoken",
        );

        if let DiscordError::AuthenticationFailed { token_preview, .. } = &error {
            assert_eq!(token_preview, "MTE2Mz...oken");
            assert!(!token_preview.contains("secret"));
        } else {
            panic!("expected AuthenticationFailed");
        }
    }

    #[test]
    fn test_short_token_fully_hidden() {
        let error = DiscordError::auth_failed(serenity::Error::Other("test"), "abc");
        assert!(matches!(
            error,
            DiscordError::AuthenticationFailed { ref token_preview, .. } if token_preview == "***"
        ));
    }

    #[test]
    fn test_message_too_long_suggestions() {
        let error = DiscordError::message_too_long(&"a".repeat(3500));
        assert!(matches!(
            error,
            DiscordError::MessageTooLong {
                suggestion: MessageSplitSuggestion::SplitIntoMultiple { parts: 2 },
                ..
            }
        ));

        let error = DiscordError::message_too_long(&"a".repeat(10_000));
        assert!(matches!(
            error,
            DiscordError::MessageTooLong {
                suggestion: MessageSplitSuggestion::Truncate { safe_length: 1900 },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_token_report() {
        let report = Report::new(DiscordError::missing_token());
        let output = format!("{:?}", report);
        assert!(output.contains("invalid_bot_config"));
    }
}
