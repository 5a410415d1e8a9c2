//! Subscription command parser and handler.
//!
//! Groups toggle the push feature with `!map_notice on` / `!map_notice off`.

use crate::store::SubscriptionStore;
use crate::Result;

/// Command word recognized in group messages.
pub const COMMAND_NAME: &str = "!map_notice";

/// A parsed subscription command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCommand {
    /// Turn push notifications on for the group.
    Enable,
    /// Turn push notifications off for the group.
    Disable,
    /// Recognized command word with a bad argument.
    Invalid,
}

/// Parse a raw message line.
///
/// Returns `None` for anything that is not a `!map_notice` command.
pub fn parse(raw: &str) -> Option<NoticeCommand> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix(COMMAND_NAME)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some(match rest.trim() {
        "on" => NoticeCommand::Enable,
        "off" => NoticeCommand::Disable,
        _ => NoticeCommand::Invalid,
    })
}

/// Apply a parsed command for a group and produce the reply text.
///
/// The caller has already established the group context and the sender's
/// authority; this function trusts both.
pub async fn handle(
    store: &SubscriptionStore,
    group_id: i64,
    command: NoticeCommand,
) -> Result<String> {
    match command {
        NoticeCommand::Enable => {
            store.enable(group_id).await?;
            Ok("已开启新图推送功能".to_string())
        }
        NoticeCommand::Disable => {
            store.disable(group_id).await?;
            Ok("已关闭新图推送功能".to_string())
        }
        NoticeCommand::Invalid => Ok("参数错误，只允许on或off".to_string()),
    }
}
