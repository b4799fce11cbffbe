//! Node execution: rate limiting, subcommand dispatch and usage matching.

use std::sync::Arc;
use std::time::Duration;

use super::{CommandError, CommandResult};
use crate::command::domain::{CommandNode, NodeKind};
use crate::interaction::{
    domain::MessageHandle, ports::ChatTransport, services::CommandContext,
};

impl CommandNode {
    /// Executes the node against the tokens that follow its name.
    ///
    /// Each node on the path charges its own rate limit before it does
    /// anything else. Branches hand the next token to the matching
    /// subcommand; leaves match their usage and run their action. Returns
    /// `Ok(true)` only when an action ran. Throttles and usage mismatches are
    /// answered in the invocation channel and return `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when sending a reply fails or the action
    /// fails.
    pub async fn execute(&self, remaining: &str, context: &CommandContext) -> CommandResult<bool> {
        let tokens: Vec<&str> = remaining.split_whitespace().collect();
        let mut node = self;
        let mut rest = tokens.as_slice();
        loop {
            if !charge_rate_limit(node, context).await? {
                return Ok(false);
            }
            match node.kind() {
                NodeKind::Branch { .. } => {
                    let child = rest
                        .split_first()
                        .and_then(|(head, tail)| node.find_child(head).map(|child| (child, tail)));
                    let Some((child, tail)) = child else {
                        tracing::debug!(
                            command = %node.full_name(),
                            token = rest.first().copied().unwrap_or_default(),
                            "no matching subcommand"
                        );
                        context
                            .say(&branch_usage_message(node, context.config().prefix()))
                            .await?;
                        return Ok(false);
                    };
                    node = child;
                    rest = tail;
                }
                NodeKind::Leaf { usage, action } => {
                    let values = match usage.match_tokens(rest) {
                        Ok(values) => values,
                        Err(mismatch) => {
                            tracing::debug!(
                                command = %node.full_name(),
                                %mismatch,
                                "usage did not match"
                            );
                            context
                                .say(&leaf_usage_message(node, context.config().prefix()))
                                .await?;
                            return Ok(false);
                        }
                    };
                    action
                        .run(context, values)
                        .await
                        .map_err(|source| CommandError::Action {
                            command: node.full_name(),
                            source,
                        })?;
                    return Ok(true);
                }
            }
        }
    }
}

/// Charges the node's rate limit against the invoker.
///
/// Returns `false` after sending a self-deleting throttle notice when the
/// invoker is over budget.
async fn charge_rate_limit(node: &CommandNode, context: &CommandContext) -> CommandResult<bool> {
    let Some(rate_limit) = node.rate_limit() else {
        return Ok(true);
    };
    let key = context.author().as_str();
    let now_ms = context.invoked_at_ms();
    let controller = rate_limit.controller();
    if controller.hit(key, now_ms) {
        return Ok(true);
    }

    let remaining_ms = controller.ms_remaining(key, now_ms);
    tracing::warn!(
        command = %node.full_name(),
        user = %context.author(),
        remaining_ms,
        "command throttled"
    );
    let notice = rate_limit
        .render_notice(remaining_ms)
        .map_err(|error| CommandError::Notice {
            command: node.full_name(),
            reason: error.to_string(),
        })?;
    let sent = context.say(&notice).await?;
    delete_later(
        Arc::clone(context.transport()),
        sent,
        context.config().throttle_notice_ttl(),
    );
    Ok(false)
}

fn delete_later(transport: Arc<dyn ChatTransport>, message: MessageHandle, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(error) = transport.delete_message(&message).await {
            tracing::warn!(message = %message.id(), %error, "failed to delete throttle notice");
        }
    });
}

/// Lists the subcommands of a branch, for example
/// ``The correct usage is `!git (add/commit/push)` ``.
#[must_use]
pub fn branch_usage_message(node: &CommandNode, prefix: &str) -> String {
    format!(
        "The correct usage is `{prefix}{}`\n\n{}",
        node.usage_string(),
        help_hint(node, prefix)
    )
}

/// Shows the usage and examples of a leaf.
#[must_use]
pub fn leaf_usage_message(node: &CommandNode, prefix: &str) -> String {
    let mut text = format!("The correct usage is `{prefix}{}`\n\n", node.usage_string());
    let examples = &node.help().examples;
    if !examples.is_empty() {
        text.push_str("Examples:\n");
        for example in examples {
            text.push_str(&format!(
                "\t`{prefix}{}` - {}\n",
                example.invocation, example.explanation
            ));
        }
    }
    text.push_str(&help_hint(node, prefix));
    text
}

fn help_hint(node: &CommandNode, prefix: &str) -> String {
    format!("(Use `{prefix}help {}` for more details)", node.full_name())
}
