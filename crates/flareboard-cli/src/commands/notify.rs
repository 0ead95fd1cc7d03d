//! Notification management over the REST surface.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use flareboard_client::{HttpNotificationApi, NotificationApi};
use flareboard_client::ClientConfig;
use flareboard_core::error::AppError;
use flareboard_core::types::id::{NotificationId, UserId};
use flareboard_entity::notification::{NewNotification, Notification};

use super::client_error;
use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Bearer token of the acting user
    #[arg(short, long)]
    pub token: String,

    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotifyCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotifyCommand {
    /// List your notifications, newest first
    List {
        /// Only unread ones
        #[arg(short, long)]
        unread: bool,
    },
    /// Show your unread count
    Unread,
    /// Create a notification for a user
    Send {
        /// Recipient user id
        #[arg(short, long)]
        user: String,
        /// Notification type, e.g. `task_assigned`
        #[arg(short = 'k', long = "type")]
        kind: String,
        /// Title
        #[arg(long)]
        title: String,
        /// Message body
        #[arg(short, long)]
        message: String,
        /// Link opened when the notification is clicked
        #[arg(short, long)]
        action_url: Option<String>,
    },
    /// Mark one notification read
    Read {
        /// Notification id
        id: String,
    },
    /// Mark every notification read
    ReadAll,
    /// Delete one notification
    Delete {
        /// Notification id
        id: String,
    },
    /// Delete every read notification
    ClearRead,
}

/// Notification row for table output
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// Notification ID
    id: String,
    /// Type
    #[tabled(rename = "type")]
    kind: String,
    /// Title
    title: String,
    /// Message
    message: String,
    /// Read flag
    read: bool,
    /// Created at
    created_at: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind.clone(),
            title: n.title.clone().unwrap_or_default(),
            message: n.message.clone().unwrap_or_else(|| n.content.clone()),
            read: n.is_read,
            created_at: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn parse_notification_id(raw: &str) -> Result<NotificationId, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid notification id: {raw}")))
}

/// Execute notification commands
pub async fn execute(
    args: &NotifyArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let api = HttpNotificationApi::new(config).map_err(client_error)?;
    let token = args.token.as_str();

    match &args.command {
        NotifyCommand::List { unread } => {
            let rows = api.list(token, *unread).await.map_err(client_error)?;
            let rows: Vec<NotificationRow> = rows.iter().map(NotificationRow::from).collect();
            output::print_list(&rows, format);
        }
        NotifyCommand::Unread => {
            let count = api.unread_count(token).await.map_err(client_error)?;
            match format {
                OutputFormat::Table => output::print_kv("Unread", &count.to_string()),
                OutputFormat::Json => output::print_json_line(&serde_json::json!({ "count": count })),
            }
        }
        NotifyCommand::Send {
            user,
            kind,
            title,
            message,
            action_url,
        } => {
            let user_id: UserId = user
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid user id: {user}")))?;
            let mut input = NewNotification::new(user_id, kind.as_str())
                .with_title(title.as_str())
                .with_message(message.as_str());
            if let Some(url) = action_url {
                input = input.with_action_url(url.as_str());
            }
            input.check()?;

            let created = api.create(token, &input).await.map_err(client_error)?;
            output::print_success(&format!("Notification {} sent to {}", created.id, user_id));
        }
        NotifyCommand::Read { id } => {
            let id = parse_notification_id(id)?;
            api.mark_read(token, id).await.map_err(client_error)?;
            output::print_success(&format!("Notification {id} marked read"));
        }
        NotifyCommand::ReadAll => {
            let affected = api.mark_all_read(token).await.map_err(client_error)?;
            if affected == 0 {
                output::print_warning("Nothing was unread");
            } else {
                output::print_success(&format!("{affected} notification(s) marked read"));
            }
        }
        NotifyCommand::Delete { id } => {
            let id = parse_notification_id(id)?;
            api.delete(token, id).await.map_err(client_error)?;
            output::print_success(&format!("Notification {id} deleted"));
        }
        NotifyCommand::ClearRead => {
            let affected = api.clear_read(token).await.map_err(client_error)?;
            output::print_success(&format!("{affected} read notification(s) deleted"));
        }
    }

    Ok(())
}
