//! Live event stream for one user.

use clap::Args;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use flareboard_client::{ClientConfig, ConnectionState, Credentials, LocalEvent, RealtimeSession};
use flareboard_core::error::AppError;
use flareboard_core::types::id::UserId;

use super::client_error;
use crate::output::{self, OutputFormat};

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Bearer token of the watching user
    #[arg(short, long)]
    pub token: String,

    /// User the token belongs to
    #[arg(short, long)]
    pub user: String,
}

/// Connect and print state changes and events until Ctrl+C.
pub async fn execute(
    args: &WatchArgs,
    config: ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let user_id: UserId = args
        .user
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", args.user)))?;

    let session = RealtimeSession::from_config(config).map_err(client_error)?;
    let mut events = session.subscribe();
    let mut states = session.state_changes();
    session
        .set_credentials(Some(Credentials::new(args.token.clone(), user_id)))
        .await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                report_state(state, format);
            }
            event = events.recv() => match event {
                Ok(event) => report_event(&event, format),
                Err(RecvError::Lagged(skipped)) => {
                    output::print_warning(&format!("Skipped {skipped} event(s)"));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    session.shutdown().await;
    Ok(())
}

fn report_state(state: ConnectionState, format: OutputFormat) {
    match format {
        OutputFormat::Table => output::print_kv("State", &format!("{state:?}")),
        OutputFormat::Json => output::print_json_line(&json!({ "state": format!("{state:?}") })),
    }
}

fn report_event(event: &LocalEvent, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json_line(&event_json(event));
        return;
    }

    match event {
        LocalEvent::NotificationReceived(n) => output::print_kv(
            "Notification",
            &format!("{} {}", n.title.as_deref().unwrap_or(&n.kind), n.id),
        ),
        LocalEvent::TaskUpdated(task) => {
            output::print_kv("Task", &format!("{} [{:?}] {}", task.title, task.status, task.id))
        }
        LocalEvent::ProjectUpdated(project) => {
            output::print_kv("Project", &format!("{} {}", project.name, project.id))
        }
        LocalEvent::SyncFailed { operation, message } => {
            output::print_warning(&format!("{operation} failed: {message}"))
        }
    }
}

fn event_json(event: &LocalEvent) -> serde_json::Value {
    match event {
        LocalEvent::NotificationReceived(n) => json!({ "event": "notification", "data": n }),
        LocalEvent::TaskUpdated(task) => json!({ "event": "task", "data": task }),
        LocalEvent::ProjectUpdated(project) => json!({ "event": "project", "data": project }),
        LocalEvent::SyncFailed { operation, message } => {
            json!({ "event": "sync_failed", "operation": operation, "message": message })
        }
    }
}
