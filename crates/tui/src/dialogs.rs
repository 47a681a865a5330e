use async_trait::async_trait;
use dreamtravel_core::pages::Interaction;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::app::AppEvent;

/// Routes page dialogs to the UI loop, which renders them as modals.
#[derive(Clone)]
pub struct TuiDialogs {
    events: mpsc::Sender<AppEvent>,
}

impl TuiDialogs {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl Interaction for TuiDialogs {
    async fn confirm(&self, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = AppEvent::Confirm {
            message: message.to_string(),
            reply,
        };
        if self.events.send(request).await.is_err() {
            debug!("ui closed before confirmation");
            return false;
        }
        answer.await.unwrap_or(false)
    }

    async fn notify(&self, message: &str) {
        if self.events.send(AppEvent::Alert(message.to_string())).await.is_err() {
            debug!(%message, "ui closed before alert");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirmation_waits_for_the_ui_reply() {
        let (tx, mut rx) = mpsc::channel(4);
        let dialogs = TuiDialogs::new(tx);
        let ui = tokio::spawn(async move {
            match rx.recv().await {
                Some(AppEvent::Confirm { message, reply }) => {
                    assert_eq!(message, "Are you sure you want to delete this user?");
                    let _ = reply.send(true);
                }
                _ => panic!("expected a confirmation request"),
            }
            match rx.recv().await {
                Some(AppEvent::Alert(message)) => message,
                _ => panic!("expected an alert"),
            }
        });

        assert!(dialogs.confirm("Are you sure you want to delete this user?").await);
        dialogs.notify("Error deleting user.").await;
        assert_eq!(ui.await.unwrap(), "Error deleting user.");
    }

    #[tokio::test]
    async fn dropped_reply_counts_as_no() {
        let (tx, mut rx) = mpsc::channel(4);
        let dialogs = TuiDialogs::new(tx);
        tokio::spawn(async move {
            let _ = rx.recv().await;
        });
        assert!(!dialogs.confirm("Are you sure you want to log out?").await);
    }
}
