//! Parent messaging: administration replies and parent notifications.

use ecole_core::types::now_rfc3339;
use ecole_core::{
    Message, MessageStatus, MessageType, NotificationType, ParentNotification, Priority, RecordId,
    Role, User,
};
use ecole_store::RecordStore;

use crate::db::SchoolDb;
use crate::error::Result;

/// Sender name on administration replies.
pub const ADMIN_SENDER_NAME: &str = "Administration École Numérique";

/// Sender address on administration replies.
pub const ADMIN_SENDER_EMAIL: &str = "admin@ecole-numerique.ci";

/// The records written by a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentReply {
    pub message: Message,
    pub notification: ParentNotification,
}

impl<S: RecordStore + ?Sized> SchoolDb<S> {
    /// Reply to a parent's message.
    ///
    /// The parent is the user with the `parent` role whose email matches the
    /// original sender. Stores the reply and a notification for the parent.
    /// Returns `None`, writing nothing, when the message or the parent cannot
    /// be found.
    pub async fn send_reply_to_parent(
        &self,
        original_message_id: &RecordId,
        reply_text: &str,
    ) -> Result<Option<ParentReply>> {
        let Some(original) = self.get::<Message>(original_message_id).await? else {
            tracing::debug!(id = %original_message_id, "reply to unknown message ignored");
            return Ok(None);
        };
        let Some(sender_email) = original.sender_email.as_deref() else {
            return Ok(None);
        };

        let users = self.list::<User>().await?;
        let Some(parent) = users
            .iter()
            .find(|u| u.role == Role::Parent && u.email.as_deref() == Some(sender_email))
        else {
            tracing::debug!(id = %original_message_id, "no parent account for message sender");
            return Ok(None);
        };

        let message = Message {
            id: RecordId::generate_with_suffix("_reply"),
            sender_name: ADMIN_SENDER_NAME.to_string(),
            sender_email: Some(ADMIN_SENDER_EMAIL.to_string()),
            sender_phone: None,
            subject: format!("Re: {}", original.subject),
            message: reply_text.to_string(),
            message_type: MessageType::General,
            status: MessageStatus::Unread,
            created_at: now_rfc3339(),
            priority: Priority::Medium,
            recipient_id: Some(parent.id.clone()),
            parent_message_id: Some(original.id.clone()),
            is_from_admin: true,
        };
        self.add(&message).await?;

        let notification = ParentNotification {
            id: RecordId::generate_with_suffix("_notif"),
            parent_id: parent.id.clone(),
            message_id: Some(message.id.clone()),
            title: "Nouvelle réponse de l'administration".to_string(),
            content: format!(
                "Vous avez reçu une réponse à votre message \"{}\".",
                original.subject
            ),
            notification_type: NotificationType::MessageReply,
            is_read: false,
            created_at: now_rfc3339(),
        };
        self.add(&notification).await?;

        tracing::info!(parent = %parent.id, message = %message.id, "reply sent to parent");
        Ok(Some(ParentReply {
            message,
            notification,
        }))
    }

    /// Messages addressed to a parent or sent from the parent's email.
    pub async fn messages_for_parent(&self, parent_id: &RecordId) -> Result<Vec<Message>> {
        let parent_email = self
            .get::<User>(parent_id)
            .await?
            .and_then(|u| u.email);
        let messages = self.list::<Message>().await?;

        Ok(messages
            .into_iter()
            .filter(|m| {
                m.recipient_id.as_ref() == Some(parent_id)
                    || (m.sender_email.is_some() && m.sender_email == parent_email)
            })
            .collect())
    }

    /// Notifications addressed to a parent.
    pub async fn notifications_for_parent(
        &self,
        parent_id: &RecordId,
    ) -> Result<Vec<ParentNotification>> {
        let notifications = self.list::<ParentNotification>().await?;
        Ok(notifications
            .into_iter()
            .filter(|n| &n.parent_id == parent_id)
            .collect())
    }
}
