use async_trait::async_trait;
use serenity::{builder::CreateMessage, http::Http, model::id::ChannelId};
use std::sync::Arc;

use crate::{
    error::{ReactorError, ReactorResult},
    events::notifier::{EmbedSpec, MessageRef, Messenger},
    ui::embeds::render_embed,
};

/// Entrega de embeds por la API HTTP de Discord
pub struct SerenityMessenger {
    http: Arc<Http>,
}

impl SerenityMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Messenger for SerenityMessenger {
    async fn send_embed(
        &self,
        channel_id: ChannelId,
        embed: EmbedSpec,
    ) -> ReactorResult<MessageRef> {
        let message = channel_id
            .send_message(&*self.http, CreateMessage::new().embed(render_embed(&embed)))
            .await
            .map_err(|e| ReactorError::Delivery(e.to_string()))?;

        Ok(MessageRef {
            channel_id: message.channel_id,
            message_id: message.id,
        })
    }

    async fn delete_message(&self, message: MessageRef) -> ReactorResult<()> {
        message
            .channel_id
            .delete_message(&*self.http, message.message_id)
            .await
            .map_err(|e| ReactorError::Delivery(e.to_string()))
    }
}
