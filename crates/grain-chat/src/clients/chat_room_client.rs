use crate::chat_room::{ChatRoom, ChatRoomCall, ChatRoomError, ChatRoomReply};
use crate::model::ChatMessage;
use async_trait::async_trait;
use grain_framework::{GrainClient, GrainRef, InvocationError};
use tracing::instrument;

/// Client for one channel's ChatRoom grain.
#[derive(Clone)]
pub struct ChatRoomClient {
    inner: GrainRef<ChatRoom>,
}

impl ChatRoomClient {
    pub fn new(inner: GrainRef<ChatRoom>) -> Self {
        Self { inner }
    }

    pub fn channel(&self) -> &str {
        self.inner.id()
    }
}

#[async_trait]
impl GrainClient<ChatRoom> for ChatRoomClient {
    type Error = ChatRoomError;

    fn grain(&self) -> &GrainRef<ChatRoom> {
        &self.inner
    }

    fn map_error(e: InvocationError) -> Self::Error {
        ChatRoomError::from_invocation(e)
    }
}

fn expect_done(reply: ChatRoomReply) -> Result<(), ChatRoomError> {
    match reply {
        ChatRoomReply::Done => Ok(()),
        other => Err(ChatRoomError::UnexpectedReply(format!("{:?}", other))),
    }
}

impl ChatRoomClient {
    #[instrument(skip(self), fields(channel = %self.channel()))]
    pub async fn join(&self, participant: &str) -> Result<(), ChatRoomError> {
        expect_done(self.call(ChatRoomCall::Join(participant.to_string())).await?)
    }

    #[instrument(skip(self), fields(channel = %self.channel()))]
    pub async fn leave(&self, participant: &str) -> Result<(), ChatRoomError> {
        expect_done(self.call(ChatRoomCall::Leave(participant.to_string())).await?)
    }

    #[instrument(skip(self, message), fields(channel = %self.channel(), author = %message.author))]
    pub async fn message(&self, message: ChatMessage) -> Result<(), ChatRoomError> {
        expect_done(self.call(ChatRoomCall::Message(message)).await?)
    }

    #[instrument(skip(self), fields(channel = %self.channel()))]
    pub async fn read_history(&self, max_count: i64) -> Result<Vec<ChatMessage>, ChatRoomError> {
        match self.call(ChatRoomCall::ReadHistory(max_count)).await? {
            ChatRoomReply::History(history) => Ok(history),
            other => Err(ChatRoomError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    #[instrument(skip(self), fields(channel = %self.channel()))]
    pub async fn members(&self) -> Result<Vec<String>, ChatRoomError> {
        match self.call(ChatRoomCall::Members).await? {
            ChatRoomReply::Members(members) => Ok(members),
            other => Err(ChatRoomError::UnexpectedReply(format!("{:?}", other))),
        }
    }
}
