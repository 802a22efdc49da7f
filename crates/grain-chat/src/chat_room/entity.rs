//! [`Grain`] implementation for [`ChatRoom`].
//!
//! The state transitions live in plain methods so they can be tested without a silo;
//! `handle` only validates, dispatches and publishes the resulting [`ChatEvent`].

use super::calls::{ChatRoomCall, ChatRoomReply};
use super::context::ChatRoomContext;
use super::error::ChatRoomError;
use super::CHAT_NAMESPACE;
use crate::model::{ChatEvent, ChatMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grain_framework::Grain;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// State of one channel.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    channel: String,
    members: BTreeSet<String>,
    history: Vec<ChatMessage>,
}

impl ChatRoom {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            members: BTreeSet::new(),
            history: Vec::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn members(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }

    /// Adds `participant`. Returns `false` if it was already a member.
    pub fn join(&mut self, participant: &str) -> Result<bool, ChatRoomError> {
        if participant.trim().is_empty() {
            return Err(ChatRoomError::InvalidArgument(
                "participant must not be empty".to_string(),
            ));
        }
        Ok(self.members.insert(participant.to_string()))
    }

    /// Removes `participant`. Returns `false` if it was not a member.
    pub fn leave(&mut self, participant: &str) -> bool {
        self.members.remove(participant)
    }

    /// Appends `message`, stamped with `now` or with the previous stamp if the clock went back.
    pub fn post(
        &mut self,
        mut message: ChatMessage,
        now: DateTime<Utc>,
    ) -> Result<ChatMessage, ChatRoomError> {
        if message.author.trim().is_empty() {
            return Err(ChatRoomError::InvalidArgument(
                "author must not be empty".to_string(),
            ));
        }
        message.created_at = match self.history.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        self.history.push(message.clone());
        Ok(message)
    }

    /// The last `min(max_count, len)` messages, oldest first.
    pub fn read_history(&self, max_count: i64) -> Vec<ChatMessage> {
        if max_count <= 0 {
            return Vec::new();
        }
        let count = usize::try_from(max_count)
            .unwrap_or(usize::MAX)
            .min(self.history.len());
        self.history[self.history.len() - count..].to_vec()
    }

    fn publish(&self, ctx: &ChatRoomContext, event: ChatEvent) {
        let delivered = ctx.streams.publish(CHAT_NAMESPACE, &self.channel, event);
        debug!(channel = %self.channel, delivered, "Published chat event");
    }
}

#[async_trait]
impl Grain for ChatRoom {
    const GRAIN_TYPE: &'static str = "ChatRoom";
    type Id = String;
    type Call = ChatRoomCall;
    type Reply = ChatRoomReply;
    type Context = ChatRoomContext;
    type Error = ChatRoomError;

    fn activate(channel: &String) -> Self {
        Self::new(channel.clone())
    }

    async fn on_activate(&mut self, _ctx: &ChatRoomContext) -> Result<(), ChatRoomError> {
        info!(channel = %self.channel, "Chat room opened");
        Ok(())
    }

    async fn on_deactivate(&mut self, _ctx: &ChatRoomContext) -> Result<(), ChatRoomError> {
        info!(
            channel = %self.channel,
            members = self.members.len(),
            messages = self.history.len(),
            "Chat room closed"
        );
        Ok(())
    }

    async fn handle(
        &mut self,
        call: ChatRoomCall,
        ctx: &ChatRoomContext,
    ) -> Result<ChatRoomReply, ChatRoomError> {
        match call {
            ChatRoomCall::Join(participant) => {
                if self.join(&participant)? {
                    info!(channel = %self.channel, %participant, "Joined");
                    self.publish(ctx, ChatEvent::Joined(participant));
                }
                Ok(ChatRoomReply::Done)
            }
            ChatRoomCall::Leave(participant) => {
                if self.leave(&participant) {
                    info!(channel = %self.channel, %participant, "Left");
                    self.publish(ctx, ChatEvent::Left(participant));
                }
                Ok(ChatRoomReply::Done)
            }
            ChatRoomCall::Message(message) => {
                let accepted = self.post(message, ctx.clock.now())?;
                debug!(channel = %self.channel, author = %accepted.author, "Message accepted");
                self.publish(ctx, ChatEvent::Posted(accepted));
                Ok(ChatRoomReply::Done)
            }
            ChatRoomCall::ReadHistory(max_count) => {
                Ok(ChatRoomReply::History(self.read_history(max_count)))
            }
            ChatRoomCall::Members => Ok(ChatRoomReply::Members(self.members())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use grain_framework::StreamProvider;
    use std::sync::Arc;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
    }

    #[test]
    fn join_is_idempotent_and_leaves_history_alone() {
        let mut room = ChatRoom::new("general");
        assert_eq!(room.join("Alexey"), Ok(true));
        assert_eq!(room.join("Alexey"), Ok(false));
        assert_eq!(room.members(), vec!["Alexey".to_string()]);
        assert!(room.read_history(10).is_empty());
    }

    #[test]
    fn empty_participant_is_rejected_without_change() {
        let mut room = ChatRoom::new("general");
        assert!(matches!(
            room.join("  "),
            Err(ChatRoomError::InvalidArgument(_))
        ));
        assert!(room.members().is_empty());
    }

    #[test]
    fn leave_of_a_stranger_is_a_no_op() {
        let mut room = ChatRoom::new("general");
        room.join("Alexey").unwrap();
        assert!(!room.leave("Boris"));
        assert!(room.leave("Alexey"));
        assert!(!room.leave("Alexey"));
        assert!(room.members().is_empty());
    }

    #[test]
    fn history_returns_the_most_recent_suffix_oldest_first() {
        let mut room = ChatRoom::new("general");
        for (i, text) in ["a", "b", "c", "d"].iter().enumerate() {
            room.post(ChatMessage::new("Alexey", *text), at(i as u32)).unwrap();
        }

        let texts = |k| {
            room.read_history(k)
                .into_iter()
                .map(|m| m.text)
                .collect::<Vec<_>>()
        };
        assert_eq!(texts(2), vec!["c", "d"]);
        assert_eq!(texts(1000), vec!["a", "b", "c", "d"]);
        assert!(texts(0).is_empty());
        assert!(texts(-5).is_empty());
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let mut room = ChatRoom::new("general");
        let first = room.post(ChatMessage::new("Alexey", "one"), at(30)).unwrap();
        let second = room.post(ChatMessage::new("Boris", "two"), at(10)).unwrap();
        let third = room.post(ChatMessage::new("Alexey", "three"), at(45)).unwrap();

        assert_eq!(first.created_at, at(30));
        assert_eq!(second.created_at, at(30));
        assert_eq!(third.created_at, at(45));
    }

    #[test]
    fn posting_does_not_require_membership_but_needs_an_author() {
        let mut room = ChatRoom::new("general");
        assert!(room.post(ChatMessage::new("Stranger", ""), at(0)).is_ok());
        assert!(matches!(
            room.post(ChatMessage::new("", "hi"), at(1)),
            Err(ChatRoomError::InvalidArgument(_))
        ));
        assert_eq!(room.read_history(10).len(), 1);
    }

    #[tokio::test]
    async fn handle_publishes_events_for_changes_only() {
        let streams = StreamProvider::default();
        let clock = Arc::new(ManualClock::new(at(0)));
        let ctx = ChatRoomContext::new(streams.clone()).with_clock(clock.clone());
        let mut events = streams.subscribe::<ChatEvent>(CHAT_NAMESPACE, "general");
        let mut room = ChatRoom::activate(&"general".to_string());

        room.handle(ChatRoomCall::Join("Alexey".into()), &ctx)
            .await
            .unwrap();
        room.handle(ChatRoomCall::Join("Alexey".into()), &ctx)
            .await
            .unwrap();
        room.handle(ChatRoomCall::Message(ChatMessage::new("Alexey", "hi")), &ctx)
            .await
            .unwrap();
        room.handle(ChatRoomCall::Leave("Nobody".into()), &ctx)
            .await
            .unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            ChatEvent::Joined("Alexey".into())
        );
        match events.recv().await.unwrap() {
            ChatEvent::Posted(message) => {
                assert_eq!(message.text, "hi");
                assert_eq!(message.created_at, at(0));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(events.try_recv().is_err());
    }
}
