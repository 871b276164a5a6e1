//! Handler adapters

use super::traits::CommandHandler;
use super::types::{HandlerFault, HandlerRef, Invocation, OutputMessage};
use async_trait::async_trait;
use std::sync::Arc;

type HandlerFn =
    dyn Fn(&Invocation) -> Result<Vec<OutputMessage>, HandlerFault> + Send + Sync + 'static;

/// 동기 클로저를 `CommandHandler`로 감싸는 어댑터
pub struct FnHandler {
    f: Box<HandlerFn>,
}

impl FnHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Invocation) -> Result<Vec<OutputMessage>, HandlerFault> + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// `Arc`로 바로 감싸기
    pub fn shared<F>(f: F) -> HandlerRef
    where
        F: Fn(&Invocation) -> Result<Vec<OutputMessage>, HandlerFault> + Send + Sync + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl CommandHandler for FnHandler {
    async fn handle(&self, invocation: &Invocation) -> Result<Vec<OutputMessage>, HandlerFault> {
        (self.f)(invocation)
    }
}

/// 항상 같은 메시지를 돌려주는 handler
pub struct StaticHandler {
    replies: Vec<OutputMessage>,
}

impl StaticHandler {
    pub fn new(replies: Vec<OutputMessage>) -> Self {
        Self { replies }
    }

    pub fn text(text: impl Into<String>) -> HandlerRef {
        Arc::new(Self::new(vec![OutputMessage::text(text)]))
    }
}

#[async_trait]
impl CommandHandler for StaticHandler {
    async fn handle(&self, _invocation: &Invocation) -> Result<Vec<OutputMessage>, HandlerFault> {
        Ok(self.replies.clone())
    }
}
