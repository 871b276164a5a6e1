//! Console runtime - 채팅 대신 터미널로 결과를 보낸다

use async_trait::async_trait;
use llmexec_core::{Delivery, HandlerFault, HostRuntime, Invocation, OutputChunk};

pub struct ConsoleRuntime {
    quiet: bool,
}

impl ConsoleRuntime {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

fn render_chunk(chunk: &OutputChunk) -> String {
    match chunk {
        OutputChunk::Text(text) => text.clone(),
        OutputChunk::Image(url) => format!("[image] {url}"),
    }
}

#[async_trait]
impl HostRuntime for ConsoleRuntime {
    async fn deliver(&self, invocation: &Invocation, delivery: Delivery) -> Result<(), HandlerFault> {
        if self.quiet {
            return Ok(());
        }

        match delivery {
            Delivery::Single(message) => {
                for chunk in &message.chunks {
                    eprintln!("[{}] {}", invocation.command, render_chunk(chunk));
                }
            }
            Delivery::Forward(chunks) => {
                eprintln!("[{}] ── forwarded ({} parts) ──", invocation.command, chunks.len());
                for chunk in &chunks {
                    eprintln!("  {}", render_chunk(chunk));
                }
            }
        }
        Ok(())
    }
}
