use tokio::sync::mpsc;

/// Receives partial output while a tool runs. Called synchronously, in the
/// order the tool produced the chunks, before the final result is returned.
pub trait ChunkSink: Send {
    fn send(&mut self, chunk: &str);
}

impl<F> ChunkSink for F
where
    F: FnMut(&str) + Send,
{
    fn send(&mut self, chunk: &str) {
        self(chunk)
    }
}

/// Buffers every chunk. Handy for tests and for callers that want the
/// transcript after the fact.
#[derive(Debug, Default)]
pub struct CollectingSink {
    chunks: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<String> {
        self.chunks
    }

    pub fn concat(&self) -> String {
        self.chunks.concat()
    }
}

impl ChunkSink for CollectingSink {
    fn send(&mut self, chunk: &str) {
        self.chunks.push(chunk.to_string());
    }
}

/// Forwards chunks to an unbounded channel, for UI tasks that render output
/// as it arrives. A closed receiver drops chunks silently.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl ChunkSink for ChannelSink {
    fn send(&mut self, chunk: &str) {
        let _ = self.tx.send(chunk.to_string());
    }
}
