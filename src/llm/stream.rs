//! Newline-delimited JSON handling for streamed provider responses.
//!
//! Network chunks do not respect line boundaries: a single JSON object can
//! arrive split over several chunks, and a multibyte UTF-8 character can be
//! cut in half. [`LineBuffer`] holds back the incomplete tail until the rest
//! of the line shows up.

use log::debug;
use serde::Deserialize;

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line completed by it, without the
    /// trailing newline. Blank lines are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(decode_line)
            .collect()
    }

    /// Returns whatever is still held back once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.pending);
        decode_line(&tail)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[derive(Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: Option<OllamaChunkMessage>,
}

#[derive(Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}

/// Extracts `message.content` from one line of an Ollama `/api/chat` stream.
pub fn parse_ollama_line(line: &str) -> Option<String> {
    match serde_json::from_str::<OllamaChatChunk>(line) {
        Ok(chunk) => chunk.message.map(|m| m.content).filter(|c| !c.is_empty()),
        Err(e) => {
            debug!("Skipping unparseable stream line ({}): {}", e, line);
            None
        }
    }
}
