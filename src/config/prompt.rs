use log::info;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::history::format_history_for_prompt;
use crate::models::chat::Message;

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a highly skilled, friendly, and clear Data Structures and Algorithms (DSA) instructor. Your goal is to teach, guide, and mentor students of various levels in understanding core DSA concepts, solving problems, and preparing for technical interviews.

Your Responsibilities:
- Explain DSA topics with real-world analogies and examples
- Provide code solutions in requested languages (Java, Python, C++, JavaScript)
- Always include time and space complexity analysis
- Break down problems step-by-step with intuition
- Share problem-solving patterns and strategies
- Recommend practice problems and learning paths

Your Teaching Style:
- Be encouraging and motivating, but honest about mistakes
- Use simple language with clear explanations
- Include visual descriptions and dry-run examples
- Ask clarifying questions when needed
- Provide hints before full solutions when appropriate
- Format code with proper syntax highlighting using markdown

Topics You Cover:
- Fundamentals: Arrays, Strings, Math, Bit Manipulation
- Linear DS: Stack, Queue, LinkedList, Deque
- Non-Linear DS: Trees, Graphs, Tries, Heaps
- Algorithms: Sorting, Searching, Two Pointers, Sliding Window
- Advanced: Dynamic Programming, Greedy, Backtracking, Divide & Conquer
- System Design basics and problem-solving patterns

Important Guidelines:
- Only answer DSA-related questions
- If asked about non-DSA topics, politely redirect focus to DSA learning
- Format responses with markdown for better readability (use **bold**, `code`, lists, etc.)
- Keep responses concise but comprehensive
- Always encourage practice and continuous learning
- Be supportive and never make students feel bad about not knowing something"#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Prompt file '{0}' is empty")]
    Empty(String),
}

/// Returns the system prompt from `path`, or the built-in instructor prompt.
pub fn load_system_prompt<P: AsRef<Path>>(path: Option<P>) -> Result<String, PromptError> {
    let Some(path) = path else {
        return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
    };
    let display = path.as_ref().display().to_string();
    let content = fs::read_to_string(&path).map_err(|source| PromptError::Io {
        path: display.clone(),
        source,
    })?;
    let content = content.trim();
    if content.is_empty() {
        return Err(PromptError::Empty(display));
    }
    info!("Loaded system prompt from {} ({} chars)", display, content.len());
    Ok(content.to_string())
}

/// Folds system prompt, prior conversation and the new question into one
/// text block, for providers that take a single user turn.
pub fn compose_prompt(system: &str, history: &[Message], question: &str) -> String {
    let context = format_history_for_prompt(history);
    if context.is_empty() {
        format!("{}\n\nStudent: {}", system, question)
    } else {
        format!(
            "{}\n\n## Previous Conversation:\n{}\n\n## Current Question:\nStudent: {}",
            system,
            context,
            question
        )
    }
}
