use chrono::Local;
use log::{ info, warn };
use std::error::Error;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use super::fallback::{ canned_reply, tip_of_the_day };
use super::session::ChatSession;
use super::store::{ LocalStore, StoreError };
use super::{ ClientError, RelayClient };
use crate::cli::ChatArgs;
use crate::history::recent_history;
use crate::relay::DEFAULT_HISTORY_WINDOW;

pub const FAILED_REPLY: &str = "Failed to fetch response from server.";
const GREETING: &str = "Say Hi! What do you want to learn about DSA today?";
const HELP: &str = "Commands: /clear  /theme  /memory  /tip  /help  /quit";

fn theme_line(dark: bool) -> String {
    format!("Theme: {}", if dark { "dark" } else { "light" })
}

/// Interactive loop state: one session, one relay client.
pub struct Repl {
    session: ChatSession,
    client: RelayClient,
    send_history: bool,
}

impl Repl {
    pub fn new(session: ChatSession, client: RelayClient, send_history: bool) -> Self {
        Self { session, client, send_history }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Startup text: title, persisted theme, help, then the greeting or the saved conversation.
    pub fn banner(&self) -> String {
        let mut lines = vec![
            "DSA Instructor".to_string(),
            "\"Every great coder was once a beginner. Let's level up your DSA skills together!\"".to_string(),
            theme_line(self.session.dark_mode()),
            HELP.to_string(),
        ];
        if self.session.messages().is_empty() {
            lines.push(GREETING.to_string());
        } else {
            lines.extend(self.session.messages().iter().map(|msg| format!("{}> {}", msg.role, msg.text)));
        }
        lines.join("\n")
    }

    /// Handles one line of input and returns the text to show. `None` ends the loop.
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<String>, StoreError> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(Some(String::new()));
        }

        match input {
            "/quit" | "/exit" => Ok(None),
            "/help" => Ok(Some(HELP.to_string())),
            "/clear" => {
                self.session.clear()?;
                Ok(Some("Chat cleared.".to_string()))
            }
            "/theme" => {
                let dark = self.session.toggle_theme()?;
                Ok(Some(theme_line(dark)))
            }
            "/memory" => {
                let memory = self.session.memory();
                if memory.is_empty() {
                    Ok(Some("Nothing remembered yet.".to_string()))
                } else {
                    Ok(Some(format!("name: {}\ngoal: {}", memory.name, memory.goal)))
                }
            }
            "/tip" => Ok(Some(format!("DSA Tip of the Day: {}", tip_of_the_day(Local::now().date_naive())))),
            _ => self.ask(input).await.map(Some),
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, StoreError> {
        let history = if self.send_history {
            recent_history(self.session.messages(), DEFAULT_HISTORY_WINDOW).to_vec()
        } else {
            Vec::new()
        };
        self.session.record_user(prompt)?;

        let (reply, notice) = match self.client.send(prompt, &history).await {
            Ok(reply) => (reply, None),
            Err(ClientError::Status { status, message }) => {
                warn!("Relay answered {}: {}", status, message);
                (FAILED_REPLY.to_string(), Some(message))
            }
            Err(e) => {
                warn!("Relay unreachable, answering offline: {}", e);
                (canned_reply(prompt).to_string(), Some(FAILED_REPLY.to_string()))
            }
        };
        self.session.record_assistant(&reply)?;

        Ok(match notice {
            Some(notice) => format!("[{}]\n{}", notice, reply),
            None => reply,
        })
    }
}

pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let store = LocalStore::open(&args.store_path)?;
    let session = ChatSession::load(store);
    let client = RelayClient::new(&args.relay_url, Duration::from_secs(args.timeout_secs), args.retries);
    info!("Chat client using relay {} (store: {})", args.relay_url, args.store_path);

    let mut repl = Repl::new(session, client, args.send_history);
    println!("{}", repl.banner());
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        match repl.handle_line(&line?).await? {
            Some(output) if output.is_empty() => {}
            Some(output) => println!("{}", output),
            None => break,
        }
    }
    Ok(())
}
