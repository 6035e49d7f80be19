use clap::{ Args as ClapArgs, Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay HTTP server that forwards questions to the LLM provider.
    Serve(ServeArgs),
    /// Start an interactive chat session against a running relay.
    Chat(ChatArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (ollama, gemini)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., llama3, gemini-1.5-flash-latest)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// API key for Google's Generative Language API. Required when CHAT_LLM_TYPE=gemini.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Timeout in seconds for a single upstream LLM call.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    pub upstream_timeout_secs: u64,

    /// Number of most recent history messages forwarded to the provider as context.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "6")]
    pub history_window: usize,

    /// Optional path to a text file replacing the built-in instructor system prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    /// Comma separated list of allowed CORS origins. Empty allows any origin.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the relay server.
    #[arg(long, env = "RELAY_URL", default_value = "http://localhost:5000")]
    pub relay_url: String,

    /// File used as local storage for messages, memory and theme preference.
    #[arg(long, env = "CHAT_STORE_PATH", default_value = ".dsa-chat.json")]
    pub store_path: String,

    /// Timeout in seconds for each attempt against the relay.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,

    /// Extra attempts after the first failed one. A timeout is never retried.
    #[arg(long, env = "CHAT_RETRIES", default_value = "2")]
    pub retries: u32,

    /// Send recent conversation history along with each prompt.
    #[arg(long, env = "CHAT_SEND_HISTORY", default_value = "false")]
    pub send_history: bool,
}
