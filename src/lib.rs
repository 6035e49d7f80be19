pub mod cli;
pub mod client;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::{ Args, Command, ServeArgs };
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve) => run_server(serve).await,
        Command::Chat(chat) => client::repl::run_chat(chat).await,
    }
}

pub async fn run_server(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Gemini API Key Set: {}", !args.gemini_api_key.trim().is_empty());
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("History Window: {}", args.history_window);
    info!("System Prompt: {}", args.system_prompt_path.as_deref().unwrap_or("built-in"));
    if args.cors_origins.is_empty() {
        info!("CORS Origins: any");
    } else {
        info!("CORS Origins: {}", args.cors_origins.join(", "));
    }
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = Relay::from_args(&args)?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    info!("  GET  /        - API info");
    info!("  GET  /health  - Health check");
    info!("  POST /chat    - Chat endpoint");
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
