use clap::Parser;
use dotenv::dotenv;
use dsa_instructor::cli::{ Args, Command };
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();
    // the interactive client keeps stderr quiet unless RUST_LOG asks otherwise
    let default_filter = match args.command {
        Command::Serve(_) => "info",
        Command::Chat(_) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    dsa_instructor::run(args).await
}
