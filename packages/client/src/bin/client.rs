//! Terminal chat client for a STOMP-over-WebSocket chat room.
//!
//! Joins one room, announces presence (ENTER), sends typed lines as TALK
//! messages and prints everything the room delivers. Ctrl+C / Ctrl+D leaves
//! the room gracefully (LEAVE). Reconnects after a dropped connection
//! (default 5 attempts with a 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin stomproom -- --nickname alice
//! BACKEND_URL=http://chat.example.com:8080 cargo run --bin stomproom -- -r lobby
//! ```

use clap::Parser;

use stomproom_client::{
    config::{Args, ClientConfig},
    domain::{ClientError, Nickname},
    infrastructure::repository::FileNicknameRepository,
    ui::{prompt_nickname, run_client},
    usecase::resolve_nickname,
};
use stomproom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME")], "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let config = ClientConfig::try_from(args)?;
    let nickname = choose_nickname(&config)?;
    run_client(config, nickname).await
}

fn choose_nickname(config: &ClientConfig) -> Result<Nickname, ClientError> {
    let path = config
        .nickname_file
        .clone()
        .or_else(FileNicknameRepository::default_path);

    match path {
        Some(path) => {
            let repository = FileNicknameRepository::new(path);
            resolve_nickname(config.nickname.clone(), &repository, prompt_nickname)
        }
        None => config.nickname.clone().ok_or_else(|| {
            ClientError::InvalidConfig(
                "no config directory found; pass --nickname or --nickname-file".to_string(),
            )
        }),
    }
}
