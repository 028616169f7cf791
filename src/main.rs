use clap::{Parser, Subcommand};
use push_relay::{server, shutdown, ServerConfig};

/// push-relay - register browser push subscriptions and broadcast notifications
#[derive(Parser, Debug)]
#[command(name = "push-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    config: ServerConfig,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a fresh VAPID keypair as environment variables
    GenerateVapidKeys,
}

fn main() {
    // A missing .env file is fine, the environment may already be set
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if let Err(e) = run_server_mode(cli.config) {
                eprintln!("Server error: {:#}", e);
                std::process::exit(1);
            }
        }
        Command::GenerateVapidKeys => {
            let keys = push_relay::push::generate_vapid_keys();
            println!("VAPID_PUBLIC_KEY={}", keys.public_key);
            println!("VAPID_PRIVATE_KEY={}", keys.private_key);
        }
    }
}

fn run_server_mode(config: ServerConfig) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let shutdown_state = shutdown::ShutdownState::new();
        if let Err(e) = shutdown::register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let state = push_relay::build_state(&config, shutdown_state);

        server::run_server(config.port, &config.bind, state, config.allowed_origins())
            .await
            .map_err(anyhow::Error::msg)
    })
}
