use clap::{Parser, Subcommand};
use relay::relay::{InboundChatRequest, OutboundReply};

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(about = "Chat relay: forwards chat messages to an NLP backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: CHAT_RELAY_CONFIG_PATH or ~/.chat-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the relay (POST /api/chat forwarded to the NLP backend).
    Serve {
        /// Config file path (default: CHAT_RELAY_CONFIG_PATH or ~/.chat-relay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config, CHAT_RELAY_PORT, or 5000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 0.0.0.0)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Backend chat endpoint (default from config, CHAT_RELAY_BACKEND_URL, or http://localhost:5001/chat_api/chat)
        #[arg(long, value_name = "URL")]
        backend_url: Option<String>,
    },

    /// Chat through a running relay (interactive).
    Chat {
        /// Config file path, used to find the relay port when --url is not given.
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Relay base URL (default http://127.0.0.1:<configured port>).
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Serve { .. }) => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("chat-relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve {
            config,
            port,
            bind,
            backend_url,
        }) => {
            if let Err(e) = run_serve(config, port, bind, backend_url).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, url }) => {
            if let Err(e) = run_chat(config, url).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(relay::config::default_config_path);
    let dir = relay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
    backend_url: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, _) = relay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }
    if let Some(u) = backend_url {
        config.backend.url = u;
    }
    log::info!(
        "starting relay on {}:{} (backend {})",
        config.server.bind,
        config.server.port,
        config.backend.url
    );
    relay::relay::run_relay(config).await
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let base = match url {
        Some(u) => u.trim_end_matches('/').to_string(),
        None => {
            let (config, _) = relay::config::load_config(config_path)?;
            format!("http://127.0.0.1:{}", config.server.port)
        }
    };
    let endpoint = format!("{}/api/chat", base);
    let client = reqwest::Client::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        match send_message(&client, &endpoint, input).await {
            Ok(reply) => println!("< {}", reply.trim()),
            Err(e) => eprintln!("chat error: {}", e),
        }
    }

    Ok(())
}

/// One relay round trip. Non-200 replies still carry `{ reply }`, which is shown as the error.
async fn send_message(
    client: &reqwest::Client,
    endpoint: &str,
    message: &str,
) -> Result<String, String> {
    let res = client
        .post(endpoint)
        .json(&InboundChatRequest::new(message))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = res.status();
    let body: OutboundReply = res.json().await.map_err(|e| e.to_string())?;
    if status.is_success() {
        Ok(body.reply)
    } else {
        Err(format!("{} {}", status, body.reply))
    }
}
