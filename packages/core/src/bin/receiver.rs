// Получатель: принимает одно соединение и печатает сообщения

use anyhow::{Context, Result};
use clap::Parser;
use secure_channel_core::cli::{self, Args, ReceiverArgs};
use secure_channel_core::crypto::{KeyStore, LongTermIdentity, PeerIdentity};
use secure_channel_core::protocol::mode_display;
use secure_channel_core::roles::quit::unless_quit;
use secure_channel_core::roles::Receiver;
use secure_channel_core::utils::logging;
use secure_channel_core::{ClassicSuiteProvider as Suite, Config};
use tokio::io::BufReader;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(&args.log);

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    println!("Shutting Down");
    // Блокирующее чтение stdin не даёт runtime завершиться само
    std::process::exit(0);
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env();
    args.apply(&mut config);
    let role = cli::receiver_args(&args.positional, &config)?;
    println!("Starting in {} mode", mode_display(role.mode));

    let store = KeyStore::<Suite>::new(&config.keys_dir);
    let identity = LongTermIdentity::load(&store, &config.receiver_name)
        .context("Error reading keys from file")?;
    let peer = PeerIdentity::load(&store, &config.sender_name)
        .context("Error reading keys from file")?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    unless_quit(serve(&role, &identity, &peer, &config), &mut stdin, &config.quit_token)
        .await
        .unwrap_or(Ok(()))
}

async fn serve(
    role: &ReceiverArgs,
    identity: &LongTermIdentity,
    peer: &PeerIdentity,
    config: &Config,
) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", role.port))
        .await
        .with_context(|| format!("Error attempting to start server on port {}", role.port))?;
    println!("Waiting for client on port {}", role.port);

    let (mut stream, addr) = listener.accept().await?;
    println!("Connected");
    tracing::info!(target: "roles::receiver", %addr, "Client connected");

    let mut receiver = Receiver::<Suite>::handshake(&mut stream, role.mode, identity, peer, config)
        .await
        .context("Failed to receive session keys")?;
    println!("Waiting for messages");

    let mut stdout = tokio::io::stdout();
    receiver.run(&mut stream, &mut stdout).await?;
    Ok(())
}
