// Атакующий: сидит между отправителем и получателем и управляет трафиком

use anyhow::{Context, Result};
use clap::Parser;
use secure_channel_core::adversary::{relay, ConsoleExit};
use secure_channel_core::cli::{self, Args};
use secure_channel_core::crypto::{KeyStore, PeerIdentity};
use secure_channel_core::protocol::mode_display;
use secure_channel_core::utils::logging::{self, fingerprint};
use secure_channel_core::{ClassicSuiteProvider as Suite, Config};
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(&args.log);

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    // Блокирующее чтение stdin не даёт runtime завершиться само
    std::process::exit(0);
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env();
    args.apply(&mut config);
    let role = cli::adversary_args(&args.positional, &config)?;
    println!("Starting in {} mode", mode_display(role.mode));

    // Публичные ключи атакующему известны, но для работы не нужны
    let store = KeyStore::<Suite>::new(&config.keys_dir);
    for name in [&config.sender_name, &config.receiver_name] {
        match PeerIdentity::load(&store, name) {
            Ok(peer) => tracing::info!(
                target: "adversary::relay",
                name = %peer.name,
                sign_fp = %fingerprint(&peer.public_sign),
                "Public keys known"
            ),
            Err(e) => tracing::warn!(target: "adversary::relay", error = %e, "Error loading keys"),
        }
    }

    println!(
        "Connecting to the receiver on host {}, port {}",
        role.host, role.receiver_port
    );
    println!("Waiting for the sender on port {}", role.listen_port);
    let (from_sender, to_receiver) =
        relay::connect_and_accept(&role.host, role.receiver_port, role.listen_port)
            .await
            .context("Error setting up connections")?;
    println!("Connected to both sides");

    let input = BufReader::new(tokio::io::stdin());
    let exit = relay::run(
        from_sender,
        to_receiver,
        role.mode,
        &config,
        input,
        tokio::io::stdout(),
    )
    .await?;
    if exit == ConsoleExit::RelayClosed {
        println!("Connection closed\nShutting Down");
    }
    Ok(())
}
