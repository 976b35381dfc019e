// Отправитель: читает строки из stdin и отправляет их получателю

use anyhow::{Context, Result};
use clap::Parser;
use secure_channel_core::cli::{self, Args};
use secure_channel_core::crypto::{KeyStore, LongTermIdentity, PeerIdentity};
use secure_channel_core::protocol::mode_display;
use secure_channel_core::roles::quit::unless_quit;
use secure_channel_core::roles::Sender;
use secure_channel_core::utils::logging;
use secure_channel_core::{ClassicSuiteProvider as Suite, Config};
use tokio::io::BufReader;
use tokio::net::TcpStream;

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
    let role = cli::sender_args(&args.positional, &config)?;
    println!("Starting in {} mode", mode_display(role.mode));

    let store = KeyStore::<Suite>::new(&config.keys_dir);
    let identity = LongTermIdentity::load(&store, &config.sender_name)
        .context("Error reading keys from file")?;
    let peer = PeerIdentity::load(&store, &config.receiver_name)
        .context("Error reading keys from file")?;

    // Команда завершения учитывается и во время подключения и handshake
    let mut stdin = BufReader::new(tokio::io::stdin());
    let connect = async {
        println!("Connecting to server on host {}, port {}", role.host, role.port);
        let stream = TcpStream::connect((role.host.as_str(), role.port))
            .await
            .with_context(|| format!("Error connecting to {}:{}", role.host, role.port))?;

        println!("Sending session and MAC keys");
        let sender = Sender::<Suite, _>::handshake(stream, role.mode, &identity, &peer).await?;
        Ok::<_, anyhow::Error>(sender)
    };
    let Some(sender) = unless_quit(connect, &mut stdin, &config.quit_token).await else {
        return Ok(());
    };
    let mut sender = sender?;

    println!("Enter messages to send:");
    sender
        .run(stdin, &config.quit_token)
        .await
        .context("Error sending message")?;
    Ok(())
}
