// Ретранслятор атакующего: reader, writer и консоль
//
// reader ──inbound──▶ console ──outbound──▶ writer
//    └────────── handshake ──────────outbound──┘

use crate::adversary::console::{Console, ConsoleExit};
use crate::config::Config;
use crate::protocol::mode::Mode;
use crate::protocol::wire::{read_record, write_record};
use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Соединиться с получателем, затем дождаться отправителя.
///
/// Возвращает `(от отправителя, к получателю)`.
pub async fn connect_and_accept(
    host: &str,
    receiver_port: u16,
    listen_port: u16,
) -> Result<(TcpStream, TcpStream)> {
    let to_receiver = TcpStream::connect((host, receiver_port)).await?;
    tracing::info!(target: "adversary::relay", %host, port = receiver_port, "Connected to receiver");

    let listener = TcpListener::bind(("0.0.0.0", listen_port)).await?;
    tracing::info!(target: "adversary::relay", port = listen_port, "Waiting for sender");
    let (from_sender, addr) = listener.accept().await?;
    tracing::info!(target: "adversary::relay", %addr, "Sender connected");

    Ok((from_sender, to_receiver))
}

/// Читать записи отправителя. Первые `handshake_records` идут сразу в
/// outbound, остальные — в консоль.
pub async fn reader_task<R>(
    mut reader: R,
    handshake_records: usize,
    inbound: UnboundedSender<String>,
    outbound: UnboundedSender<String>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut seen = 0usize;
    while let Some(record) = read_record(&mut reader).await? {
        let queue = if seen < handshake_records {
            &outbound
        } else {
            &inbound
        };
        seen += 1;
        tracing::debug!(
            target: "adversary::relay",
            seen,
            len = record.len(),
            handshake = seen <= handshake_records,
            "Record intercepted"
        );
        if queue.send(record).is_err() {
            break;
        }
    }
    tracing::info!(target: "adversary::relay", seen, "Sender closed connection");
    Ok(())
}

/// Передавать записи получателю в порядке извлечения из outbound
pub async fn writer_task<W>(mut writer: W, mut outbound: UnboundedReceiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(record) = outbound.recv().await {
        write_record(&mut writer, &record).await?;
    }
    writer.shutdown().await?;
    Ok(())
}

/// Запустить все три части и ждать, пока любая не завершится
pub async fn run<R, W, I, O>(
    from_sender: R,
    to_receiver: W,
    mode: Mode,
    config: &Config,
    input: I,
    out: O,
) -> Result<ConsoleExit>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let mut reader = tokio::spawn(reader_task(
        from_sender,
        config.handshake_records,
        inbound_tx,
        outbound_tx.clone(),
    ));
    let mut writer = tokio::spawn(writer_task(to_receiver, outbound_rx));
    let mut console = Console::new(mode, input, out, inbound_rx, outbound_tx);

    let exit = tokio::select! {
        exit = console.run() => exit?,
        res = &mut reader => {
            log_unit_end("reader", res);
            ConsoleExit::RelayClosed
        }
        res = &mut writer => {
            log_unit_end("writer", res);
            ConsoleExit::RelayClosed
        }
    };

    reader.abort();
    writer.abort();
    Ok(exit)
}

fn log_unit_end(unit: &str, res: std::result::Result<Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => tracing::info!(target: "adversary::relay", unit, "Connection closed"),
        Ok(Err(e)) => tracing::warn!(target: "adversary::relay", unit, error = %e, "Connection lost"),
        Err(e) => tracing::error!(target: "adversary::relay", unit, error = %e, "Relay task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_routes_handshake_to_outbound() {
        let mut wire = Vec::new();
        for record in ["k1", "k2", "m1", "m2"] {
            write_record(&mut wire, record).await.unwrap();
        }
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();

        reader_task(wire.as_slice(), 2, in_tx, out_tx).await.unwrap();

        assert_eq!(out_rx.recv().await.as_deref(), Some("k1"));
        assert_eq!(out_rx.recv().await.as_deref(), Some("k2"));
        assert_eq!(out_rx.recv().await, None);
        assert_eq!(in_rx.recv().await.as_deref(), Some("m1"));
        assert_eq!(in_rx.recv().await.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn test_writer_preserves_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        for record in ["a", "b", "a"] {
            tx.send(record.to_string()).unwrap();
        }
        drop(tx);

        let mut wire = Vec::new();
        writer_task(&mut wire, rx).await.unwrap();

        let mut reader = wire.as_slice();
        for expected in ["a", "b", "a"] {
            assert_eq!(read_record(&mut reader).await.unwrap().as_deref(), Some(expected));
        }
        assert_eq!(read_record(&mut reader).await.unwrap(), None);
    }
}
