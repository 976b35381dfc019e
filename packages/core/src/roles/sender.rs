// Отправитель: handshake из двух key transport записей, затем по записи на строку ввода

use crate::crypto::keys::{LongTermIdentity, PeerIdentity};
use crate::crypto::session::Session;
use crate::crypto::CryptoProvider;
use crate::protocol::framer;
use crate::protocol::key_transport::transport_key;
use crate::protocol::mode::{mode_display, Mode};
use crate::protocol::wire::write_record;
use crate::utils::error::Result;
use std::marker::PhantomData;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub struct Sender<P: CryptoProvider, W> {
    writer: W,
    mode: Mode,
    session: Session,
    _provider: PhantomData<P>,
}

impl<P, W> Sender<P, W>
where
    P: CryptoProvider,
    W: AsyncWrite + Unpin,
{
    /// Сгенерировать свежую сессию и передать её ключи получателю.
    ///
    /// Первая запись несёт session key и IV, вторая — MAC key.
    pub async fn handshake(
        mut writer: W,
        mode: Mode,
        identity: &LongTermIdentity,
        peer: &PeerIdentity,
    ) -> Result<Self> {
        let session = Session::generate::<P>()?;

        let session_key = transport_key::<P>(
            session.session_key(),
            &peer.name,
            &peer.public_encrypt,
            identity.private_sign(),
            &identity.name,
            Some(session.iv()),
        )?;
        write_record(&mut writer, &serde_json::to_string(&session_key)?).await?;

        let mac_key = transport_key::<P>(
            session.mac_key(),
            &peer.name,
            &peer.public_encrypt,
            identity.private_sign(),
            &identity.name,
            None,
        )?;
        write_record(&mut writer, &serde_json::to_string(&mac_key)?).await?;

        tracing::info!(
            target: "roles::sender",
            session_id = %session.id(),
            peer = %peer.name,
            mode = mode_display(mode),
            cipher = P::CIPHER_ALGORITHM,
            mac = P::MAC_ALGORITHM,
            "Session and MAC keys sent"
        );

        Ok(Self {
            writer,
            mode,
            session,
            _provider: PhantomData,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Отправить одну строку; возвращает присвоенный номер
    pub async fn send_line(&mut self, text: &str) -> Result<i64> {
        let seq = self.session.next_sequence();
        let record = framer::encode::<P>(self.mode, seq, text, &self.session)?;
        write_record(&mut self.writer, &record).await?;

        tracing::debug!(
            target: "roles::sender",
            session_id = %self.session.id(),
            seq = seq,
            "Message sent"
        );
        Ok(seq)
    }

    /// Отправлять строки из `input` до команды завершения или конца ввода,
    /// затем закрыть соединение.
    pub async fn run<R>(&mut self, input: R, quit_token: &str) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim() == quit_token {
                break;
            }
            self.send_line(&line).await?;
        }

        self.writer.shutdown().await?;
        tracing::info!(
            target: "roles::sender",
            session_id = %self.session.id(),
            sent = self.session.last_sequence(),
            "Connection closed"
        );
        Ok(())
    }
}
