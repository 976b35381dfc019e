// Получатель: проверка handshake, затем разбор, учёт номеров и вывод сообщений

use crate::config::Config;
use crate::crypto::keys::{LongTermIdentity, PeerIdentity};
use crate::crypto::session::Session;
use crate::crypto::CryptoProvider;
use crate::protocol::framer::{self, TamperingSuspected};
use crate::protocol::key_transport::{
    parse_key_transport, verify_key_transport, TransportedKey, TrustFailure,
};
use crate::protocol::messages::NumberedMessage;
use crate::protocol::mode::{mode_display, Mode};
use crate::protocol::sequence::{OrderingAnomaly, SequenceTracker};
use crate::protocol::validation::validate_key_len;
use crate::protocol::wire::read_record;
use crate::utils::error::{ChannelError, Result};
use crate::utils::time::now_ms;
use std::marker::PhantomData;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

pub const PEER_CLOSED_NOTICE: &str = "Other side closed connection";

/// Итог обработки одной записи
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delivery {
    /// `None`, если сообщение отброшено
    pub message: Option<NumberedMessage>,
    pub tampering: Vec<TamperingSuspected>,
    pub ordering: Option<OrderingAnomaly>,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.tampering.is_empty() && self.ordering.is_none()
    }

    /// Строки предупреждений в порядке обнаружения
    pub fn warning_lines(&self) -> Vec<String> {
        self.tampering
            .iter()
            .map(|w| format!("Warning: {}", w))
            .chain(self.ordering.iter().map(|a| format!("Warning: {}", a)))
            .collect()
    }
}

pub struct Receiver<P: CryptoProvider> {
    mode: Mode,
    session: Session,
    tracker: SequenceTracker,
    _provider: PhantomData<P>,
}

impl<P: CryptoProvider> Receiver<P> {
    /// Принять и проверить две handshake-записи (session key + IV, MAC key).
    /// Любой отказ в доверии прерывает сессию.
    pub async fn handshake<R>(
        reader: &mut R,
        mode: Mode,
        identity: &LongTermIdentity,
        peer: &PeerIdentity,
        config: &Config,
    ) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let session_key = Self::receive_key(reader, identity, peer, config).await?;
        let iv = session_key
            .iv
            .clone()
            .ok_or_else(|| TrustFailure::MalformedPayload("session key arrived without an IV".to_string()))?;
        validate_key_len("Session Key", &session_key.key, P::SESSION_KEY_LEN)
            .and_then(|_| validate_key_len("IV", &iv, P::IV_LEN))
            .map_err(TrustFailure::MalformedPayload)?;

        let mac_key = Self::receive_key(reader, identity, peer, config).await?;
        validate_key_len("MAC Key", &mac_key.key, P::MAC_KEY_LEN).map_err(TrustFailure::MalformedPayload)?;

        let session = Session::from_parts(session_key.key, iv, mac_key.key);
        tracing::info!(
            target: "roles::receiver",
            session_id = %session.id(),
            peer = %peer.name,
            mode = mode_display(mode),
            "Session and MAC keys accepted"
        );
        Ok(Self::from_session(mode, session))
    }

    async fn receive_key<R>(
        reader: &mut R,
        identity: &LongTermIdentity,
        peer: &PeerIdentity,
        config: &Config,
    ) -> Result<TransportedKey>
    where
        R: AsyncRead + Unpin,
    {
        let record = read_record(reader).await?.ok_or_else(|| {
            ChannelError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed during handshake",
            ))
        })?;
        let msg = parse_key_transport(&record)?;
        let key = verify_key_transport::<P>(
            &msg,
            &identity.name,
            &peer.name,
            &peer.public_sign,
            identity.private_encrypt(),
            config.freshness_window_ms,
            now_ms(),
        )
        .map_err(|failure| {
            tracing::warn!(target: "roles::receiver", %failure, "Key transport rejected");
            failure
        })?;
        Ok(key)
    }

    /// Собрать получателя вокруг уже согласованной сессии
    pub fn from_session(mode: Mode, session: Session) -> Self {
        Self {
            mode,
            session,
            tracker: SequenceTracker::new(),
            _provider: PhantomData,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Разобрать одну запись. Ошибок нет: проблемы становятся предупреждениями.
    pub fn process_record(&mut self, record: &str) -> Delivery {
        let decoded = framer::decode::<P>(self.mode, record, &self.session);
        let ordering = decoded
            .message
            .as_ref()
            .and_then(|m| self.tracker.observe(m.sequence));

        let delivery = Delivery {
            message: decoded.message,
            tampering: decoded.warnings,
            ordering,
        };
        if !delivery.is_clean() {
            tracing::warn!(
                target: "roles::receiver",
                session_id = %self.session.id(),
                tampering = delivery.tampering.len(),
                ordering = ?delivery.ordering,
                delivered = delivery.message.is_some(),
                "Suspicious record"
            );
        }
        delivery
    }

    /// Читать записи до конца потока и печатать их в `out`.
    /// Конец потока — штатное завершение.
    pub async fn run<R, O>(&mut self, reader: &mut R, out: &mut O) -> Result<()>
    where
        R: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        while let Some(record) = read_record(reader).await? {
            let delivery = self.process_record(&record);

            let mut text = String::new();
            for line in delivery.warning_lines() {
                text.push_str(&line);
                text.push('\n');
            }
            if let Some(message) = &delivery.message {
                text.push_str(&message.text);
                text.push('\n');
            }
            out.write_all(text.as_bytes()).await?;
            out.flush().await?;
        }

        tracing::info!(
            target: "roles::receiver",
            session_id = %self.session.id(),
            last_accepted = self.tracker.last_accepted(),
            "Peer closed connection"
        );
        out.write_all(format!("{}\n", PEER_CLOSED_NOTICE).as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}
