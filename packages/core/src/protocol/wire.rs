// Wire format: запись = 2 байта длины (big-endian) + UTF-8 текст
// Используется на каждом TCP-соединении: отправитель, получатель, атакующий

use crate::utils::error::{ChannelError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Максимальный размер тела записи
pub const MAX_RECORD_LEN: usize = u16::MAX as usize;

/// Записать одну запись и сбросить буфер
pub async fn write_record<W>(writer: &mut W, record: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = record.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| ChannelError::RecordTooLarge(bytes.len()))?;

    let mut frame = Vec::with_capacity(2 + bytes.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(bytes);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Прочитать одну запись.
///
/// `Ok(None)` — чистый конец потока на границе записи. EOF внутри записи
/// считается ошибкой транспорта.
pub async fn read_record<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    let first = reader.read(&mut len_buf[..1]).await?;
    if first == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut len_buf[1..]).await?;

    let len = u16::from_be_bytes(len_buf) as usize;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    String::from_utf8(body)
        .map(Some)
        .map_err(|_| ChannelError::InvalidRecordEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_keep_boundaries() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        write_record(&mut a, "first").await.unwrap();
        write_record(&mut a, "").await.unwrap();
        write_record(&mut a, "третья").await.unwrap();
        drop(a);

        assert_eq!(read_record(&mut b).await.unwrap().as_deref(), Some("first"));
        assert_eq!(read_record(&mut b).await.unwrap().as_deref(), Some(""));
        assert_eq!(read_record(&mut b).await.unwrap().as_deref(), Some("третья"));
        assert_eq!(read_record(&mut b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_length_prefix_is_big_endian() {
        let mut out = Vec::new();
        write_record(&mut out, "hi").await.unwrap();
        assert_eq!(out, vec![0x00, 0x02, b'h', b'i']);
    }

    #[tokio::test]
    async fn test_oversized_record_rejected() {
        let mut out = Vec::new();
        let big = "x".repeat(MAX_RECORD_LEN + 1);
        let err = write_record(&mut out, &big).await.unwrap_err();
        assert!(matches!(err, ChannelError::RecordTooLarge(n) if n == MAX_RECORD_LEN + 1));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_truncated_record_is_transport_failure() {
        let data: &[u8] = &[0x00, 0x05, b'a', b'b'];
        let mut reader = data;
        let err = read_record(&mut reader).await.unwrap_err();
        assert!(err.is_transport_failure());
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let data: &[u8] = &[0x00, 0x02, 0xff, 0xfe];
        let mut reader = data;
        let err = read_record(&mut reader).await.unwrap_err();
        assert!(matches!(err, ChannelError::InvalidRecordEncoding));
    }
}
