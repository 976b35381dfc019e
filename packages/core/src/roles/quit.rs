// Слушатель команды завершения на stdin

use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Завершается, когда во вводе встречается `quit_token`.
///
/// Конец ввода или ошибка чтения не считаются командой: future остаётся
/// в ожидании, чтобы роль без терминала продолжала работать.
pub async fn wait_for_quit<R>(input: R, quit_token: &str)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim() == quit_token => {
                tracing::debug!(target: "roles::quit", "Quit requested");
                return;
            }
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => break,
        }
    }
    std::future::pending::<()>().await
}

/// Выполнить `work`, пока во вводе не встретится `quit_token`.
///
/// `None` означает, что пришла команда завершения и `work` отменена.
/// Строки, прочитанные до этого, потребляются слушателем.
pub async fn unless_quit<F, R>(work: F, input: &mut R, quit_token: &str) -> Option<F::Output>
where
    F: Future,
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        out = work => Some(out),
        _ = wait_for_quit(&mut *input, quit_token) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_returns_on_token() {
        let input: &[u8] = b"hello\n  quit \n";
        tokio::time::timeout(Duration::from_secs(1), wait_for_quit(input, "quit"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_eof_is_not_quit() {
        let input: &[u8] = b"hello\n";
        let res = tokio::time::timeout(Duration::from_millis(50), wait_for_quit(input, "quit")).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_quit_cancels_pending_work() {
        let mut input: &[u8] = b"quit\n";
        let out = unless_quit(std::future::pending::<u32>(), &mut input, "quit").await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn test_finished_work_wins_without_quit() {
        let mut input: &[u8] = b"";
        let out = unless_quit(async { 7 }, &mut input, "quit").await;
        assert_eq!(out, Some(7));
    }
}
