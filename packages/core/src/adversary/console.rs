// Консоль атакующего: конечный автомат Main / Inspect / Replay
//
// Единственный владелец истории. С reader и writer общается только через
// очереди: inbound (перехваченные записи) и outbound (записи для получателя).

use crate::adversary::display::{self, Answer};
use crate::adversary::history::{History, ReplayCursor};
use crate::protocol::mode::Mode;
use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub const WELCOME: &str = "Welcome to the interface for the on-path attacker who controls the network. \
Type next to get started or type help for help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleState {
    Main,
    /// Только что перехваченная запись `index` ждёт решения
    Inspect { index: usize },
    Replay { cursor: ReplayCursor },
}

/// Почему консоль завершилась
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// Команда quit
    Quit,
    /// Конец ввода консоли
    InputClosed,
    /// Reader или writer больше нет
    RelayClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainCommand {
    Next,
    Replay,
    Quit,
    Help,
}

impl MainCommand {
    pub const USAGE: &'static str = "Usage:\n\
        help, h - print this information\n\
        quit, q - exit the program\n\
        replay, r - replay past messages\n\
        next, n - wait for an incoming message";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "next" | "n" => Some(MainCommand::Next),
            "replay" | "r" => Some(MainCommand::Replay),
            "quit" | "q" => Some(MainCommand::Quit),
            "help" | "h" => Some(MainCommand::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectCommand {
    Forward,
    Modify,
    Delete,
    Quit,
    Help,
}

impl InspectCommand {
    pub const USAGE: &'static str = "Usage:\n\
        help, h - print this information\n\
        quit, q - exit the program\n\
        forward, f - forward the message to the receiver\n\
        modify, m - modify the message by entering your own values for its fields\n\
        delete, d - delete the message (it will still be saved for replay)";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "forward" | "f" => Some(InspectCommand::Forward),
            "modify" | "m" => Some(InspectCommand::Modify),
            "delete" | "d" => Some(InspectCommand::Delete),
            "quit" | "q" => Some(InspectCommand::Quit),
            "help" | "h" => Some(InspectCommand::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayCommand {
    Forward,
    Back,
    Send,
    Cancel,
    Quit,
    Help,
}

impl ReplayCommand {
    pub const USAGE: &'static str = "Usage:\n\
        help, h - print this information\n\
        quit, q - exit the program\n\
        forward, f - view the next old message\n\
        back, b - view the previous old message\n\
        send, s - send the current old message to the receiver\n\
        cancel, c - go back to the main menu";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "forward" | "f" => Some(ReplayCommand::Forward),
            "back" | "b" => Some(ReplayCommand::Back),
            "send" | "s" => Some(ReplayCommand::Send),
            "cancel" | "c" => Some(ReplayCommand::Cancel),
            "quit" | "q" => Some(ReplayCommand::Quit),
            "help" | "h" => Some(ReplayCommand::Help),
            _ => None,
        }
    }
}

enum Step {
    Continue(ConsoleState),
    Exit(ConsoleExit),
}

pub struct Console<I, O> {
    mode: Mode,
    input: I,
    out: O,
    history: History,
    inbound: UnboundedReceiver<String>,
    outbound: UnboundedSender<String>,
}

impl<I, O> Console<I, O>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(
        mode: Mode,
        input: I,
        out: O,
        inbound: UnboundedReceiver<String>,
        outbound: UnboundedSender<String>,
    ) -> Self {
        Self {
            mode,
            input,
            out,
            history: History::new(),
            inbound,
            outbound,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Крутить автомат до выхода
    pub async fn run(&mut self) -> Result<ConsoleExit> {
        self.say(WELCOME).await?;
        let mut state = ConsoleState::Main;
        loop {
            let step = match state {
                ConsoleState::Main => self.main_step().await?,
                ConsoleState::Inspect { index } => self.inspect_step(index).await?,
                ConsoleState::Replay { cursor } => self.replay_step(cursor).await?,
            };
            match step {
                Step::Continue(next) => {
                    if next != state {
                        tracing::trace!(target: "adversary::console", from = ?state, to = ?next, "State change");
                    }
                    state = next;
                }
                Step::Exit(exit) => {
                    tracing::info!(target: "adversary::console", ?exit, captured = self.history.len(), "Console finished");
                    if exit != ConsoleExit::RelayClosed {
                        self.say("Shutting Down").await?;
                    }
                    return Ok(exit);
                }
            }
        }
    }

    async fn main_step(&mut self) -> Result<Step> {
        self.say("\nWhat do you want to do?").await?;
        let Some(line) = self.read_line().await? else {
            return Ok(Step::Exit(ConsoleExit::InputClosed));
        };

        match MainCommand::parse(&line) {
            Some(MainCommand::Next) => {
                self.say("Waiting for a message to arrive").await?;
                let Some(raw) = self.inbound.recv().await else {
                    self.say("Sender closed connection").await?;
                    return Ok(Step::Exit(ConsoleExit::RelayClosed));
                };
                let index = self.history.push(raw).order;
                tracing::debug!(target: "adversary::console", index, "Record captured");

                self.say("A message has arrived!\n").await?;
                self.show(index).await?;
                self.say("Press f to forward this message, m to modify it, or d to delete it. Press h for help.")
                    .await?;
                Ok(Step::Continue(ConsoleState::Inspect { index }))
            }
            Some(MainCommand::Replay) => match ReplayCursor::at_latest(&self.history) {
                Some(cursor) => {
                    self.say(
                        "Press f to view the next message, b to view the previous one, or c to cancel \
                         and go back to the main menu. Press h for help. Press s to send an old message.",
                    )
                    .await?;
                    self.show(cursor.index()).await?;
                    Ok(Step::Continue(ConsoleState::Replay { cursor }))
                }
                None => {
                    self.say("No messages have been received").await?;
                    Ok(Step::Continue(ConsoleState::Main))
                }
            },
            Some(MainCommand::Quit) => Ok(Step::Exit(ConsoleExit::Quit)),
            Some(MainCommand::Help) => {
                self.say(MainCommand::USAGE).await?;
                Ok(Step::Continue(ConsoleState::Main))
            }
            None => {
                self.unknown(&line).await?;
                Ok(Step::Continue(ConsoleState::Main))
            }
        }
    }

    async fn inspect_step(&mut self, index: usize) -> Result<Step> {
        let stay = ConsoleState::Inspect { index };
        let Some(line) = self.read_line().await? else {
            return Ok(Step::Exit(ConsoleExit::InputClosed));
        };
        let raw = match self.history.get(index) {
            Some(captured) => captured.raw.clone(),
            None => return Ok(Step::Continue(ConsoleState::Main)),
        };

        match InspectCommand::parse(&line) {
            Some(InspectCommand::Forward) => self.push_outbound(raw).await,
            Some(InspectCommand::Modify) => match self.modify(&raw).await? {
                Some(modified) => self.push_outbound(modified).await,
                None => Ok(Step::Exit(ConsoleExit::InputClosed)),
            },
            Some(InspectCommand::Delete) => {
                self.say("Message deleted").await?;
                Ok(Step::Continue(ConsoleState::Main))
            }
            Some(InspectCommand::Quit) => Ok(Step::Exit(ConsoleExit::Quit)),
            Some(InspectCommand::Help) => {
                self.say(InspectCommand::USAGE).await?;
                Ok(Step::Continue(stay))
            }
            None => {
                self.unknown(&line).await?;
                Ok(Step::Continue(stay))
            }
        }
    }

    async fn replay_step(&mut self, mut cursor: ReplayCursor) -> Result<Step> {
        let Some(line) = self.read_line().await? else {
            return Ok(Step::Exit(ConsoleExit::InputClosed));
        };

        match ReplayCommand::parse(&line) {
            Some(ReplayCommand::Forward) => {
                if cursor.forward(&self.history) {
                    self.show(cursor.index()).await?;
                } else {
                    self.say("This is the last message").await?;
                }
            }
            Some(ReplayCommand::Back) => {
                if cursor.back() {
                    self.show(cursor.index()).await?;
                } else {
                    self.say("This is the first message").await?;
                }
            }
            Some(ReplayCommand::Send) => {
                if let Some(captured) = cursor.current(&self.history) {
                    let raw = captured.raw.clone();
                    tracing::debug!(target: "adversary::console", index = cursor.index(), "Replaying record");
                    if self.outbound.send(raw).is_err() {
                        return Ok(Step::Exit(ConsoleExit::RelayClosed));
                    }
                    self.say("Sending message").await?;
                }
            }
            Some(ReplayCommand::Cancel) => return Ok(Step::Continue(ConsoleState::Main)),
            Some(ReplayCommand::Quit) => return Ok(Step::Exit(ConsoleExit::Quit)),
            Some(ReplayCommand::Help) => self.say(ReplayCommand::USAGE).await?,
            None => self.unknown(&line).await?,
        }
        Ok(Step::Continue(ConsoleState::Replay { cursor }))
    }

    /// Опросить поля записи; `None` при конце ввода
    async fn modify(&mut self, raw: &str) -> Result<Option<String>> {
        let fields = display::parse_fields(self.mode, raw);
        let mut answers = Vec::new();
        for prompt in display::prompts(&fields) {
            self.say(&prompt.text()).await?;
            let answer = if prompt.wants_number() {
                loop {
                    let Some(line) = self.read_line().await? else {
                        return Ok(None);
                    };
                    match line.trim().parse::<i64>() {
                        Ok(n) => break Answer::Number(n),
                        Err(_) => self.say("Please enter a whole number").await?,
                    }
                }
            } else {
                match self.read_line().await? {
                    Some(line) => Answer::Text(line),
                    None => return Ok(None),
                }
            };
            answers.push(answer);
        }

        // Ответы всегда совпадают с вопросами, запасной вариант — исходная запись
        Ok(Some(
            display::rebuild(&fields, &answers).unwrap_or_else(|| raw.to_string()),
        ))
    }

    async fn push_outbound(&mut self, record: String) -> Result<Step> {
        if self.outbound.send(record).is_err() {
            return Ok(Step::Exit(ConsoleExit::RelayClosed));
        }
        self.say("Sending message").await?;
        Ok(Step::Continue(ConsoleState::Main))
    }

    async fn show(&mut self, index: usize) -> Result<()> {
        let rendered = match self.history.get(index) {
            Some(captured) => display::render(&display::parse_fields(self.mode, &captured.raw)),
            None => return Ok(()),
        };
        self.say(&rendered).await
    }

    async fn unknown(&mut self, line: &str) -> Result<()> {
        self.say(&format!("Unknown command {:?}, type help for help", line.trim()))
            .await
    }

    /// Строка ввода без перевода строки. Байты не из UTF-8 заменяются,
    /// такая строка просто не распознаётся как команда.
    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn drive(script: &str, captured: &[&str]) -> (ConsoleExit, Vec<String>, String) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        for raw in captured {
            in_tx.send(raw.to_string()).unwrap();
        }

        let mut screen = Vec::new();
        let exit = {
            let mut console = Console::new(Mode::Plaintext, script.as_bytes(), &mut screen, in_rx, out_tx);
            console.run().await.unwrap()
        };

        let mut sent = Vec::new();
        while let Ok(raw) = out_rx.try_recv() {
            sent.push(raw);
        }
        (exit, sent, String::from_utf8(screen).unwrap())
    }

    #[test]
    fn test_aliases() {
        assert_eq!(MainCommand::parse("n"), Some(MainCommand::Next));
        assert_eq!(MainCommand::parse(" replay "), Some(MainCommand::Replay));
        assert_eq!(InspectCommand::parse("m"), Some(InspectCommand::Modify));
        assert_eq!(ReplayCommand::parse("b"), Some(ReplayCommand::Back));
        assert_eq!(ReplayCommand::parse("x"), None);
    }

    #[tokio::test]
    async fn test_delete_keeps_history_but_sends_nothing() {
        let (exit, sent, screen) = drive("n\nd\nq\n", &["A"]).await;
        assert_eq!(exit, ConsoleExit::Quit);
        assert!(sent.is_empty());
        assert!(screen.contains("Message deleted"));
    }

    #[tokio::test]
    async fn test_replay_with_empty_history() {
        let (exit, sent, screen) = drive("r\n", &[]).await;
        assert_eq!(exit, ConsoleExit::InputClosed);
        assert!(sent.is_empty());
        assert!(screen.contains("No messages have been received"));
    }

    #[tokio::test]
    async fn test_modify_reprompts_for_number() {
        let record = r#"{"Message Number":1,"Message":"hi"}"#;
        let (_, sent, screen) = drive("n\nm\nseven\n7\nbye\nq\n", &[record]).await;
        assert!(screen.contains("Please enter a whole number"));
        assert_eq!(sent, vec![r#"{"Message Number":7,"Message":"bye"}"#.to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_command_stays_in_state() {
        let (_, sent, screen) = drive("n\nxyz\nf\nq\n", &["A"]).await;
        assert!(screen.contains("Unknown command"));
        assert_eq!(sent, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_an_unknown_command() {
        let (_in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        let script: &[u8] = b"\xff\xfe\r\nq\n";

        let mut screen = Vec::new();
        let exit = Console::new(Mode::Plaintext, script, &mut screen, in_rx, out_tx)
            .run()
            .await
            .unwrap();

        assert_eq!(exit, ConsoleExit::Quit);
        let screen = String::from_utf8(screen).unwrap();
        assert!(screen.contains("Unknown command"));
        assert!(screen.contains("Shutting Down"));
    }
}
