pub mod console;
pub mod display;
pub mod history;
pub mod relay;

pub use console::{Console, ConsoleExit, ConsoleState};
pub use history::{CapturedMessage, History, ReplayCursor};
