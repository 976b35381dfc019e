pub mod quit;
pub mod receiver;
pub mod sender;

pub use receiver::{Delivery, Receiver};
pub use sender::Sender;
