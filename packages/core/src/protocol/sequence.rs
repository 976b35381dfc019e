// Отслеживание номеров сообщений на стороне получателя
// Никогда не блокирует доставку, только сообщает об аномалиях

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingAnomaly {
    /// Пропущены номера между `expected` и `received`
    #[error("message {received} arrived but {expected} was expected, messages may have been deleted")]
    GapDetected { expected: i64, received: i64 },

    /// Номер не больше последнего принятого: повтор или переупорядочивание
    #[error("message {received} is not newer than {last_accepted}, it may have been replayed")]
    OutOfOrder { last_accepted: i64, received: i64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last_accepted: i64,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> i64 {
        self.last_accepted
    }

    /// Учесть номер очередного сообщения
    pub fn observe(&mut self, received: i64) -> Option<OrderingAnomaly> {
        let expected = self.last_accepted.checked_add(1);
        if expected == Some(received) {
            self.last_accepted = received;
            None
        } else if received > self.last_accepted {
            // received > last_accepted, значит last_accepted < i64::MAX
            let expected = self.last_accepted + 1;
            self.last_accepted = received;
            Some(OrderingAnomaly::GapDetected { expected, received })
        } else {
            Some(OrderingAnomaly::OutOfOrder {
                last_accepted: self.last_accepted,
                received,
            })
        }
    }
}
