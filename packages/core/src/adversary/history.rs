// История перехваченных записей и курсор режима replay

/// Запись, перехваченная у отправителя
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    /// Порядковый номер перехвата, с нуля
    pub order: usize,
    /// Запись в том виде, в каком пришла по проводу
    pub raw: String,
}

/// Append-only журнал. Каждая запись попадает сюда ровно один раз,
/// даже если потом была удалена или изменена.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<CapturedMessage>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: String) -> &CapturedMessage {
        let order = self.entries.len();
        self.entries.push(CapturedMessage { order, raw });
        &self.entries[order]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CapturedMessage> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedMessage> {
        self.entries.iter()
    }
}

/// Позиция в истории при просмотре старых записей
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayCursor {
    index: usize,
}

impl ReplayCursor {
    /// Курсор на самой свежей записи; `None` для пустой истории
    pub fn at_latest(history: &History) -> Option<Self> {
        history.len().checked_sub(1).map(|index| Self { index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Шаг к более новой записи; `false`, если уже на последней
    pub fn forward(&mut self, history: &History) -> bool {
        if self.index + 1 < history.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Шаг к более старой записи; `false`, если уже на первой
    pub fn back(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn current<'a>(&self, history: &'a History) -> Option<&'a CapturedMessage> {
        history.get(self.index)
    }
}
