use std::fmt;

/// Шаг мастера. Индексы и общее число шагов выводятся только через
/// [`StepLayout`], нигде больше не считаются вручную.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    TierSelect,
    CountSelect,
    /// Данные участника с индексом (с нуля).
    Participant(usize),
    ContactPayment,
    /// Запрос на бэкенд в полёте.
    Submitting,
    Done(Completion),
}

/// Чем закончился мастер.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Заявка с квитанцией принята бэкендом.
    TicketsRequested,
    Cancelled,
}

impl WizardStep {
    pub fn is_terminal(self) -> bool {
        matches!(self, WizardStep::Done(_))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStep::TierSelect => write!(f, "tier selection"),
            WizardStep::CountSelect => write!(f, "ticket count"),
            WizardStep::Participant(index) => write!(f, "participant {}", index + 1),
            WizardStep::ContactPayment => write!(f, "contact and payment"),
            WizardStep::Submitting => write!(f, "submitting"),
            WizardStep::Done(Completion::TicketsRequested) => write!(f, "done"),
            WizardStep::Done(Completion::Cancelled) => write!(f, "cancelled"),
        }
    }
}

/// Раскладка шагов для текущей конфигурации и числа участников.
///
/// `total_steps = [выбор тарифа] + количество + участники + контакт/оплата`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLayout {
    pub tier_step: bool,
    pub participants: usize,
}

impl StepLayout {
    pub fn new(tier_step: bool, participants: usize) -> Self {
        Self {
            tier_step,
            participants,
        }
    }

    fn offset(&self) -> usize {
        usize::from(self.tier_step)
    }

    pub fn total_steps(&self) -> usize {
        self.offset() + 1 + self.participants + 1
    }

    pub fn first(&self) -> WizardStep {
        if self.tier_step {
            WizardStep::TierSelect
        } else {
            WizardStep::CountSelect
        }
    }

    pub fn last_index(&self) -> usize {
        self.total_steps() - 1
    }

    /// Позиция шага в `[0, total_steps - 1]`. Служебные состояния
    /// (отправка, завершение) стоят на последнем шаге.
    pub fn index_of(&self, step: WizardStep) -> usize {
        let index = match step {
            WizardStep::TierSelect => 0,
            WizardStep::CountSelect => self.offset(),
            WizardStep::Participant(i) => self.offset() + 1 + i,
            WizardStep::ContactPayment | WizardStep::Submitting | WizardStep::Done(_) => {
                self.last_index()
            }
        };
        index.min(self.last_index())
    }

    /// Шаг по индексу; индекс за пределами зажимается.
    pub fn step_at(&self, index: usize) -> WizardStep {
        let index = index.min(self.last_index());
        let offset = self.offset();

        if self.tier_step && index == 0 {
            WizardStep::TierSelect
        } else if index == offset {
            WizardStep::CountSelect
        } else if index == self.last_index() {
            WizardStep::ContactPayment
        } else {
            WizardStep::Participant(index - offset - 1)
        }
    }

    pub fn next(&self, step: WizardStep) -> WizardStep {
        self.step_at(self.index_of(self.clamp(step)) + 1)
    }

    pub fn previous(&self, step: WizardStep) -> WizardStep {
        self.step_at(self.index_of(self.clamp(step)).saturating_sub(1))
    }

    /// Приводит шаг к существующему в этой раскладке (после изменения
    /// числа участников или режима выбора тарифа).
    pub fn clamp(&self, step: WizardStep) -> WizardStep {
        match step {
            WizardStep::TierSelect if !self.tier_step => WizardStep::CountSelect,
            WizardStep::Participant(i) if i >= self.participants => {
                match self.participants.checked_sub(1) {
                    Some(last) => WizardStep::Participant(last),
                    None => WizardStep::CountSelect,
                }
            }
            other => other,
        }
    }
}
