//! Мастер бронирования билетов.
//!
//! Шаги: [выбор тарифа] -> количество -> участники -> контакт и оплата.
//! С последнего шага мастер либо отправляет заявку с квитанцией о переводе,
//! либо создаёт преференцию и передаёт её внешнему виджету кошелька.
//!
//! Сетевые вызовы разбиты на `begin_*` / `finish_*`: `begin_*` проверяет
//! черновик, ставит флаг отправки и возвращает полезную нагрузку, `finish_*`
//! применяет результат. Пока флаг стоит, повторные вызовы отклоняются.
//! `submit_transfer` и `go_to_pay` делают оба шага за один вызов.

pub mod draft;
pub mod step;

pub use draft::{DraftReservation, ProofFile};
pub use step::{Completion, StepLayout, WizardStep};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, TierSelection};
use crate::error::{CheckoutError, GatewayResult, WizardError};
use crate::models::{Event, Participant, ParticipantField, Prevent};
use crate::services::gateway::{
    CheckoutHandoff, PaymentPreference, TicketGateway, TicketReceipt, TicketSubmission,
};
use crate::services::pricing::{self, PaymentMethod, Totals};
use crate::services::{roster, validation};

/// Параметры мастера, обычно из [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOptions {
    pub tier_selection: TierSelection,
    pub max_tickets: usize,
    pub max_proof_bytes: usize,
    /// Без ключа оплата через кошелёк недоступна.
    pub wallet_public_key: Option<String>,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            tier_selection: TierSelection::Choose,
            max_tickets: 10,
            max_proof_bytes: 10 * 1024 * 1024,
            wallet_public_key: None,
        }
    }
}

impl WizardOptions {
    /// Ключ кошелька берётся из аккаунта события, иначе из конфигурации.
    pub fn from_config(config: &Config, event: &Event) -> Self {
        let wallet_public_key = event
            .wallet_public_key()
            .or_else(|| config.payment.public_key())
            .map(str::to_string);

        Self {
            tier_selection: config.wizard.tier_selection,
            max_tickets: config.wizard.max_tickets,
            max_proof_bytes: config.wizard.max_proof_bytes,
            wallet_public_key,
        }
    }
}

/// Запрос преференции, который нужно отправить в шлюз.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRequest {
    pub prevent_id: i64,
    pub participants: Vec<Participant>,
}

/// Результат `begin_payment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStart {
    /// Преференция уже есть и всё ещё актуальна.
    Ready(CheckoutHandoff),
    /// Нужно создать новую преференцию.
    Request(PreferenceRequest),
}

#[derive(Debug)]
pub struct Wizard {
    id: Uuid,
    event: Event,
    options: WizardOptions,
    initial_prevent: Option<i64>,
    draft: DraftReservation,
}

impl Wizard {
    pub fn new(event: Event, options: WizardOptions) -> Result<Self, WizardError> {
        let initial_prevent = match options.tier_selection {
            TierSelection::Choose => {
                if event.selectable_prevents().next().is_none() {
                    return Err(WizardError::NoSelectablePrevent(event.id));
                }
                None
            }
            TierSelection::Fixed => Some(
                event
                    .suggested_prevent()
                    .ok_or(WizardError::NoSelectablePrevent(event.id))?
                    .id,
            ),
        };

        let layout = StepLayout::new(options.tier_selection == TierSelection::Choose, 1);
        let wizard = Self {
            id: Uuid::new_v4(),
            draft: DraftReservation::new(initial_prevent, layout.first()),
            event,
            options,
            initial_prevent,
        };

        info!(
            wizard_id = %wizard.id,
            event_id = wizard.event.id,
            prevent_id = ?initial_prevent,
            hosted_wallet = wizard.hosted_wallet_enabled(),
            "Ticket wizard opened"
        );
        Ok(wizard)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn options(&self) -> &WizardOptions {
        &self.options
    }

    pub fn draft(&self) -> &DraftReservation {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.draft.step
    }

    pub fn layout(&self) -> StepLayout {
        StepLayout::new(
            self.options.tier_selection == TierSelection::Choose,
            self.draft.ticket_count(),
        )
    }

    pub fn step_index(&self) -> usize {
        self.layout().index_of(self.draft.step)
    }

    pub fn total_steps(&self) -> usize {
        self.layout().total_steps()
    }

    pub fn is_submitting(&self) -> bool {
        self.draft.submitting
    }

    pub fn is_finished(&self) -> bool {
        self.draft.step.is_terminal()
    }

    pub fn hosted_wallet_enabled(&self) -> bool {
        self.options.wallet_public_key.is_some()
    }

    pub fn selected_prevent(&self) -> Option<&Prevent> {
        self.draft
            .prevent_id
            .and_then(|id| self.event.selectable_prevent(id))
    }

    pub fn totals(&self) -> Totals {
        pricing::compute_totals(
            self.selected_prevent().map(|prevent| prevent.price),
            self.draft.ticket_count(),
            self.draft.payment_method,
        )
    }

    /// Данные для виджета кошелька, если преференция уже создана.
    pub fn checkout(&self) -> Option<CheckoutHandoff> {
        if self.draft.payment_method != PaymentMethod::HostedWallet
            || self.draft.step != WizardStep::ContactPayment
        {
            return None;
        }
        self.draft
            .preference
            .as_ref()
            .and_then(|preference| self.handoff(preference))
    }

    // --- Редактирование черновика ---

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.draft.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if self.is_finished() {
            return Err(WizardError::Closed);
        }
        Ok(())
    }

    /// Старая преференция ссылается на старое количество или тариф.
    fn invalidate_preference(&mut self, reason: &'static str) {
        if let Some(preference) = self.draft.preference.take() {
            info!(
                wizard_id = %self.id,
                preference_id = %preference.preference_id,
                reason,
                "Dropping payment preference"
            );
        }
    }

    pub fn select_prevent(&mut self, prevent_id: i64) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let selected = self
            .event
            .selectable_prevent(prevent_id)
            .ok_or(WizardError::UnknownPrevent(prevent_id))?
            .id;

        if self.draft.prevent_id != Some(selected) {
            self.draft.prevent_id = Some(selected);
            self.invalidate_preference("tier changed");
            debug!(wizard_id = %self.id, prevent_id, "Price tier selected");
        }
        Ok(())
    }

    pub fn set_ticket_count(&mut self, count: usize) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if count == 0 || count > self.options.max_tickets {
            return Err(WizardError::InvalidTicketCount {
                count,
                max: self.options.max_tickets,
            });
        }

        if count != self.draft.ticket_count() {
            self.draft.roster = roster::resize(&self.draft.roster, count);
            self.draft.step = self.layout().clamp(self.draft.step);
            self.invalidate_preference("ticket count changed");
            debug!(
                wizard_id = %self.id,
                count,
                total_steps = self.total_steps(),
                "Ticket count changed"
            );
        }
        Ok(())
    }

    pub fn update_participant(&mut self, index: usize, field: ParticipantField) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let len = self.draft.ticket_count();
        if index >= len {
            return Err(WizardError::ParticipantOutOfRange { index, len });
        }

        let updated = roster::update(&self.draft.roster, index, field);
        if updated != self.draft.roster {
            self.draft.roster = updated;
            self.invalidate_preference("participant changed");
        }
        Ok(())
    }

    pub fn set_contact_email(&mut self, email: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let email = email.into();
        if email != self.draft.contact_email {
            self.draft.contact_email = email;
            // email уходит в преференцию вместе с участниками
            self.invalidate_preference("contact email changed");
        }
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if method == PaymentMethod::HostedWallet && !self.hosted_wallet_enabled() {
            return Err(WizardError::HostedWalletUnavailable);
        }

        if method != self.draft.payment_method {
            self.draft.payment_method = method;
            self.invalidate_preference("payment method changed");
            debug!(wizard_id = %self.id, ?method, "Payment method changed");
        }
        Ok(())
    }

    pub fn attach_proof(&mut self, proof: ProofFile) -> Result<(), WizardError> {
        self.ensure_editable()?;
        proof.check(self.options.max_proof_bytes)?;
        let proof = proof.normalized();

        debug!(wizard_id = %self.id, file_name = %proof.file_name, size = proof.bytes.len(), "Proof attached");
        self.draft.proof = Some(proof);
        Ok(())
    }

    pub fn clear_proof(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.proof = None;
        Ok(())
    }

    // --- Навигация ---

    /// Переход вперёд, если текущий шаг заполнен. При ошибке состояние не меняется.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        let step = self.draft.step;

        if !validation::can_advance(step, &self.draft) {
            debug!(wizard_id = %self.id, %step, "Step validation failed");
            return Err(WizardError::ValidationFailed { step });
        }

        self.draft.step = self.layout().next(step);
        Ok(self.draft.step)
    }

    /// Шаг назад без проверки. Преференция сохраняется.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        self.draft.step = self.layout().previous(self.draft.step);
        Ok(self.draft.step)
    }

    /// Полный сброс черновика; родитель закрывает мастер.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.reset(Completion::Cancelled);
        Ok(())
    }

    fn reset(&mut self, completion: Completion) {
        self.draft = DraftReservation::new(self.initial_prevent, WizardStep::Done(completion));
        info!(wizard_id = %self.id, ?completion, "Ticket wizard closed");
    }

    /// Общие проверки перед отправкой с последнего шага.
    fn ensure_ready_to_submit(&self, method: PaymentMethod) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if self.draft.step != WizardStep::ContactPayment {
            return Err(WizardError::NotOnFinalStep);
        }
        if self.draft.payment_method != method {
            return Err(WizardError::WrongPaymentMethod);
        }
        if !validation::can_advance(WizardStep::ContactPayment, &self.draft) {
            debug!(wizard_id = %self.id, "Final step validation failed");
            return Err(WizardError::ValidationFailed {
                step: WizardStep::ContactPayment,
            });
        }
        Ok(())
    }

    fn stamped_participants(&self) -> Vec<Participant> {
        roster::stamp_email(&self.draft.roster, self.draft.contact_email.trim())
    }

    fn start_submitting(&mut self) {
        self.draft.submitting = true;
        self.draft.step = WizardStep::Submitting;
    }

    fn stop_submitting(&mut self) {
        self.draft.submitting = false;
        self.draft.step = WizardStep::ContactPayment;
    }

    // --- Оплата переводом ---

    /// Проверяет черновик и собирает заявку. Ставит флаг отправки.
    pub fn begin_transfer(&mut self) -> Result<TicketSubmission, WizardError> {
        self.ensure_ready_to_submit(PaymentMethod::Transfer)?;

        let submission = TicketSubmission {
            event_id: self.event.id,
            prevent_id: self.draft.prevent_id,
            clients: self.stamped_participants(),
            proof: self.draft.proof.clone(),
        };
        self.start_submitting();

        info!(
            wizard_id = %self.id,
            event_id = submission.event_id,
            participants = submission.clients.len(),
            "Transfer submission started"
        );
        Ok(submission)
    }

    /// Применяет ответ шлюза. При ошибке данные остаются, можно повторить.
    pub fn finish_transfer(
        &mut self,
        result: GatewayResult<TicketReceipt>,
    ) -> Result<TicketReceipt, WizardError> {
        if !self.draft.submitting {
            warn!(wizard_id = %self.id, "Transfer result arrived without a submission in flight");
            return Err(WizardError::NoSubmissionInFlight);
        }
        self.stop_submitting();

        match result {
            Ok(receipt) => {
                info!(wizard_id = %self.id, "Tickets requested, waiting for transfer validation");
                self.reset(Completion::TicketsRequested);
                Ok(receipt)
            }
            Err(e) => {
                warn!(wizard_id = %self.id, error = %e, "Transfer submission failed");
                Err(e.into())
            }
        }
    }

    pub async fn submit_transfer(
        &mut self,
        gateway: &dyn TicketGateway,
    ) -> Result<TicketReceipt, WizardError> {
        let submission = self.begin_transfer()?;
        let result = gateway.create_ticket_request(submission).await;
        self.finish_transfer(result)
    }

    // --- Оплата кошельком ---

    fn handoff(&self, preference: &PaymentPreference) -> Option<CheckoutHandoff> {
        let public_key = preference
            .public_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .or(self.options.wallet_public_key.as_deref())?;

        Some(CheckoutHandoff {
            preference_id: preference.preference_id.clone(),
            public_key: public_key.to_string(),
        })
    }

    /// Возвращает готовую преференцию или запрос на новую (тогда ставит флаг отправки).
    pub fn begin_payment(&mut self) -> Result<PaymentStart, WizardError> {
        if self.draft.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if !self.hosted_wallet_enabled() {
            return Err(WizardError::HostedWalletUnavailable);
        }
        self.ensure_ready_to_submit(PaymentMethod::HostedWallet)?;

        if let Some(handoff) = self.checkout() {
            debug!(wizard_id = %self.id, preference_id = %handoff.preference_id, "Reusing payment preference");
            return Ok(PaymentStart::Ready(handoff));
        }

        let prevent_id = self.draft.prevent_id.ok_or(WizardError::ValidationFailed {
            step: WizardStep::TierSelect,
        })?;
        let request = PreferenceRequest {
            prevent_id,
            participants: self.stamped_participants(),
        };
        self.start_submitting();

        info!(
            wizard_id = %self.id,
            prevent_id,
            participants = request.participants.len(),
            "Payment preference requested"
        );
        Ok(PaymentStart::Request(request))
    }

    pub fn finish_payment(
        &mut self,
        result: GatewayResult<PaymentPreference>,
    ) -> Result<CheckoutHandoff, WizardError> {
        if !self.draft.submitting {
            warn!(wizard_id = %self.id, "Preference result arrived without a request in flight");
            return Err(WizardError::NoSubmissionInFlight);
        }
        self.stop_submitting();

        let preference = result.map_err(|e| {
            warn!(wizard_id = %self.id, error = %e, "Payment preference failed");
            WizardError::from(e)
        })?;

        let handoff = self
            .handoff(&preference)
            .ok_or(WizardError::Checkout(CheckoutError::MissingPublicKey))?;
        self.draft.preference = Some(preference);

        info!(wizard_id = %self.id, preference_id = %handoff.preference_id, "Ready for hosted checkout");
        Ok(handoff)
    }

    pub async fn go_to_pay(&mut self, gateway: &dyn TicketGateway) -> Result<CheckoutHandoff, WizardError> {
        match self.begin_payment()? {
            PaymentStart::Ready(handoff) => Ok(handoff),
            PaymentStart::Request(request) => {
                let result = gateway
                    .create_payment_preference(request.prevent_id, &request.participants)
                    .await;
                self.finish_payment(result)
            }
        }
    }

    /// Ошибка виджета: преференцию выбрасываем, остальное не трогаем.
    pub fn report_checkout_error(&mut self, error: CheckoutError) -> WizardError {
        warn!(wizard_id = %self.id, error = %error, "Hosted checkout failed");
        self.invalidate_preference("checkout widget error");
        WizardError::Checkout(error)
    }
}
