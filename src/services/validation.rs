//! Проверка шага перед переходом вперёд. Чистые функции без побочных эффектов.

use validator::ValidateEmail;

use crate::models::Participant;
use crate::services::pricing::PaymentMethod;
use crate::wizard::{DraftReservation, WizardStep};

/// Можно ли уйти с шага `step` с данными `draft`.
pub fn can_advance(step: WizardStep, draft: &DraftReservation) -> bool {
    match step {
        WizardStep::TierSelect => draft.prevent_id().is_some(),
        WizardStep::CountSelect => draft.ticket_count() >= 1,
        WizardStep::Participant(index) => draft
            .roster()
            .get(index)
            .is_some_and(Participant::is_complete),
        WizardStep::ContactPayment => {
            is_valid_email(draft.contact_email().trim())
                && (draft.payment_method() == PaymentMethod::HostedWallet
                    || draft.proof().is_some())
        }
        WizardStep::Submitting | WizardStep::Done(_) => false,
    }
}

/// Email в привычном виде `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    // validator пропускает домены без точки (user@localhost), нам такие не подходят
    email.validate_email()
        && email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::draft::ProofFile;

    fn complete_participant() -> Participant {
        Participant {
            full_name: "Ana Pérez".to_string(),
            phone: "1155554444".to_string(),
            doc_number: "30111222".to_string(),
            ..Participant::blank()
        }
    }

    #[test]
    fn tier_step_needs_a_selection() {
        let mut draft = DraftReservation::new(None, WizardStep::TierSelect);
        assert!(!can_advance(WizardStep::TierSelect, &draft));

        draft.prevent_id = Some(7);
        assert!(can_advance(WizardStep::TierSelect, &draft));
    }

    #[test]
    fn count_step_needs_at_least_one_ticket() {
        let mut draft = DraftReservation::new(Some(1), WizardStep::CountSelect);
        assert!(can_advance(WizardStep::CountSelect, &draft));

        draft.roster.clear();
        assert!(!can_advance(WizardStep::CountSelect, &draft));
    }

    #[test]
    fn participant_step_checks_required_fields() {
        let mut draft = DraftReservation::new(Some(1), WizardStep::Participant(0));
        assert!(!can_advance(WizardStep::Participant(0), &draft));

        draft.roster[0] = complete_participant();
        assert!(can_advance(WizardStep::Participant(0), &draft));
        // несуществующий участник никогда не валиден
        assert!(!can_advance(WizardStep::Participant(1), &draft));

        draft.roster[0].doc_number = "  ".to_string();
        assert!(!can_advance(WizardStep::Participant(0), &draft));
    }

    #[test]
    fn transfer_needs_email_and_proof() {
        let mut draft = DraftReservation::new(Some(1), WizardStep::ContactPayment);
        draft.contact_email = "ana@example.com".to_string();
        assert!(!can_advance(WizardStep::ContactPayment, &draft));

        draft.proof = Some(ProofFile::new("recibo.pdf", "application/pdf", vec![1, 2, 3]));
        assert!(can_advance(WizardStep::ContactPayment, &draft));

        draft.contact_email = "ana@".to_string();
        assert!(!can_advance(WizardStep::ContactPayment, &draft));
    }

    #[test]
    fn hosted_wallet_needs_only_email() {
        let mut draft = DraftReservation::new(Some(1), WizardStep::ContactPayment);
        draft.payment_method = PaymentMethod::HostedWallet;
        draft.contact_email = "ana@example.com".to_string();
        assert!(can_advance(WizardStep::ContactPayment, &draft));
    }

    #[test]
    fn service_states_never_advance() {
        let draft = DraftReservation::new(Some(1), WizardStep::Submitting);
        assert!(!can_advance(WizardStep::Submitting, &draft));
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("ana.perez+tickets@mail.example.com.ar"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana @example.com"));
    }
}
