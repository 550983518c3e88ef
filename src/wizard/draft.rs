use crate::error::ProofError;
use crate::models::Participant;
use crate::services::gateway::PaymentPreference;
use crate::services::pricing::PaymentMethod;

use super::step::WizardStep;

/// Квитанция о переводе, загруженная пользователем.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ProofFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Принимаются только изображения и PDF не больше `limit` байт.
    pub fn check(&self, limit: usize) -> Result<(), ProofError> {
        if self.bytes.is_empty() {
            return Err(ProofError::Empty);
        }
        if self.bytes.len() > limit {
            return Err(ProofError::TooLarge {
                size: self.bytes.len(),
                limit,
            });
        }

        let content_type = normalize_content_type(&self.content_type);
        let accepted = match content_type.split_once('/') {
            Some(("image", subtype)) => is_mime_token(subtype),
            Some(("application", "pdf")) => true,
            _ => false,
        };
        if accepted {
            Ok(())
        } else {
            Err(ProofError::UnsupportedType(self.content_type.clone()))
        }
    }

    /// Тот же файл с приведённым MIME-типом: без пробелов, в нижнем регистре.
    /// В multipart уходит именно он.
    pub fn normalized(mut self) -> Self {
        self.content_type = normalize_content_type(&self.content_type);
        self
    }
}

fn normalize_content_type(content_type: &str) -> String {
    content_type.trim().to_ascii_lowercase()
}

// RFC 2045 token: без пробелов и разделителей
fn is_mime_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

// Содержимое файла в логах не нужно
impl std::fmt::Debug for ProofFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Черновик бронирования - рабочее состояние мастера.
///
/// Количество билетов не хранится отдельно: это длина списка участников.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftReservation {
    pub(crate) prevent_id: Option<i64>,
    pub(crate) roster: Vec<Participant>,
    pub(crate) contact_email: String,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) proof: Option<ProofFile>,
    pub(crate) preference: Option<PaymentPreference>,
    pub(crate) step: WizardStep,
    pub(crate) submitting: bool,
}

impl DraftReservation {
    /// Свежий черновик: один пустой участник, оплата переводом.
    pub fn new(prevent_id: Option<i64>, first_step: WizardStep) -> Self {
        Self {
            prevent_id,
            roster: vec![Participant::blank()],
            contact_email: String::new(),
            payment_method: PaymentMethod::default(),
            proof: None,
            preference: None,
            step: first_step,
            submitting: false,
        }
    }

    pub fn prevent_id(&self) -> Option<i64> {
        self.prevent_id
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn ticket_count(&self) -> usize {
        self.roster.len()
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn proof(&self) -> Option<&ProofFile> {
        self.proof.as_ref()
    }

    pub fn preference(&self) -> Option<&PaymentPreference> {
        self.preference.as_ref()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_and_pdf() {
        assert!(ProofFile::new("a.png", "image/png", vec![1]).check(10).is_ok());
        assert!(ProofFile::new("a.pdf", "Application/PDF", vec![1]).check(10).is_ok());
    }

    #[test]
    fn rejects_other_files() {
        assert_eq!(
            ProofFile::new("a.zip", "application/zip", vec![1]).check(10),
            Err(ProofError::UnsupportedType("application/zip".to_string()))
        );
        assert_eq!(
            ProofFile::new("a.png", "image/png", Vec::new()).check(10),
            Err(ProofError::Empty)
        );
        assert_eq!(
            ProofFile::new("a.png", "image/png", vec![0; 11]).check(10),
            Err(ProofError::TooLarge { size: 11, limit: 10 })
        );
    }

    #[test]
    fn padded_content_type_is_normalized() {
        let proof = ProofFile::new("r.png", " Image/PNG ", vec![1]);
        assert!(proof.check(10).is_ok());
        assert_eq!(proof.normalized().content_type, "image/png");
    }

    #[test]
    fn malformed_image_types_are_rejected() {
        for content_type in ["image/", "image/ png", "image/png; x", "imagepng"] {
            assert!(
                ProofFile::new("r", content_type, vec![1]).check(10).is_err(),
                "{content_type:?} was accepted"
            );
        }
    }

    #[test]
    fn debug_hides_file_contents() {
        let proof = ProofFile::new("recibo.jpg", "image/jpeg", vec![42; 3]);
        let rendered = format!("{proof:?}");
        assert!(rendered.contains("size: 3"));
        assert!(!rendered.contains("42"));
    }

    #[test]
    fn fresh_draft_holds_one_blank_participant() {
        let draft = DraftReservation::new(None, WizardStep::TierSelect);
        assert_eq!(draft.ticket_count(), 1);
        assert_eq!(draft.payment_method(), PaymentMethod::Transfer);
        assert!(!draft.is_submitting());
    }
}
