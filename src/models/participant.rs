use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[default]
    Hombre,
    Mujer,
    Otro,
}

/// Данные одного участника: один участник на один билет.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub full_name: String,
    pub phone: String,
    // Старые версии формы отправляли это поле как `dni`
    #[serde(alias = "dni")]
    pub doc_number: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    /// Пустая запись для нового билета.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Обязательные поля заполнены (пробелы не считаются).
    pub fn is_complete(&self) -> bool {
        [&self.full_name, &self.phone, &self.doc_number]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub(crate) fn apply(&mut self, field: ParticipantField) {
        match field {
            ParticipantField::FullName(value) => self.full_name = value,
            ParticipantField::Phone(value) => self.phone = value,
            ParticipantField::DocNumber(value) => self.doc_number = value,
            ParticipantField::Gender(value) => self.gender = value,
            ParticipantField::Email(value) => self.email = value,
        }
    }
}

/// Одно изменяемое поле участника вместе с новым значением.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantField {
    FullName(String),
    Phone(String),
    DocNumber(String),
    Gender(Gender),
    Email(Option<String>),
}
