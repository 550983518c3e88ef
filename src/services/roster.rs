//! Список участников: ровно одна запись на билет, позиции стабильны.

use crate::models::{Participant, ParticipantField};

/// Подгоняет список под `new_count`: хвост обрезается, новые пустые
/// записи добавляются в конец. Существующие записи не трогаются.
pub fn resize(roster: &[Participant], new_count: usize) -> Vec<Participant> {
    let mut resized: Vec<Participant> = roster.iter().take(new_count).cloned().collect();
    resized.resize_with(new_count, Participant::blank);
    resized
}

/// Возвращает копию списка с одним изменённым полем.
///
/// # Panics
///
/// Паникует, если `index` вне списка: это ошибка вызывающего кода,
/// а не пользовательская ошибка.
pub fn update(roster: &[Participant], index: usize, field: ParticipantField) -> Vec<Participant> {
    assert!(
        index < roster.len(),
        "participant index {index} out of bounds (roster has {})",
        roster.len()
    );

    let mut updated = roster.to_vec();
    updated[index].apply(field);
    updated
}

/// Копия списка, где каждому участнику проставлен контактный email.
pub fn stamp_email(roster: &[Participant], email: &str) -> Vec<Participant> {
    roster
        .iter()
        .cloned()
        .map(|participant| participant.with_email(email))
        .collect()
}
