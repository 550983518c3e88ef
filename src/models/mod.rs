pub mod event;
pub mod participant;
pub mod prevent;
pub mod producer;

pub use event::{select_active_event, Event, EventStatus, WalletAccount};
pub use participant::{Gender, Participant, ParticipantField};
pub use prevent::{Prevent, PreventStatus};
pub use producer::{ApiResponse, Producer};
