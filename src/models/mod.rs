pub mod action;
pub mod form;
pub mod reservation;
pub mod session;
pub mod slots;

pub use action::{ActionRequest, ActionResponse, BotResponse, SlotEvent, Tracker};
pub use form::FormKind;
pub use reservation::{AvailabilityQuery, AvailabilityResult, ReservationRequest, ReservationResult};
pub use session::{FlowState, Session};
pub use slots::{DialogueSlots, SlotName, SlotUpdate};
