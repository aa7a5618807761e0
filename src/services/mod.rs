pub mod actions;
pub mod booking_flow;
pub mod identity;
pub mod scheduling;
pub mod slot_filling;
pub mod temporal;
