use serde::{Deserialize, Serialize};

use super::slots::{DialogueSlots, SlotName};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    AwaitingFields,
    AvailabilityChecked,
    Reserved,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingFields => "awaiting_fields",
            FlowState::AvailabilityChecked => "availability_checked",
            FlowState::Reserved => "reserved",
        }
    }
}

/// One active dialogue. Sessions never share state with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub sender_id: String,
    pub slots: DialogueSlots,
    pub state: FlowState,
}

impl Session {
    /// Rebuilds a session from slots held by the dialogue engine. Without a
    /// record of earlier turns, any partially filled booking counts as
    /// awaiting fields.
    pub fn resume(sender_id: impl Into<String>, slots: DialogueSlots) -> Self {
        let state = if slots.is_set(SlotName::Fecha) || slots.is_set(SlotName::Hora) {
            FlowState::AwaitingFields
        } else {
            FlowState::Idle
        };
        Self {
            sender_id: sender_id.into(),
            slots,
            state,
        }
    }

    pub fn transition(&mut self, to: FlowState) {
        if self.state != to {
            tracing::debug!(
                sender = %self.sender_id,
                from = self.state.as_str(),
                to = to.as_str(),
                "flow transition"
            );
            self.state = to;
        }
    }
}
