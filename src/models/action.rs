use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::slots::{slot_value_to_string, DialogueSlots, SlotName};

/// Body of a custom-action call from the dialogue engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    pub tracker: Tracker,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tracker {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub slots: Map<String, Value>,
    #[serde(default)]
    pub latest_message: LatestMessage,
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl Tracker {
    pub fn slots(&self) -> DialogueSlots {
        DialogueSlots::from_json_map(&self.slots)
    }

    pub fn metadata(&self) -> Map<String, Value> {
        self.latest_message.metadata.clone().unwrap_or_default()
    }

    /// Slot candidates from the trailing run of `slot` events, in event order.
    /// A slot written twice keeps its last value at the position of its first write.
    pub fn slots_to_validate(&self) -> Vec<(SlotName, Option<String>)> {
        let start = self
            .events
            .iter()
            .rposition(|ev| event_kind(ev) != Some("slot"))
            .map(|idx| idx + 1)
            .unwrap_or(0);

        let mut candidates: Vec<(SlotName, Option<String>)> = Vec::new();
        for ev in &self.events[start..] {
            if event_kind(ev) != Some("slot") {
                continue;
            }
            let Some(name) = ev.get("name").and_then(Value::as_str).and_then(SlotName::parse)
            else {
                continue;
            };
            let value = ev.get("value").and_then(slot_value_to_string);
            match candidates.iter_mut().find(|(n, _)| *n == name) {
                Some(existing) => existing.1 = value,
                None => candidates.push((name, value)),
            }
        }
        candidates
    }
}

fn event_kind(ev: &Value) -> Option<&str> {
    ev.get("event").and_then(Value::as_str)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    pub events: Vec<SlotEvent>,
    pub responses: Vec<BotResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotEvent {
    pub event: String,
    pub timestamp: Option<f64>,
    pub name: String,
    pub value: Option<String>,
}

impl SlotEvent {
    pub fn set(name: SlotName, value: Option<String>) -> Self {
        Self {
            event: "slot".to_string(),
            timestamp: None,
            name: name.as_str().to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotResponse {
    pub text: String,
}

impl ActionResponse {
    pub fn say(&mut self, text: impl Into<String>) {
        self.responses.push(BotResponse { text: text.into() });
    }

    pub fn set_slot(&mut self, name: SlotName, value: Option<String>) {
        self.events.push(SlotEvent::set(name, value));
    }
}
