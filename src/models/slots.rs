use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    UsuarioId,
    Fecha,
    Hora,
}

impl SlotName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::UsuarioId => "usuario_id",
            SlotName::Fecha => "fecha",
            SlotName::Hora => "hora",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "usuario_id" => Some(SlotName::UsuarioId),
            "fecha" => Some(SlotName::Fecha),
            "hora" => Some(SlotName::Hora),
            _ => None,
        }
    }
}

/// Partial update produced by a validator: `Some(v)` sets a slot, `None` clears it.
/// Slots absent from the map are left untouched.
pub type SlotUpdate = BTreeMap<SlotName, Option<String>>;

/// Working memory of one conversation. `fecha` holds `DD/MM/YYYY` and `hora`
/// holds `h:mm am|pm` once validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DialogueSlots {
    pub usuario_id: Option<String>,
    pub fecha: Option<String>,
    pub hora: Option<String>,
}

impl DialogueSlots {
    pub fn get(&self, name: SlotName) -> Option<&str> {
        let value = match name {
            SlotName::UsuarioId => &self.usuario_id,
            SlotName::Fecha => &self.fecha,
            SlotName::Hora => &self.hora,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_set(&self, name: SlotName) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: SlotName, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        match name {
            SlotName::UsuarioId => self.usuario_id = value,
            SlotName::Fecha => self.fecha = value,
            SlotName::Hora => self.hora = value,
        }
    }

    pub fn apply(&mut self, update: &SlotUpdate) {
        for (name, value) in update {
            self.set(*name, value.clone());
        }
    }

    /// Both halves of the booking time, if present.
    pub fn schedule(&self) -> Option<(&str, &str)> {
        Some((self.get(SlotName::Fecha)?, self.get(SlotName::Hora)?))
    }

    /// Builds slots from a dialogue engine's loosely typed slot map.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut slots = DialogueSlots::default();
        for (key, value) in map {
            if let Some(name) = SlotName::parse(key) {
                slots.set(name, slot_value_to_string(value));
            }
        }
        slots
    }
}

/// Strings pass through, numbers and booleans are rendered, null and
/// structured values count as unset.
pub fn slot_value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
