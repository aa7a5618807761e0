use serde::{Deserialize, Serialize};

use super::slots::{DialogueSlots, SlotName};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    /// Availability query: date and time only.
    Consulta,
    /// Direct reservation: user id plus date and time.
    Reserva,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Consulta => "consulta_form",
            FormKind::Reserva => "reserva_form",
        }
    }

    pub fn required_fields(&self) -> &'static [SlotName] {
        match self {
            FormKind::Consulta => &[SlotName::Fecha, SlotName::Hora],
            FormKind::Reserva => &[SlotName::UsuarioId, SlotName::Fecha, SlotName::Hora],
        }
    }

    pub fn requires(&self, name: SlotName) -> bool {
        self.required_fields().contains(&name)
    }

    pub fn missing(&self, slots: &DialogueSlots) -> Vec<SlotName> {
        self.required_fields()
            .iter()
            .copied()
            .filter(|name| !slots.is_set(*name))
            .collect()
    }
}
