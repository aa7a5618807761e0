use crate::models::{DialogueSlots, FlowState, FormKind, Session, SlotName, SlotUpdate};
use crate::services::temporal::TemporalNormalizer;

pub const FECHA_REPROMPT: &str = "Fecha ej. 25/10/2025";
pub const HORA_REPROMPT: &str = "Hora ej. 8:00 pm";
pub const USUARIO_ID_REPROMPT: &str = "usuarioId debe ser numérico (ej. 1)";

/// Result of validating one field: the slots to write and, on rejection, the
/// correction prompt to show.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub update: SlotUpdate,
    pub prompt: Option<&'static str>,
}

impl Validation {
    fn accept(update: SlotUpdate) -> Self {
        Self {
            update,
            prompt: None,
        }
    }

    fn reject(field: SlotName, prompt: &'static str) -> Self {
        tracing::debug!(slot = field.as_str(), "slot value rejected");
        Self {
            update: SlotUpdate::from([(field, None)]),
            prompt: Some(prompt),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.prompt.is_some()
    }
}

/// Outcome of one form-filling turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFill {
    pub slots: DialogueSlots,
    pub update: SlotUpdate,
    pub prompts: Vec<&'static str>,
}

#[derive(Clone)]
pub struct SlotFillingController {
    normalizer: TemporalNormalizer,
}

impl SlotFillingController {
    pub fn new(normalizer: TemporalNormalizer) -> Self {
        Self { normalizer }
    }

    /// Validates `raw` for `field` against the slots as they stand right now.
    /// Date and time each look at the other slot to default the date to today.
    pub fn validate(&self, field: SlotName, raw: Option<&str>, slots: &DialogueSlots) -> Validation {
        let raw = raw.unwrap_or("");
        match field {
            SlotName::UsuarioId => match canonical_integer(raw) {
                Some(id) => Validation::accept(SlotUpdate::from([(field, Some(id))])),
                None => Validation::reject(field, USUARIO_ID_REPROMPT),
            },
            SlotName::Fecha => {
                if raw.trim().is_empty() && slots.is_set(SlotName::Hora) {
                    return Validation::accept(SlotUpdate::from([(
                        SlotName::Fecha,
                        Some(self.normalizer.today()),
                    )]));
                }
                match self.normalizer.parse_date(raw) {
                    Some(fecha) => Validation::accept(SlotUpdate::from([(field, Some(fecha))])),
                    None => Validation::reject(field, FECHA_REPROMPT),
                }
            }
            SlotName::Hora => match self.normalizer.parse_time(raw) {
                Some(hora) => {
                    let mut update = SlotUpdate::from([(SlotName::Hora, Some(hora))]);
                    if !slots.is_set(SlotName::Fecha) {
                        update.insert(SlotName::Fecha, Some(self.normalizer.today()));
                    }
                    Validation::accept(update)
                }
                None => Validation::reject(field, HORA_REPROMPT),
            },
        }
    }

    /// Runs one turn of `form`. The engine has already written the raw
    /// candidates, so validation starts from `slots` overlaid with them; each
    /// candidate is then validated in arrival order and written back before the
    /// next one runs. Slots outside the form pass through unvalidated.
    pub fn fill(
        &self,
        form: FormKind,
        slots: &DialogueSlots,
        candidates: &[(SlotName, Option<String>)],
    ) -> FormFill {
        let mut working = slots.clone();
        for (name, raw) in candidates {
            working.set(*name, raw.clone());
        }

        let mut fill = FormFill::default();
        for (name, raw) in candidates {
            if !form.requires(*name) {
                fill.update.insert(*name, raw.clone());
                continue;
            }
            let validation = self.validate(*name, raw.as_deref(), &working);
            working.apply(&validation.update);
            fill.update.extend(validation.update);
            if let Some(prompt) = validation.prompt {
                fill.prompts.push(prompt);
            }
        }

        tracing::debug!(
            form = form.as_str(),
            touched = fill.update.len(),
            rejected = fill.prompts.len(),
            "form turn validated"
        );
        fill.slots = working;
        fill
    }

    /// Runs one turn of `form` against `session` and keeps the validated slots.
    /// A rejected or still incomplete form leaves the session awaiting fields.
    pub fn fill_session(
        &self,
        form: FormKind,
        session: &mut Session,
        candidates: &[(SlotName, Option<String>)],
    ) -> FormFill {
        let fill = self.fill(form, &session.slots, candidates);
        session.slots = fill.slots.clone();

        let incomplete = !fill.prompts.is_empty() || !form.missing(&fill.slots).is_empty();
        if incomplete || session.state == FlowState::Idle {
            session.transition(FlowState::AwaitingFields);
        }
        fill
    }
}

/// Integer text of any size, trimmed, with a `+` sign and leading zeros dropped.
fn canonical_integer(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    Some(match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{digits}"),
        (false, false) => digits.to_string(),
    })
}
