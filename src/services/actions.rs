use crate::errors::AppError;
use crate::models::{ActionRequest, ActionResponse, FormKind, Session, SlotName};
use crate::services::booking_flow::{self, AvailabilityOutcome};
use crate::services::identity;
use crate::state::AppState;

pub const SET_USUARIO_FROM_SENDER: &str = "action_set_usuario_from_sender";
pub const VALIDATE_CONSULTA_FORM: &str = "validate_consulta_form";
pub const VALIDATE_RESERVA_FORM: &str = "validate_reserva_form";
pub const CONSULTAR_DISPONIBILIDAD: &str = "action_consultar_disponibilidad";
pub const CREAR_RESERVA: &str = "action_crear_reserva";

pub const ACTION_NAMES: [&str; 5] = [
    SET_USUARIO_FROM_SENDER,
    VALIDATE_CONSULTA_FORM,
    VALIDATE_RESERVA_FORM,
    CONSULTAR_DISPONIBILIDAD,
    CREAR_RESERVA,
];

/// Runs one named action for one dialogue turn. The tracker carries all
/// session state, so nothing is kept between calls.
pub async fn run_action(state: &AppState, request: &ActionRequest) -> Result<ActionResponse, AppError> {
    let tracker = &request.tracker;
    let sender_id = request
        .sender_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&tracker.sender_id);
    let mut session = Session::resume(sender_id, tracker.slots());
    let mut response = ActionResponse::default();

    tracing::info!(
        sender = %sender_id,
        action = %request.next_action,
        state = session.state.as_str(),
        "running action"
    );

    match request.next_action.as_str() {
        SET_USUARIO_FROM_SENDER => {
            let metadata = tracker.metadata();
            if let Some(id) = identity::apply_user_id(&mut session.slots, &metadata, sender_id) {
                response.set_slot(SlotName::UsuarioId, Some(id));
            }
        }
        VALIDATE_CONSULTA_FORM | VALIDATE_RESERVA_FORM => {
            let form = if request.next_action == VALIDATE_CONSULTA_FORM {
                FormKind::Consulta
            } else {
                FormKind::Reserva
            };
            let fill = state
                .slot_filling
                .fill_session(form, &mut session, &tracker.slots_to_validate());
            let missing: Vec<&str> = form.missing(&session.slots).iter().map(|n| n.as_str()).collect();
            tracing::debug!(
                form = form.as_str(),
                state = session.state.as_str(),
                missing = ?missing,
                "form state after validation"
            );
            for prompt in &fill.prompts {
                response.say(*prompt);
            }
            for (name, value) in fill.update {
                response.set_slot(name, value);
            }
        }
        CONSULTAR_DISPONIBILIDAD => {
            let outcome =
                booking_flow::check_availability(state.scheduling.as_ref(), &mut session).await;
            response.say(outcome.to_string());
            if let AvailabilityOutcome::Available { fecha, hora, .. } = outcome {
                response.set_slot(SlotName::Fecha, Some(fecha));
                response.set_slot(SlotName::Hora, Some(hora));
            }
        }
        CREAR_RESERVA => {
            let outcome =
                booking_flow::create_reservation(state.scheduling.as_ref(), &mut session).await;
            response.say(outcome.to_string());
        }
        other => return Err(AppError::UnknownAction(other.to_string())),
    }

    Ok(response)
}
