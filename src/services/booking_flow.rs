//! Availability check and reservation commit against the remote scheduler.
//!
//! Every path ends in a message for the user; nothing here is fatal and nothing
//! is retried. The remote service is the only authority on conflicts, so a
//! reservation can still fail after a successful check.

use std::fmt;

use crate::models::{
    AvailabilityQuery, AvailabilityResult, FlowState, ReservationRequest, ReservationResult,
    Session, SlotName,
};
use crate::services::scheduling::SchedulingApi;

const CREATED: u16 = 201;

#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityOutcome {
    MissingFields,
    Available {
        mensaje: String,
        fecha: String,
        hora: String,
    },
    Unavailable {
        mensaje: String,
        fecha: String,
        hora: String,
    },
    /// The body was not JSON.
    Undecodable { status: u16 },
    /// JSON without an availability flag, echoed back for diagnosis.
    Unrecognized { raw: String },
    Unreachable,
}

impl AvailabilityOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityOutcome::Available { .. })
    }
}

impl fmt::Display for AvailabilityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityOutcome::MissingFields => {
                write!(f, "Necesito la fecha y la hora para consultar.")
            }
            AvailabilityOutcome::Available {
                mensaje,
                fecha,
                hora,
            } => write!(f, "{mensaje} para {fecha} a las {hora}. ¿Deseas reservar?"),
            AvailabilityOutcome::Unavailable {
                mensaje,
                fecha,
                hora,
            } => write!(f, "{mensaje} para {fecha} a las {hora}."),
            AvailabilityOutcome::Undecodable { status } => write!(
                f,
                "Error interpretando la respuesta del servidor (HTTP {status})."
            ),
            AvailabilityOutcome::Unrecognized { raw } => {
                write!(f, "Respuesta del servidor: {raw}")
            }
            AvailabilityOutcome::Unreachable => {
                write!(f, "No pude consultar la disponibilidad en este momento.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReservationOutcome {
    MissingUserId,
    MissingSchedule,
    Created {
        id: Option<String>,
        fecha: String,
        hora: String,
    },
    Rejected {
        status: u16,
        mensaje: String,
    },
    Unreachable,
}

impl fmt::Display for ReservationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationOutcome::MissingUserId => write!(
                f,
                "No tengo tu usuario_id. Si usas REST, envía sender='user-<id>' o metadata {{'usuarioId': <id>}}."
            ),
            ReservationOutcome::MissingSchedule => write!(
                f,
                "No tengo registrada la fecha u hora. Primero consulta la disponibilidad."
            ),
            ReservationOutcome::Created { id, fecha, hora } => write!(
                f,
                "Reserva creada (ID: {}) para {fecha} a las {hora}.",
                id.as_deref().unwrap_or("desconocido")
            ),
            ReservationOutcome::Rejected { mensaje, .. } => write!(f, "❌ {mensaje}"),
            ReservationOutcome::Unreachable => write!(
                f,
                "❌ No pude crear la reserva. Puede que ese horario ya no esté libre."
            ),
        }
    }
}

pub async fn check_availability(
    api: &dyn SchedulingApi,
    session: &mut Session,
) -> AvailabilityOutcome {
    let Some((fecha, hora)) = session
        .slots
        .schedule()
        .map(|(f, h)| (f.to_string(), h.to_string()))
    else {
        session.transition(FlowState::AwaitingFields);
        return AvailabilityOutcome::MissingFields;
    };

    let query = AvailabilityQuery {
        fecha: fecha.clone(),
        hora: hora.clone(),
    };
    let resp = match api.check_availability(&query).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(error = %e, sender = %session.sender_id, "availability check failed");
            return AvailabilityOutcome::Unreachable;
        }
    };

    let data = match resp.json() {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, status = resp.status, "availability response is not JSON");
            return AvailabilityOutcome::Undecodable {
                status: resp.status,
            };
        }
    };

    let Some(result) = AvailabilityResult::from_json(&data) else {
        tracing::warn!(status = resp.status, "availability response has no disponible flag");
        return AvailabilityOutcome::Unrecognized {
            raw: data.to_string(),
        };
    };

    tracing::info!(
        sender = %session.sender_id,
        fecha = %fecha,
        hora = %hora,
        disponible = result.disponible,
        "availability checked"
    );

    if result.disponible {
        // These are the values a following reservation will use.
        session.slots.set(SlotName::Fecha, Some(fecha.clone()));
        session.slots.set(SlotName::Hora, Some(hora.clone()));
        session.transition(FlowState::AvailabilityChecked);
        AvailabilityOutcome::Available {
            mensaje: result
                .mensaje
                .unwrap_or_else(|| "Horario disponible".to_string()),
            fecha,
            hora,
        }
    } else {
        session.transition(FlowState::AwaitingFields);
        AvailabilityOutcome::Unavailable {
            mensaje: result.mensaje.unwrap_or_else(|| "No disponible".to_string()),
            fecha,
            hora,
        }
    }
}

pub async fn create_reservation(
    api: &dyn SchedulingApi,
    session: &mut Session,
) -> ReservationOutcome {
    let Some(usuario_id) = session.slots.get(SlotName::UsuarioId).map(str::to_string) else {
        session.transition(FlowState::AwaitingFields);
        return ReservationOutcome::MissingUserId;
    };
    let Some((fecha, hora)) = session
        .slots
        .schedule()
        .map(|(f, h)| (f.to_string(), h.to_string()))
    else {
        session.transition(FlowState::AwaitingFields);
        return ReservationOutcome::MissingSchedule;
    };

    let request = ReservationRequest {
        usuario_id,
        fecha_reserva: fecha.clone(),
        hora_reserva: hora.clone(),
    };
    let resp = match api.create_reservation(&request).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(error = %e, sender = %session.sender_id, "reservation request failed");
            return ReservationOutcome::Unreachable;
        }
    };

    if resp.status == CREATED {
        let result = resp
            .json()
            .map(|data| ReservationResult::from_json(&data))
            .unwrap_or_default();
        tracing::info!(
            sender = %session.sender_id,
            reservation_id = ?result.id,
            fecha = %fecha,
            hora = %hora,
            "reservation created"
        );
        session.transition(FlowState::Reserved);
        return ReservationOutcome::Created {
            id: result.id,
            fecha,
            hora,
        };
    }

    let mensaje = match resp.json() {
        Ok(data) if data.is_object() => ReservationResult::from_json(&data)
            .mensaje
            .unwrap_or_else(|| format!("Error {}", resp.status)),
        _ => format!("Error {} del servidor", resp.status),
    };
    tracing::warn!(status = resp.status, mensaje = %mensaje, "reservation rejected");
    ReservationOutcome::Rejected {
        status: resp.status,
        mensaje,
    }
}
