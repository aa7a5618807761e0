use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityQuery {
    pub fecha: String,
    pub hora: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityResult {
    pub disponible: bool,
    pub mensaje: Option<String>,
}

impl AvailabilityResult {
    /// Reads an availability answer out of a decoded body. Returns `None` when
    /// the body is not an object carrying a `disponible` key.
    pub fn from_json(data: &Value) -> Option<Self> {
        let obj = data.as_object()?;
        let disponible = obj.get("disponible")?;
        Some(Self {
            disponible: is_truthy(disponible),
            mensaje: obj.get("mensaje").and_then(message_text),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationRequest {
    #[serde(rename = "usuarioId")]
    pub usuario_id: String,
    pub fecha_reserva: String,
    pub hora_reserva: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationResult {
    pub id: Option<String>,
    pub mensaje: Option<String>,
}

impl ReservationResult {
    pub fn from_json(data: &Value) -> Self {
        let Some(obj) = data.as_object() else {
            return Self::default();
        };
        Self {
            id: obj.get("id").and_then(identifier_text),
            mensaje: obj.get("mensaje").and_then(message_text),
        }
    }
}

/// JSON truthiness: false, null, zero, empty strings and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_availability_result_shapes() {
        let result = AvailabilityResult::from_json(&json!({"disponible": true, "mensaje": "Libre"}));
        assert_eq!(
            result,
            Some(AvailabilityResult {
                disponible: true,
                mensaje: Some("Libre".to_string())
            })
        );

        let result = AvailabilityResult::from_json(&json!({"disponible": 0})).unwrap();
        assert!(!result.disponible);
        assert_eq!(result.mensaje, None);

        assert_eq!(AvailabilityResult::from_json(&json!({"ok": true})), None);
        assert_eq!(AvailabilityResult::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_reservation_request_wire_names() {
        let req = ReservationRequest {
            usuario_id: "3".to_string(),
            fecha_reserva: "25/10/2025".to_string(),
            hora_reserva: "8:00 pm".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"usuarioId": "3", "fecha_reserva": "25/10/2025", "hora_reserva": "8:00 pm"})
        );
    }

    #[test]
    fn test_reservation_result_id_forms() {
        assert_eq!(
            ReservationResult::from_json(&json!({"id": 7})).id.as_deref(),
            Some("7")
        );
        assert_eq!(
            ReservationResult::from_json(&json!({"id": "abc"})).id.as_deref(),
            Some("abc")
        );
        assert_eq!(ReservationResult::from_json(&json!({})).id, None);
        assert_eq!(ReservationResult::from_json(&json!("x")), ReservationResult::default());
    }
}
