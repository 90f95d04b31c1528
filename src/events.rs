//! Domain events published to the message bus when one is configured.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    AppointmentBooked {
        appointment_id: Uuid,
        branch: String,
        date: NaiveDate,
        time: String,
    },
    AppointmentCancelled {
        appointment_id: Uuid,
        branch: String,
    },
    AppointmentsAutoCompleted {
        count: u64,
    },
    OrderPlaced {
        order_id: Uuid,
        total: i64,
        currency: String,
    },
    PaymentSettled {
        order_id: Uuid,
        status: String,
    },
}

impl AppEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::AppointmentBooked { .. }
            | Self::AppointmentCancelled { .. }
            | Self::AppointmentsAutoCompleted { .. } => "tradepoint.appointments",
            Self::OrderPlaced { .. } | Self::PaymentSettled { .. } => "tradepoint.orders",
        }
    }
}

/// Fire-and-forget publish; event loss is acceptable, request failure is not.
pub async fn publish(nats: &Option<async_nats::Client>, event: AppEvent) {
    let Some(client) = nats else { return };
    let payload = match serde_json::to_vec(&event) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize event");
            return;
        }
    };
    if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!(error = %e, subject = event.subject(), "failed to publish event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = AppEvent::AppointmentsAutoCompleted { count: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "appointments_auto_completed");
        assert_eq!(json["count"], 3);
        assert_eq!(event.subject(), "tradepoint.appointments");
    }

    #[test]
    fn order_events_use_the_orders_subject() {
        let event = AppEvent::OrderPlaced {
            order_id: Uuid::nil(),
            total: 1500,
            currency: "USD".into(),
        };
        assert_eq!(event.subject(), "tradepoint.orders");
    }
}
