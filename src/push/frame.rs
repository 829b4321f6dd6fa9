//! Socket.IO text frame decoding.
//!
//! Only event packets matter here: `42["order:new",{...}]`, optionally with a
//! namespace (`42/kitchen,["order:new",{...}]`) or an ack id
//! (`4217["order:update",{...}]`). A bare `["event", payload]` array is
//! accepted too. Everything else (open, ping, connect acks) decodes to `None`.

use super::{PushError, PushEvent};
use crate::model::RawOrder;
use serde_json::Value;
use tracing::{debug, trace};

pub const NEW_ORDER: &str = "order:new";
pub const ORDER_UPDATE: &str = "order:update";

const EVENT_PACKET: &str = "42";

pub fn decode_frame(text: &str) -> Result<Option<PushEvent>, PushError> {
    let text = text.trim();
    let Some(array) = event_array(text) else {
        trace!(frame = text, "Not an event packet");
        return Ok(None);
    };

    let mut args = match serde_json::from_str::<Value>(array)? {
        Value::Array(args) => args.into_iter(),
        _ => return Err(PushError::Frame("event payload is not an array".to_string())),
    };
    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => return Err(PushError::Frame("missing event name".to_string())),
    };
    let body = args.next().unwrap_or(Value::Null);

    let event = match name.as_str() {
        NEW_ORDER => PushEvent::NewOrder(serde_json::from_value::<RawOrder>(body)?),
        ORDER_UPDATE => PushEvent::OrderUpdate(serde_json::from_value::<RawOrder>(body)?),
        other => {
            debug!(event = other, "Skipping unknown event");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

/// The JSON array part of an event packet.
fn event_array(text: &str) -> Option<&str> {
    if text.starts_with('[') {
        return Some(text);
    }
    let rest = text.strip_prefix(EVENT_PACKET)?;
    let rest = match rest.strip_prefix('/') {
        Some(namespaced) => &namespaced[namespaced.find(',')? + 1..],
        None => rest,
    };
    Some(rest.trim_start_matches(|c: char| c.is_ascii_digit()))
}
