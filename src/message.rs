//! Wire messages exchanged with devices on UDP port 38899.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;
use crate::status::StatusPayload;

type Result<T> = std::result::Result<T, Error>;

/// Protocol methods this controller issues.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    GetPilot,
    SetState,
}

/// A request datagram: `{"method": ..., "params": {...}}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Request<P> {
    pub method: Method,
    pub params: P,
}

impl Request<Map<String, Value>> {
    /// The status query, `{"method":"getPilot","params":{}}`.
    pub fn get_pilot() -> Self {
        Request {
            method: Method::GetPilot,
            params: Map::new(),
        }
    }
}

impl Request<StateParams> {
    pub fn set_state(params: StateParams) -> Self {
        Request {
            method: Method::SetState,
            params,
        }
    }
}

impl<P: Serialize> Request<P> {
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::JsonDump)
    }
}

/// Parameters of a `setState` request. Unset fields are omitted on the wire.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StateParams {
    pub state: Option<bool>,
    pub dimming: Option<u8>,
    #[serde(rename = "r")]
    pub red: Option<u8>,
    #[serde(rename = "g")]
    pub green: Option<u8>,
    #[serde(rename = "b")]
    pub blue: Option<u8>,
    pub temp: Option<u16>,
}

/// A status reply. Only the `result` document matters; replies without one
/// (errors, acknowledgements) carry no status.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct PilotResponse {
    #[serde(default)]
    pub result: Option<StatusPayload>,
}

impl PilotResponse {
    /// Extract the status document from a decoded reply, if it has one.
    pub fn status(reply: Value) -> Option<StatusPayload> {
        serde_json::from_value::<PilotResponse>(reply)
            .ok()
            .and_then(|r| r.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_pilot_shape() {
        assert_eq!(
            Request::get_pilot().to_value().unwrap(),
            json!({"method": "getPilot", "params": {}})
        );
    }

    #[test]
    fn test_set_state_shape() {
        let params = StateParams {
            state: Some(true),
            red: Some(255),
            green: Some(0),
            blue: Some(0),
            ..StateParams::default()
        };
        assert_eq!(
            Request::set_state(params).to_value().unwrap(),
            json!({"method": "setState", "params": {"state": true, "r": 255, "g": 0, "b": 0}})
        );
    }

    #[test]
    fn test_pilot_response_status() {
        let status = PilotResponse::status(json!({"method": "getPilot", "result": {"state": true}}));
        assert_eq!(status.unwrap().get("state"), Some(&json!(true)));

        assert!(PilotResponse::status(json!({"error": {"code": -32601}})).is_none());
        assert!(PilotResponse::status(json!({"result": 5})).is_none());
        assert!(PilotResponse::status(json!([1, 2, 3])).is_none());
    }
}
