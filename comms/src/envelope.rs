use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// [Envelope] is the tagged message shape used for both directions:
/// `{ "type": <string>, "payload": <optional object> }`
///
/// Commands and events are converted to and from this type, so the wire
/// format is declared only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Errors raised while turning an [Envelope] into a typed message
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("payload of '{kind}' must be a JSON object")]
    PayloadNotObject { kind: String },
    #[error("malformed payload for '{kind}': {source}")]
    MalformedPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing payload for '{kind}'")]
    MissingPayload { kind: String },
    #[error("unknown event type '{0}'")]
    UnknownType(String),
}

impl Envelope {
    /// An envelope without a payload
    pub fn bare(kind: &str) -> Self {
        Envelope {
            kind: String::from(kind),
            payload: None,
        }
    }

    /// An envelope carrying the given serializable payload
    pub fn with_payload<P: Serialize>(kind: &str, payload: &P) -> Self {
        Envelope {
            kind: String::from(kind),
            payload: Some(
                serde_json::to_value(payload).expect("payload types serialize to JSON objects"),
            ),
        }
    }

    /// Decode the payload into `P`.
    ///
    /// A missing or `null` payload decodes as an empty object, so payload
    /// types with defaulted fields accept it.
    pub fn payload_as<P: DeserializeOwned>(&self) -> Result<P, EnvelopeError> {
        let object = match &self.payload {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(value @ Value::Object(_)) => value.clone(),
            Some(_) => {
                return Err(EnvelopeError::PayloadNotObject {
                    kind: self.kind.clone(),
                })
            }
        };

        serde_json::from_value(object).map_err(|source| EnvelopeError::MalformedPayload {
            kind: self.kind.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        value: Option<String>,
    }

    #[test]
    fn test_bare_envelope_omits_payload() {
        let serialized = serde_json::to_string(&Envelope::bare("pause")).unwrap();
        assert_eq!(serialized, r#"{"type":"pause"}"#);
    }

    #[test]
    fn test_missing_and_null_payload_decode_as_empty_object() {
        let missing: Envelope = serde_json::from_str(r#"{"type":"x"}"#).unwrap();
        let null: Envelope = serde_json::from_str(r#"{"type":"x","payload":null}"#).unwrap();

        assert_eq!(missing.payload_as::<Sample>().unwrap(), Sample { value: None });
        assert_eq!(null.payload_as::<Sample>().unwrap(), Sample { value: None });
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let envelope = Envelope {
            kind: "x".into(),
            payload: Some(json!([1, 2, 3])),
        };

        assert!(matches!(
            envelope.payload_as::<Sample>(),
            Err(EnvelopeError::PayloadNotObject { .. })
        ));
    }

    #[test]
    fn test_payload_is_serialized_as_object() {
        #[derive(Serialize)]
        struct Track {
            track_id: &'static str,
        }

        let envelope = Envelope::with_payload("queue_add", &Track { track_id: "A" });
        assert_eq!(envelope.payload, Some(json!({ "track_id": "A" })));
    }

    #[test]
    fn test_missing_type_fails_to_deserialize() {
        assert!(serde_json::from_str::<Envelope>(r#"{"payload":{}}"#).is_err());
    }
}
