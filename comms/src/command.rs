use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::envelope::{Envelope, EnvelopeError};

/// Payload of the queue commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCommand {
    // The track to add or remove, empty when the client sent none or a non-string.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub track_id: String,
}

/// Payload of the play command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCommand {
    // The track to start; when absent the room resumes or starts from the queue head.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_none"
    )]
    pub track_id: Option<String>,
}

// Track ids which are not strings are treated as absent, the command itself stays valid
fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(track_id) => Some(track_id),
        _ => None,
    })
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

/// A user command which can be sent to the server by a single connection.
/// All commands are processed in the context of the room the connection has joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum UserCommand {
    QueueAdd(TrackCommand),
    QueueRemove(TrackCommand),
    Play(PlayCommand),
    Pause,
    Next,
    Prev,
    /// Any `type` this server does not know about, kept so the caller can skip it
    Unrecognized(String),
}

impl TryFrom<Envelope> for UserCommand {
    type Error = EnvelopeError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let command = match envelope.kind.as_str() {
            "queue_add" => UserCommand::QueueAdd(envelope.payload_as()?),
            "queue_remove" => UserCommand::QueueRemove(envelope.payload_as()?),
            "play" => UserCommand::Play(envelope.payload_as()?),
            "pause" => UserCommand::Pause,
            "next" => UserCommand::Next,
            "prev" => UserCommand::Prev,
            _ => UserCommand::Unrecognized(envelope.kind),
        };

        Ok(command)
    }
}

impl From<UserCommand> for Envelope {
    fn from(command: UserCommand) -> Self {
        match command {
            UserCommand::QueueAdd(cmd) => Envelope::with_payload("queue_add", &cmd),
            UserCommand::QueueRemove(cmd) => Envelope::with_payload("queue_remove", &cmd),
            UserCommand::Play(cmd) => Envelope::with_payload("play", &cmd),
            UserCommand::Pause => Envelope::bare("pause"),
            UserCommand::Next => Envelope::bare("next"),
            UserCommand::Prev => Envelope::bare("prev"),
            UserCommand::Unrecognized(kind) => Envelope::bare(&kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &UserCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: UserCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    fn decode(raw: &str) -> UserCommand {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_queue_add_command() {
        let command = UserCommand::QueueAdd(TrackCommand {
            track_id: "song-1".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"type":"queue_add","payload":{"trackId":"song-1"}}"#,
        );
    }

    #[test]
    fn test_play_command_without_track() {
        let command = UserCommand::Play(PlayCommand::default());

        assert_command_serialization(&command, r#"{"type":"play","payload":{}}"#);
        assert_eq!(decode(r#"{"type":"play"}"#), command);
    }

    #[test]
    fn test_transport_commands_ignore_payload() {
        assert_eq!(decode(r#"{"type":"pause"}"#), UserCommand::Pause);
        assert_eq!(decode(r#"{"type":"next","payload":{}}"#), UserCommand::Next);
        assert_eq!(decode(r#"{"type":"prev","payload":null}"#), UserCommand::Prev);
    }

    #[test]
    fn test_queue_command_without_track_id_decodes_empty() {
        assert_eq!(
            decode(r#"{"type":"queue_remove","payload":{}}"#),
            UserCommand::QueueRemove(TrackCommand::default())
        );
    }

    #[test]
    fn test_unknown_type_is_kept_as_unrecognized() {
        assert_eq!(
            decode(r#"{"type":"shuffle","payload":{"seed":4}}"#),
            UserCommand::Unrecognized("shuffle".to_string())
        );
    }

    #[test]
    fn test_non_string_track_id_decodes_as_absent() {
        assert_eq!(
            decode(r#"{"type":"queue_add","payload":{"trackId":7}}"#),
            UserCommand::QueueAdd(TrackCommand::default())
        );
        assert_eq!(
            decode(r#"{"type":"queue_remove","payload":{"trackId":null}}"#),
            UserCommand::QueueRemove(TrackCommand::default())
        );
        assert_eq!(
            decode(r#"{"type":"play","payload":{"trackId":["A"]}}"#),
            UserCommand::Play(PlayCommand::default())
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(serde_json::from_str::<UserCommand>(r#"{"type":"queue_add","payload":"a"}"#).is_err());
        assert!(serde_json::from_str::<UserCommand>(r#"{"type":"play","payload":[1]}"#).is_err());
        assert!(serde_json::from_str::<UserCommand>("not json").is_err());
    }
}
