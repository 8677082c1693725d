//! Inbound task request types.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A named attachment supplied with a task; `url` may be a remote URL or a
/// data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name of the attachment.
    pub name: String,
    /// Location or inline data URI of the attachment content.
    pub url: String,
}

/// Which round of the pipeline a request targets.
///
/// Round 1 generates a fresh project; round 2 modifies a previously
/// published one. Callers send the round as either a JSON number or its
/// string form, so deserialization accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Round {
    /// Fresh generation.
    One,
    /// Modification of an existing project.
    Two,
}

impl Round {
    /// The numeric form used in callback payloads and status keys.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Round::One => 1,
            Round::Two => 2,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Round {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

struct RoundVisitor;

impl Visitor<'_> for RoundVisitor {
    type Value = Round;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("the round number 1 or 2, as an integer or string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Round, E> {
        match value {
            1 => Ok(Round::One),
            2 => Ok(Round::Two),
            other => Err(E::custom(format!("unsupported round: {other}"))),
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Round, E> {
        u64::try_from(value)
            .map_err(|_| E::custom(format!("unsupported round: {value}")))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Round, E> {
        match value.trim() {
            "1" => Ok(Round::One),
            "2" => Ok(Round::Two),
            other => Err(E::custom(format!("unsupported round: {other:?}"))),
        }
    }
}

impl<'de> Deserialize<'de> for Round {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RoundVisitor)
    }
}

/// One unit of work submitted to `POST /handle-task`.
///
/// Lives only for the duration of one round's background execution; the
/// repository host is the sole durable store of project state.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    /// Caller identity, echoed back in the callback payload.
    pub email: String,
    /// Project identifier; doubles as the repository name.
    pub task: String,
    /// Which round to run.
    pub round: Round,
    /// Caller-supplied correlation value, echoed back in the callback.
    pub nonce: String,
    /// Free-text description of the desired site.
    pub brief: String,
    /// Acceptance criteria; entries prefixed `js:` are browser expressions
    /// the generated site must satisfy.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Callback URL that receives the round outcome.
    pub evaluation_url: String,
    /// Attachments to embed in the generated site.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Shared credential checked by the request gate.
    pub secret: String,
}
