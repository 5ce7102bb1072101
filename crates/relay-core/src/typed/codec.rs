//! Dictionary codec: serde values <-> kind-tagged request dictionaries.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::revivable::Revivable;
use crate::domain::RequestDictionary;

/// Discriminator key added to every encoded dictionary.
pub const KIND_KEY: &str = "kind";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("request of kind '{0}' did not serialize to a JSON object")]
    NotAnObject(String),

    #[error("dictionary has no 'kind' field")]
    MissingKind,

    #[error("expected kind '{expected}', found '{found}'")]
    KindMismatch { expected: String, found: String },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn kind_of(dictionary: &RequestDictionary) -> Option<&str> {
    dictionary.get(KIND_KEY).and_then(Value::as_str)
}

/// Serialize `value` and tag it with `kind`.
pub fn encode_as<T: Serialize>(kind: &str, value: &T) -> Result<RequestDictionary, CodecError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.insert(KIND_KEY.to_string(), Value::String(kind.to_string()));
            Ok(map)
        }
        _ => Err(CodecError::NotAnObject(kind.to_string())),
    }
}

pub fn encode<T: Revivable>(request: &T) -> Result<RequestDictionary, CodecError> {
    encode_as(T::KIND, request)
}

/// Deserialize the dictionary body, ignoring the kind tag.
pub fn decode_payload<T: DeserializeOwned>(dictionary: &RequestDictionary) -> Result<T, CodecError> {
    let mut body = dictionary.clone();
    body.remove(KIND_KEY);
    Ok(serde_json::from_value(Value::Object(body))?)
}

pub fn decode<T: Revivable>(dictionary: &RequestDictionary) -> Result<T, CodecError> {
    let found = kind_of(dictionary).ok_or(CodecError::MissingKind)?;
    if found != T::KIND {
        return Err(CodecError::KindMismatch {
            expected: T::KIND.to_string(),
            found: found.to_string(),
        });
    }
    decode_payload(dictionary)
}

/// `encode`, falling back to an empty (not persisted) dictionary.
pub fn dictionary_or_empty<T: Revivable>(request: &T) -> RequestDictionary {
    encode(request).unwrap_or_else(|error| {
        warn!(kind = T::KIND, %error, "request is not revivable");
        RequestDictionary::new()
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::domain::{Request, RequestContext, RequestError};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct CheckIn {
        place: String,
        guests: u32,
    }

    impl Revivable for CheckIn {
        const KIND: &'static str = "test.check_in.v1";
    }

    #[async_trait]
    impl Request for CheckIn {
        fn title(&self) -> String {
            format!("check in at {}", self.place)
        }

        async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
            Ok(())
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Bare(u32);

    impl Revivable for Bare {
        const KIND: &'static str = "test.bare.v1";
    }

    #[async_trait]
    impl Request for Bare {
        fn title(&self) -> String {
            "bare".into()
        }

        async fn perform(&self, _ctx: RequestContext) -> Result<(), RequestError> {
            Ok(())
        }
    }

    #[test]
    fn encode_tags_the_kind() {
        let dictionary = encode(&CheckIn {
            place: "Lima".into(),
            guests: 2,
        })
        .unwrap();

        assert_eq!(kind_of(&dictionary), Some(CheckIn::KIND));
        assert_eq!(dictionary.get("place"), Some(&json!("Lima")));
    }

    #[test]
    fn decode_strips_the_tag_before_deserializing() {
        let original = CheckIn {
            place: "Cusco".into(),
            guests: 4,
        };
        let dictionary = encode(&original).unwrap();

        let revived: CheckIn = decode(&dictionary).unwrap();
        assert_eq!(revived, original);
    }

    #[test]
    fn decode_rejects_other_kinds() {
        let mut dictionary = encode(&CheckIn {
            place: "Quito".into(),
            guests: 1,
        })
        .unwrap();
        dictionary.insert(KIND_KEY.into(), json!("test.other.v1"));

        let err = decode::<CheckIn>(&dictionary).unwrap_err();
        assert!(matches!(err, CodecError::KindMismatch { .. }));
    }

    #[test]
    fn decode_requires_a_kind() {
        let dictionary = json!({ "place": "Quito", "guests": 1 })
            .as_object()
            .cloned()
            .unwrap();

        assert!(matches!(decode::<CheckIn>(&dictionary), Err(CodecError::MissingKind)));
    }

    #[test]
    fn non_object_values_are_not_revivable() {
        assert!(matches!(encode(&Bare(3)), Err(CodecError::NotAnObject(_))));
        assert!(dictionary_or_empty(&Bare(3)).is_empty());
    }
}
