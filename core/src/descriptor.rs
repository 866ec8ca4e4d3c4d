//! Notification descriptors and the default `ModelKey` codec.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::{keys, Envelope, NotificationName};
use crate::{HeraldError, Result};

/// Typed pairing of a notification channel with its payload.
///
/// A descriptor owns both halves of the contract: `encode` turns a payload
/// into an [`Envelope`] and `decode` turns an envelope back into a payload.
/// Keeping both in one impl is what makes the pairing reviewable; the
/// [`BroadcastCenter`](crate::BroadcastCenter) itself knows nothing about
/// payload types.
///
/// The provided methods implement the default codec: the payload is stored
/// whole under [`keys::MODEL_KEY`]. For default-codec descriptors
/// `decode(&encode(p)?)? == p` for every payload representable as JSON.
///
/// Descriptors for envelopes shaped by someone else (a host framework, a
/// device driver) override `decode` to read that layout, and usually
/// override `encode` too so tests can fabricate such envelopes.
///
/// # Examples
///
/// ```
/// use herald_core::{NotificationDescriptor, NotificationName};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Posted {
///     name: String,
///     kind: String,
/// }
///
/// struct CustomNotification;
///
/// impl NotificationDescriptor for CustomNotification {
///     type Payload = Posted;
///
///     fn name(&self) -> NotificationName {
///         "CustomNotificationPosted".into()
///     }
/// }
///
/// let payload = Posted { name: "Notification".into(), kind: "Custom".into() };
/// let env = CustomNotification.encode(payload.clone()).unwrap();
/// assert_eq!(env.name.as_str(), "CustomNotificationPosted");
/// assert_eq!(CustomNotification.decode(&env).unwrap(), payload);
/// ```
pub trait NotificationDescriptor {
    type Payload: Serialize + DeserializeOwned;

    /// Channel this descriptor posts and observes on.
    fn name(&self) -> NotificationName;

    fn encode(&self, payload: Self::Payload) -> Result<Envelope> {
        encode_model(self.name(), &payload)
    }

    fn decode(&self, envelope: &Envelope) -> Result<Self::Payload> {
        decode_model(&self.name(), envelope)
    }
}

/// Default codec: wraps `payload` under [`keys::MODEL_KEY`].
///
/// Fails when the payload has no faithful JSON form: serialization errors
/// (e.g. a map with non-string keys) and values serde_json silently turns
/// into `null` (NaN, infinities) that `P` cannot read back.
///
/// Payloads whose distinct values share one JSON form, such as `Some(())`
/// and `None` (both `null`), encode fine but decode to the same value.
pub fn encode_model<P: Serialize + DeserializeOwned>(
    name: NotificationName,
    payload: &P,
) -> Result<Envelope> {
    let value = serde_json::to_value(payload)
        .and_then(|value| P::deserialize(&value).map(|_| value))
        .map_err(|source| HeraldError::Encode {
            name: name.clone(),
            source,
        })?;
    Ok(Envelope::new(name).with_value(keys::MODEL_KEY, value))
}

/// Default codec: reads [`keys::MODEL_KEY`] from an envelope posted on `name`.
pub fn decode_model<P: DeserializeOwned>(name: &NotificationName, envelope: &Envelope) -> Result<P> {
    if &envelope.name != name {
        return Err(HeraldError::ChannelMismatch {
            expected: name.clone(),
            actual: envelope.name.clone(),
        });
    }
    decode_key(envelope, keys::MODEL_KEY)
}

/// Reads one metadata key and checks it has the shape of `P`.
///
/// Building block for descriptors whose payload is spread over several keys.
pub fn decode_key<P: DeserializeOwned>(envelope: &Envelope, key: &str) -> Result<P> {
    let value = envelope
        .value(key)
        .ok_or_else(|| HeraldError::MissingKey {
            name: envelope.name.clone(),
            key: key.to_string(),
        })?;
    P::deserialize(value).map_err(|source| HeraldError::TypeMismatch {
        name: envelope.name.clone(),
        key: key.to_string(),
        expected: std::any::type_name::<P>(),
        source,
    })
}
