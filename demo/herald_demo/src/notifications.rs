use herald_core::{decode_key, Envelope, NotificationDescriptor, NotificationName, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Payload of the app-defined notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posted {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// App-defined channel using the default `ModelKey` codec
pub struct CustomNotification;

impl NotificationDescriptor for CustomNotification {
    type Payload = Posted;

    fn name(&self) -> NotificationName {
        "CustomNotificationPosted".into()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyboardFrames {
    pub begin: Rect,
    pub end: Rect,
}

pub const FRAME_BEGIN_KEY: &str = "KeyboardFrameBegin";
pub const FRAME_END_KEY: &str = "KeyboardFrameEnd";

/// Keyboard-shown channel whose envelopes come from the windowing system
pub struct KeyboardDidShow;

impl NotificationDescriptor for KeyboardDidShow {
    type Payload = KeyboardFrames;

    fn name(&self) -> NotificationName {
        "KeyboardDidShow".into()
    }

    /// Reads the two frame keys the windowing system sets
    fn decode(&self, envelope: &Envelope) -> Result<KeyboardFrames> {
        Ok(KeyboardFrames {
            begin: decode_key(envelope, FRAME_BEGIN_KEY)?,
            end: decode_key(envelope, FRAME_END_KEY)?,
        })
    }

    /// Only used to simulate the system event
    fn encode(&self, payload: KeyboardFrames) -> Result<Envelope> {
        Ok(Envelope::new(self.name())
            .with_sender("window.main")
            .with_value(FRAME_BEGIN_KEY, json!(payload.begin))
            .with_value(FRAME_END_KEY, json!(payload.end)))
    }
}
