//! Wire model and JSON codec for the glasses display host.
//!
//! This crate owns the payload shapes exchanged with the device host: page
//! layouts made of text, list and image containers going out, and hub input
//! events plus device status coming back. Field names follow the host API
//! exactly (including its `borderRdaius` spelling) because the firmware
//! matches on them.

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned by the encode/decode helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload could not be serialized to JSON.
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
    /// The raw text could not be parsed as the expected payload.
    #[error("failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Absolute pixel rectangle of a container on the 576x288 canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(rename = "xPosition")]
    pub x: u32,
    #[serde(rename = "yPosition")]
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

// =============================================================================
// CONTAINERS
// =============================================================================

/// A text container. Optional styling fields are omitted on the wire when unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContainer {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_length: Option<u32>,
    #[serde(rename = "containerID")]
    pub container_id: u32,
    pub container_name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_event_capture: Option<u8>,
}

impl TextContainer {
    /// Create a bare text container with no styling.
    pub fn new(container_id: u32, name: impl Into<String>, rect: Rect, content: impl Into<String>) -> Self {
        Self {
            rect,
            border_width: None,
            border_color: None,
            padding_length: None,
            container_id,
            container_name: name.into(),
            content: content.into(),
            is_event_capture: None,
        }
    }

    #[must_use]
    pub fn with_border(mut self, width: u32, color: Option<u32>) -> Self {
        self.border_width = Some(width);
        self.border_color = color;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding_length = Some(padding);
        self
    }

    #[must_use]
    pub fn with_event_capture(mut self, capture: bool) -> Self {
        self.is_event_capture = Some(u8::from(capture));
        self
    }
}

/// Row set rendered inside a list container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemContainer {
    pub item_count: u32,
    pub item_width: u32,
    pub is_item_select_border_en: u8,
    pub item_name: Vec<String>,
}

/// A selectable list container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainer {
    #[serde(flatten)]
    pub rect: Rect,
    pub border_width: u32,
    pub border_color: u32,
    #[serde(rename = "borderRdaius")]
    pub border_radius: u32,
    pub padding_length: u32,
    #[serde(rename = "containerID")]
    pub container_id: u32,
    pub container_name: String,
    pub is_event_capture: u8,
    pub item_container: ListItemContainer,
}

/// An image container. Pixels arrive separately via [`ImageRawDataUpdate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContainer {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(rename = "containerID")]
    pub container_id: u32,
    pub container_name: String,
}

// =============================================================================
// PAGE LAYOUT
// =============================================================================

/// Complete set of containers pushed in one call. Always a full replace.
///
/// `listObject` and `imageObject` are dropped from the wire when absent; the
/// host silently ignores layouts that carry an empty list array alongside
/// image containers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    pub text_object: Vec<TextContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_object: Option<Vec<ListContainer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_object: Option<Vec<ImageContainer>>,
    pub container_total_num: u32,
}

/// Raw pixel payload for an existing image container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRawDataUpdate {
    #[serde(rename = "containerID")]
    pub container_id: u32,
    pub container_name: String,
    pub image_data: Vec<u8>,
}

// =============================================================================
// DEVICE STATUS
// =============================================================================

/// Live connection state of the glasses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub connected: bool,
    /// Battery level as a percentage, always within `0..=100`.
    ///
    /// The host reports a JSON number that may be fractional or out of
    /// range. Decoding rounds to the nearest percent and clamps.
    #[serde(rename = "batteryLevel", deserialize_with = "battery_level")]
    pub battery_percent: u8,
}

fn battery_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let level = f64::deserialize(deserializer)?;
    if level.is_nan() {
        return Err(serde::de::Error::custom("batteryLevel is not a number"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(level.round().clamp(0.0, 100.0) as u8)
}

impl DeviceStatus {
    #[must_use]
    pub fn new(connected: bool, battery_percent: u8) -> Self {
        Self { connected, battery_percent: battery_percent.min(100) }
    }

    /// Short badge text shown on the phone: battery when connected.
    #[must_use]
    pub fn badge(&self) -> String {
        if self.connected { format!("{}%", self.battery_percent) } else { "Disconnected".to_owned() }
    }
}

/// Envelope returned by the host's device info call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub status: DeviceStatus,
}

// =============================================================================
// INPUT EVENTS
// =============================================================================

/// OS-level event type codes emitted by the glasses.
///
/// The firmware drops zero-valued fields, so a click frequently arrives with
/// no event type at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OsEventType {
    Click,
    ScrollTop,
    ScrollBottom,
    DoubleClick,
    ForegroundEnter,
    ForegroundExit,
    AbnormalExit,
    Other(i32),
}

impl OsEventType {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Click,
            1 => Self::ScrollTop,
            2 => Self::ScrollBottom,
            3 => Self::DoubleClick,
            4 => Self::ForegroundEnter,
            5 => Self::ForegroundExit,
            6 => Self::AbnormalExit,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Click => 0,
            Self::ScrollTop => 1,
            Self::ScrollBottom => 2,
            Self::DoubleClick => 3,
            Self::ForegroundEnter => 4,
            Self::ForegroundExit => 5,
            Self::AbnormalExit => 6,
            Self::Other(code) => code,
        }
    }
}

/// Interaction on a list container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_select_item_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_select_item_name: Option<String>,
}

/// System-level event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SysEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<i32>,
}

/// Interaction on a text container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<i32>,
}

/// Union event object delivered by the host. Any subset of the parts may be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_event: Option<ListEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_event: Option<SysEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_event: Option<TextEvent>,
}

impl HubEvent {
    /// A list click carrying the selected row index.
    #[must_use]
    pub fn list_click(index: i64) -> Self {
        Self {
            list_event: Some(ListEvent {
                event_type: Some(OsEventType::Click.code()),
                current_select_item_index: Some(index),
                current_select_item_name: None,
            }),
            ..Self::default()
        }
    }

    /// Event type resolved in priority order: list, then system, then text.
    /// `None` means the firmware sent no type at all.
    #[must_use]
    pub fn event_type(&self) -> Option<OsEventType> {
        self.list_event
            .as_ref()
            .and_then(|e| e.event_type)
            .or_else(|| self.sys_event.as_ref().and_then(|e| e.event_type))
            .or_else(|| self.text_event.as_ref().and_then(|e| e.event_type))
            .map(OsEventType::from_code)
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode any outbound payload as the host's JSON representation.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode<T: Serialize>(payload: &T) -> Result<String, CodecError> {
    serde_json::to_string(payload).map_err(CodecError::Encode)
}

/// Decode an inbound hub event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or mistyped fields.
pub fn decode_event(raw: &str) -> Result<HubEvent, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::Decode)
}

/// Decode a device info envelope. The battery level is rounded and clamped.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or mistyped fields.
pub fn decode_device_info(raw: &str) -> Result<DeviceInfo, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::Decode)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
