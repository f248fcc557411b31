//! JSON text framing shared by both ends of the socket.

use crate::error::ipc::IpcError;

use common::ErrorLocation;

use std::fmt::Display;
use std::panic::Location;

use futures_util::{Sink, SinkExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_tungstenite::tungstenite::Message;

/// Encode a frame as a WebSocket text message.
#[track_caller]
pub(crate) fn encode_frame<T: Serialize>(frame: &T) -> Result<Message, IpcError> {
    let json = serde_json::to_string(frame).map_err(|e| IpcError::FrameEncode {
        message: format!("Failed to encode frame: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    Ok(Message::Text(json.into()))
}

/// Decode a frame from the text of a WebSocket message.
#[track_caller]
pub(crate) fn decode_frame<T: DeserializeOwned>(text: &str) -> Result<T, IpcError> {
    serde_json::from_str(text).map_err(|e| IpcError::FrameDecode {
        message: format!("Failed to decode frame: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Encode and send one frame.
pub(crate) async fn send_frame<S, T>(write: &mut S, frame: &T) -> Result<(), IpcError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
    T: Serialize,
{
    let message = encode_frame(frame)?;

    write.send(message).await.map_err(|e| IpcError::Send {
        message: format!("Failed to send frame: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
