//! Replaying adapters that replay recorded interactions.

pub mod filesystem;

pub use filesystem::ReplayingFileSystem;

use std::sync::Mutex;

use crate::cassette::replayer::CassetteReplayer;

/// Takes the next recorded output for `port::method`.
///
/// An exhausted cassette is reported as the port's error.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    Ok(replayer.next_interaction(port, method)?.output)
}

/// Extracts a Result from a cassette output JSON value.
///
/// Expects `{"ok": <value>}` or `{"err": "message"}`; a bare value is
/// treated as `ok`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}
