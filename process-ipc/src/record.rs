// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_core::{Error, Result, WorkerId};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize a job or completion as one JSON line.
pub fn encode_line<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode a record received from (or destined to) `worker`.
pub fn decode<T: DeserializeOwned>(worker: WorkerId, bytes: &[u8]) -> Result<T> {
    decode_from(Some(worker), bytes)
}

/// Decode a record read from a channel every worker writes to.
pub fn decode_shared<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    decode_from(None, bytes)
}

fn decode_from<T: DeserializeOwned>(worker: Option<WorkerId>, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Malformed {
        worker,
        reason: e.to_string(),
    })
}
