#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod server;

/// Metadata key carrying the caller's deadline as defined by the gRPC HTTP/2 protocol.
pub const GRPC_TIMEOUT_METADATA_KEY: &str = "grpc-timeout";

/// Longest value the protocol allows in front of the unit suffix.
const MAX_TIMEOUT_DIGITS: usize = 8;

use std::time::Duration;

use tonic::Status;
use tonic::metadata::MetadataMap;

/// Decode the caller's remaining time budget from gRPC metadata.
///
/// Returns `Ok(None)` when the caller did not set a deadline.
///
/// # Errors
/// Returns `Status::invalid_argument` when the header is present but malformed.
pub fn extract_timeout(meta: &MetadataMap) -> Result<Option<Duration>, Status> {
    let Some(raw) = meta.get(GRPC_TIMEOUT_METADATA_KEY) else {
        return Ok(None);
    };

    let raw = raw
        .to_str()
        .map_err(|e| Status::invalid_argument(format!("invalid grpc-timeout metadata: {e}")))?;

    parse_grpc_timeout(raw).map(Some)
}

/// Parse a `grpc-timeout` value such as `250m` or `5S`.
///
/// Units: `H` hours, `M` minutes, `S` seconds, `m` milliseconds,
/// `u` microseconds, `n` nanoseconds.
///
/// # Errors
/// Returns `Status::invalid_argument` when the value does not follow the wire format.
pub fn parse_grpc_timeout(raw: &str) -> Result<Duration, Status> {
    let invalid = || Status::invalid_argument(format!("invalid grpc-timeout value '{raw}'"));

    if !raw.is_ascii() || raw.len() < 2 || raw.len() > MAX_TIMEOUT_DIGITS + 1 {
        return Err(invalid());
    }

    let (digits, unit) = raw.split_at(raw.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit {
        "H" => Ok(Duration::from_secs(value * 3600)),
        "M" => Ok(Duration::from_secs(value * 60)),
        "S" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_millis(value)),
        "u" => Ok(Duration::from_micros(value)),
        "n" => Ok(Duration::from_nanos(value)),
        _ => Err(invalid()),
    }
}
