//! Turns an operation name plus raw literal arguments into a typed
//! [`Operation`].
//!
//! | Literal        | Example          | Decodes to            |
//! |----------------|------------------|-----------------------|
//! | unsigned       | `u1000`          | `u64` / `u128`        |
//! | signed         | `25`, `-3`       | `i128`                |
//! | string         | `"device-123"`   | text between quotes   |
//! | principal      | `'ST1PQ...`      | [`Principal`]         |
//!
//! Principals may also be given without the leading `'`.

use impact_ledger::{DeviceId, Operation, Principal};

use crate::errors::{HostError, Result};

/// Decode one invocation. `caller` is only consulted by operations that act on
/// someone's behalf.
pub fn decode(function: &str, args: &[String], caller: Option<&str>) -> Result<Operation> {
    let op = match function {
        "donate" => {
            expect_arity(function, args, 2)?;
            Operation::Donate {
                charity: principal(&args[0])?,
                amount: uint(&args[1])?,
                caller: require_caller(function, caller)?,
            }
        }
        "release-funds" => {
            expect_arity(function, args, 1)?;
            Operation::ReleaseFunds {
                donation_id: uint(&args[0])?,
                caller: require_caller(function, caller)?,
            }
        }
        "get-donation" => {
            expect_arity(function, args, 1)?;
            Operation::GetDonation {
                donation_id: uint(&args[0])?,
            }
        }
        "get-charity-funds" => {
            expect_arity(function, args, 1)?;
            Operation::GetCharityFunds {
                charity: principal(&args[0])?,
            }
        }
        "register-device" => {
            expect_arity(function, args, 3)?;
            Operation::RegisterDevice {
                device_id: device_id(&args[0])?,
                project_id: uint(&args[1])?,
                device_type: string(&args[2])?.to_owned(),
            }
        }
        "update-device-reading" => {
            expect_arity(function, args, 3)?;
            Operation::UpdateDeviceReading {
                device_id: device_id(&args[0])?,
                timestamp: uint(&args[1])?,
                value: int(&args[2])?,
            }
        }
        "get-device-info" => {
            expect_arity(function, args, 1)?;
            Operation::GetDeviceInfo {
                device_id: device_id(&args[0])?,
            }
        }
        "get-project-impact" => {
            expect_arity(function, args, 1)?;
            Operation::GetProjectImpact {
                project_id: uint(&args[0])?,
            }
        }
        other => return Err(HostError::Decode(format!("unknown function `{other}`"))),
    };
    Ok(op)
}

fn expect_arity(function: &str, args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(HostError::Decode(format!(
            "`{function}` takes {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn require_caller(function: &str, caller: Option<&str>) -> Result<Principal> {
    let raw = caller
        .ok_or_else(|| HostError::Decode(format!("`{function}` requires a caller")))?;
    principal(raw)
}

// ─────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────

fn uint<T: TryFrom<u128>>(raw: &str) -> Result<T> {
    let digits = raw
        .strip_prefix('u')
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| HostError::Decode(format!("expected unsigned literal, got `{raw}`")))?;
    let value: u128 = digits
        .parse()
        .map_err(|_| HostError::Decode(format!("unsigned literal `{raw}` out of range")))?;
    T::try_from(value)
        .map_err(|_| HostError::Decode(format!("unsigned literal `{raw}` out of range")))
}

fn int(raw: &str) -> Result<i128> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HostError::Decode(format!(
            "expected signed literal, got `{raw}`"
        )));
    }
    raw.parse()
        .map_err(|_| HostError::Decode(format!("signed literal `{raw}` out of range")))
}

fn string(raw: &str) -> Result<&str> {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| HostError::Decode(format!("expected quoted string, got `{raw}`")))
}

fn principal(raw: &str) -> Result<Principal> {
    let raw = raw.strip_prefix('\'').unwrap_or(raw);
    Principal::new(raw).map_err(|e| HostError::Decode(e.to_string()))
}

fn device_id(raw: &str) -> Result<DeviceId> {
    DeviceId::new(string(raw)?).map_err(|e| HostError::Decode(e.to_string()))
}
