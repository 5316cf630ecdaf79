//! System tool invocations.
//!
//! Thin wrappers around the platform maintenance commands. Success is
//! judged from the exit status plus, where the tool reports errors with a
//! zero exit code, a substring check on stdout.

use crate::core::error::{Error, Result};
use serde::Serialize;
use std::process::Command;

/// Result of one tool invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    /// Tool that ran
    pub tool: String,
    /// Trimmed stdout for display
    pub detail: String,
}

#[cfg(windows)]
fn run_checked(tool: &str, args: &[&str], expect: Option<&str>) -> Result<ToolOutcome> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| Error::ToolFailed {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if let Some(marker) = expect {
        if !stdout.contains(marker) {
            return Err(Error::ToolFailed {
                tool: tool.to_string(),
                reason: format!("unexpected output: {}", stdout),
            });
        }
    }

    Ok(ToolOutcome {
        tool: tool.to_string(),
        detail: stdout,
    })
}

#[cfg(not(windows))]
fn unsupported(tool: &str) -> Error {
    Error::ToolFailed {
        tool: tool.to_string(),
        reason: "only available on Windows".to_string(),
    }
}

/// Flush the DNS resolver cache.
#[cfg(windows)]
pub fn flush_dns() -> Result<ToolOutcome> {
    run_checked("ipconfig", &["/flushdns"], Some("Successfully flushed"))
}

#[cfg(not(windows))]
pub fn flush_dns() -> Result<ToolOutcome> {
    Err(unsupported("ipconfig"))
}

/// Reset the Winsock catalog. Takes effect after a reboot.
#[cfg(windows)]
pub fn winsock_reset() -> Result<ToolOutcome> {
    run_checked("netsh", &["winsock", "reset"], None)
}

#[cfg(not(windows))]
pub fn winsock_reset() -> Result<ToolOutcome> {
    Err(unsupported("netsh"))
}

/// Release and renew the DHCP lease.
#[cfg(windows)]
pub fn renew_dhcp_lease() -> Result<ToolOutcome> {
    run_checked("ipconfig", &["/release"], None)?;
    run_checked("ipconfig", &["/renew"], None)
}

#[cfg(not(windows))]
pub fn renew_dhcp_lease() -> Result<ToolOutcome> {
    Err(unsupported("ipconfig"))
}

/// Run the Windows disk cleanup profile configured under sagerun:1.
#[cfg(windows)]
pub fn disk_cleanup() -> Result<ToolOutcome> {
    // cleanmgr opens its own window; spawn detached instead of waiting
    Command::new("cleanmgr")
        .args(["/sagerun:1"])
        .spawn()
        .map_err(|e| Error::ToolFailed {
            tool: "cleanmgr".to_string(),
            reason: e.to_string(),
        })?;

    Ok(ToolOutcome {
        tool: "cleanmgr".to_string(),
        detail: "Disk cleanup started".to_string(),
    })
}

#[cfg(not(windows))]
pub fn disk_cleanup() -> Result<ToolOutcome> {
    Err(unsupported("cleanmgr"))
}

/// Switch to the high-performance power plan.
#[cfg(windows)]
pub fn high_performance_power() -> Result<ToolOutcome> {
    run_checked("powercfg", &["/setactive", "SCHEME_MIN"], None)
}

#[cfg(not(windows))]
pub fn high_performance_power() -> Result<ToolOutcome> {
    Err(unsupported("powercfg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(windows))]
    fn test_tools_unsupported_off_windows() {
        for result in [
            flush_dns(),
            winsock_reset(),
            renew_dhcp_lease(),
            disk_cleanup(),
            high_performance_power(),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, Error::ToolFailed { .. }));
            assert!(err.to_string().contains("only available on Windows"));
        }
    }
}
