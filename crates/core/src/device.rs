//! Device-fingerprint parsing.
//!
//! Refresh tokens are bound to the device that obtained them. Native clients
//! supply a stable `device_id`; browser clients do not, so we also derive a
//! coarse fingerprint from the user-agent string as the fallback binding.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Coarse device fingerprint derived from the transport layer at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

/// Ambient per-request device context collected by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct DeviceContext {
    /// `User-Agent` header, empty string when absent.
    pub user_agent: String,
    /// Client IP, when the transport layer can supply one.
    pub ip: Option<String>,
    /// Stable client-supplied device identifier (native apps only).
    pub device_id: Option<String>,
}

/// Parse a user-agent string into a [`DeviceInfo`] fingerprint.
///
/// Detection is deliberately coarse: the fingerprint is a binding aid, not a
/// source of truth. Unrecognized agents yield `device_type: "desktop"` with
/// no OS/browser.
pub fn parse_device_info(user_agent: &str, ip: Option<String>) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let device_type = if ua.is_empty() {
        None
    } else if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        Some("mobile".to_string())
    } else if ua.contains("tablet") || ua.contains("ipad") {
        Some("tablet".to_string())
    } else {
        Some("desktop".to_string())
    };

    let os = if ua.contains("windows") {
        Some("Windows")
    } else if ua.contains("mac os") {
        Some("macOS")
    } else if ua.contains("android") {
        Some("Android")
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ios") {
        Some("iOS")
    } else if ua.contains("linux") {
        Some("Linux")
    } else {
        None
    };

    // Order matters: Edge and Chrome user agents both contain "chrome", and
    // Chrome user agents contain "safari".
    let browser = if ua.contains("edg") {
        Some("Edge")
    } else if ua.contains("firefox") {
        Some("Firefox")
    } else if ua.contains("chrome") {
        Some("Chrome")
    } else if ua.contains("safari") {
        Some("Safari")
    } else {
        None
    };

    DeviceInfo {
        user_agent: user_agent.to_string(),
        ip,
        timestamp: chrono::Utc::now(),
        device_type,
        os: os.map(str::to_string),
        browser: browser.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_desktop_chrome() {
        let info = parse_device_info(CHROME_MAC, None);
        assert_eq!(info.device_type.as_deref(), Some("desktop"));
        assert_eq!(info.os.as_deref(), Some("macOS"));
        assert_eq!(info.browser.as_deref(), Some("Chrome"));
    }

    #[test]
    fn test_mobile_safari() {
        let info = parse_device_info(SAFARI_IPHONE, Some("10.0.0.1".into()));
        assert_eq!(info.device_type.as_deref(), Some("mobile"));
        assert_eq!(info.os.as_deref(), Some("iOS"));
        assert_eq!(info.browser.as_deref(), Some("Safari"));
        assert_eq!(info.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_empty_user_agent() {
        let info = parse_device_info("", None);
        assert_eq!(info.device_type, None);
        assert_eq!(info.os, None);
        assert_eq!(info.browser, None);
    }

    #[test]
    fn test_edge_is_not_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
            (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
        let info = parse_device_info(ua, None);
        assert_eq!(info.browser.as_deref(), Some("Edge"));
        assert_eq!(info.os.as_deref(), Some("Windows"));
    }
}
