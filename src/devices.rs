//! Fixed device profiles captured for every target.

/// A named viewport/user-agent configuration emulated per capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    /// Stable name used in object keys and upload metadata.
    pub name: &'static str,
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
    /// Device scale factor.
    pub scale: f64,
    /// Whether the viewport emulates a mobile device.
    pub mobile: bool,
    /// User agent presented to the target site.
    pub user_agent: &'static str,
}

const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";

/// The profile set captured for every target, in capture order.
///
/// Desktop's 1080px height covers the above-the-fold band of a front page
/// on a large monitor.
pub const DEVICE_PROFILES: &[DeviceProfile] = &[
    DeviceProfile {
        name: "desktop",
        width: 1280,
        height: 1080,
        scale: 1.0,
        mobile: false,
        user_agent: DESKTOP_UA,
    },
    DeviceProfile {
        name: "mobile",
        width: 390,
        height: 844,
        scale: 3.0,
        mobile: true,
        user_agent: MOBILE_UA,
    },
];
