//! Processing block size.
//!
//! The host's script-processor callback runs once per block of
//! [`BufferSize`] sample frames. Only the seven power-of-two sizes the host
//! accepts can be represented, so a sound module can never hold an invalid
//! one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModuleError;

/// Sample frames per processing callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BufferSize {
    /// 256 frames.
    S256,
    /// 512 frames.
    S512,
    /// 1024 frames.
    S1024,
    /// 2048 frames.
    S2048,
    /// 4096 frames.
    S4096,
    /// 8192 frames.
    S8192,
    /// 16384 frames.
    S16384,
}

impl BufferSize {
    /// Every accepted size, smallest first.
    pub const ALL: [BufferSize; 7] = [
        BufferSize::S256,
        BufferSize::S512,
        BufferSize::S1024,
        BufferSize::S2048,
        BufferSize::S4096,
        BufferSize::S8192,
        BufferSize::S16384,
    ];

    /// Frame count.
    pub const fn frames(self) -> u32 {
        match self {
            BufferSize::S256 => 256,
            BufferSize::S512 => 512,
            BufferSize::S1024 => 1024,
            BufferSize::S2048 => 2048,
            BufferSize::S4096 => 4096,
            BufferSize::S8192 => 8192,
            BufferSize::S16384 => 16384,
        }
    }

    /// Picks a size from a user-agent style platform string.
    ///
    /// | Platform | Size |
    /// |----------|------|
    /// | Windows NT 6.1 / 6.2 / 6.3 / 10.0 | 1024 |
    /// | Windows NT 6.0 | 2048 |
    /// | Windows NT 5.1 / XP | 4096 |
    /// | iPhone / iPad / iPod | 2048 |
    /// | Mac / PPC | 1024 |
    /// | Linux / Android | 8192 |
    /// | anything else | 16384 |
    ///
    /// iOS devices are matched before macOS because their strings contain
    /// "Mac OS X".
    pub fn for_platform(platform: &str) -> Self {
        let has = |needle: &str| platform.contains(needle);
        if has("Windows NT 6.1")
            || has("Windows NT 6.2")
            || has("Windows NT 6.3")
            || has("Windows NT 10")
        {
            BufferSize::S1024
        } else if has("Windows NT 6.0") {
            BufferSize::S2048
        } else if has("Windows NT 5.1") || has("Windows XP") {
            BufferSize::S4096
        } else if has("iPhone") || has("iPad") || has("iPod") {
            BufferSize::S2048
        } else if has("Mac") || has("PPC") {
            BufferSize::S1024
        } else if has("Linux") || has("Android") {
            BufferSize::S8192
        } else {
            BufferSize::S16384
        }
    }

    /// Picks a size for the operating system this binary was built for.
    pub fn for_host_os() -> Self {
        let platform = match std::env::consts::OS {
            "windows" => "Windows NT 10.0",
            "ios" => "iPhone",
            "macos" => "Mac",
            "linux" | "android" => "Linux",
            other => other,
        };
        Self::for_platform(platform)
    }
}

impl TryFrom<u32> for BufferSize {
    type Error = ModuleError;

    fn try_from(frames: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.frames() == frames)
            .ok_or(ModuleError::InvalidBufferSize(frames))
    }
}

impl From<BufferSize> for u32 {
    fn from(size: BufferSize) -> Self {
        size.frames()
    }
}

impl fmt::Display for BufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frames())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_power_of_two_in_range() {
        for frames in [256, 512, 1024, 2048, 4096, 8192, 16384] {
            assert_eq!(BufferSize::try_from(frames).unwrap().frames(), frames);
        }
    }

    #[test]
    fn rejects_others() {
        for frames in [0, 128, 300, 1000, 32768] {
            assert!(matches!(
                BufferSize::try_from(frames),
                Err(ModuleError::InvalidBufferSize(f)) if f == frames
            ));
        }
    }

    #[test]
    fn platform_table() {
        let cases = [
            ("Mozilla/5.0 (Windows NT 10.0; Win64; x64)", 1024),
            ("Mozilla/5.0 (Windows NT 6.1; WOW64)", 1024),
            ("Mozilla/5.0 (Windows NT 6.0)", 2048),
            ("Mozilla/4.0 (compatible; Windows NT 5.1)", 4096),
            ("Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X)", 2048),
            ("Mozilla/5.0 (iPad; CPU OS 15_0 like Mac OS X)", 2048),
            ("Mozilla/5.0 (Macintosh; Intel Mac OS X 13_0)", 1024),
            ("Mozilla/5.0 (X11; Linux x86_64)", 8192),
            ("Mozilla/5.0 (Linux; Android 14)", 8192),
            ("Nintendo", 16384),
            ("", 16384),
        ];
        for (ua, frames) in cases {
            assert_eq!(BufferSize::for_platform(ua).frames(), frames, "{ua}");
        }
    }

    #[test]
    fn serde_as_integer() {
        let json = serde_json::to_string(&BufferSize::S2048).unwrap();
        assert_eq!(json, "2048");
        let size: BufferSize = serde_json::from_str("4096").unwrap();
        assert_eq!(size, BufferSize::S4096);
        assert!(serde_json::from_str::<BufferSize>("100").is_err());
    }
}
