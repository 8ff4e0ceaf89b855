use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// File mode of a tracked path.
///
/// Directories are not tracked: they are implied by `/` separators in paths.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Normal file (0o100644).
    #[default]
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000). Content is the link target.
    Symlink,
}

impl EntryMode {
    /// Octal mode value, as printed in diff headers.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Result<Self, TypeError> {
        match bits {
            0o100644 => Ok(Self::Regular),
            0o100755 => Ok(Self::Executable),
            0o120000 => Ok(Self::Symlink),
            other => Err(TypeError::UnknownMode(other)),
        }
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}
