use core::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of physical channels on the controller.
pub const CHANNEL_COUNT: usize = 3;

/// Full-scale value of a raw reading (10-bit analog-to-digital sample).
pub const RAW_MAX: i32 = 1023;

/// Identifies one physical channel on the controller.
///
/// ```
/// use common::channel::ChannelId;
/// let channel = ChannelId::try_from(1).expect("Failed to get ChannelId representation");
/// assert_eq!(channel.index(), 1);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId {
    index: usize,
}

/// Represents errors in creating or using the `ChannelId` type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The index is outside of the configured channel range.
    #[error("Channel index {0} is outside of [0, {CHANNEL_COUNT}).")]
    InvalidChannel(usize),
}

impl ChannelId {
    /// Get the underlying channel index.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl TryFrom<usize> for ChannelId {
    type Error = ChannelError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index >= CHANNEL_COUNT {
            return Err(ChannelError::InvalidChannel(index));
        }
        Ok(Self { index })
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<Channel: {}>", self.index)
    }
}
