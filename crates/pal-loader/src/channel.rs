//! Word-to-channel assignment.
//!
//! Word `i` of a configuration goes to channel `i / quota`. With the default
//! 4 × 8 bank, words 0–7 land on channel 0, 8–15 on 1, 16–23 on 2 and
//! 24–27 on 3.

use pal_core::{LoaderError, PalSettings, CONFIG_WORDS};

/// Channel geometry for one configuration shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPlan {
    channels: usize,
    quota: usize,
    config_words: usize,
}

impl ChannelPlan {
    /// A plan for `channels` channels of `quota` words carrying
    /// `config_words` words per configuration.
    pub fn new(channels: usize, quota: usize, config_words: usize) -> Result<Self, LoaderError> {
        if quota == 0 || channels.saturating_mul(quota) < config_words {
            return Err(LoaderError::InsufficientCapacity {
                channels,
                quota,
                required: config_words,
            });
        }
        Ok(Self {
            channels,
            quota,
            config_words,
        })
    }

    /// The plan described by `settings`, carrying one full device
    /// configuration.
    pub fn from_settings(settings: &PalSettings) -> Result<Self, LoaderError> {
        Self::new(settings.channels, settings.quota, CONFIG_WORDS)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Words per channel.
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Words per configuration.
    pub fn config_words(&self) -> usize {
        self.config_words
    }

    /// Channel carrying word `index`.
    pub fn channel_for(&self, index: usize) -> usize {
        index / self.quota
    }

    /// Words each channel receives for one full configuration.
    pub fn words_per_channel(&self) -> Vec<usize> {
        (0..self.channels)
            .map(|ch| {
                let start = ch.saturating_mul(self.quota);
                self.config_words.saturating_sub(start).min(self.quota)
            })
            .collect()
    }
}
