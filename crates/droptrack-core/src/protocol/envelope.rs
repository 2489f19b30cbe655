use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::config::delimiters::ENCODED_SPACE;
use crate::error::{Error, Result};

/// Message types identified by their envelope prefix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum MessageKind {
    #[strum(serialize = "1;118;")]
    Instance,
    #[strum(serialize = "3;1;")]
    FightStart,
    #[strum(serialize = "3;19;")]
    FightSummary,
    #[strum(serialize = "5;5;")]
    FightEnd,
    #[strum(serialize = "3;2;")]
    ActSignal,
    #[strum(serialize = "36;0;")]
    ItemPrices,
    #[strum(serialize = "50;0;")]
    ArtifactPrices,
}

impl MessageKind {
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        prefix.parse().ok()
    }

    pub fn prefix(&self) -> &'static str {
        self.into()
    }
}

/// One decoded frame split into its `major;minor;` prefix and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub prefix: String,
    pub payload: String,
}

impl Envelope {
    /// Decode frame bytes (lossy UTF-8) and split off the prefix.
    ///
    /// Encoded spaces (`%20`) in the payload are decoded.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(frame);
        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        let first = text
            .find(';')
            .ok_or_else(|| Error::MalformedFrame(format!("no prefix separator in {:?}", text)))?;
        let second = text[first + 1..]
            .find(';')
            .map(|pos| first + 1 + pos)
            .ok_or_else(|| Error::MalformedFrame(format!("incomplete prefix in {:?}", text)))?;

        Ok(Self {
            prefix: text[..=second].to_string(),
            payload: text[second + 1..].replace(ENCODED_SPACE, " "),
        })
    }

    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_prefix(&self.prefix)
    }
}
