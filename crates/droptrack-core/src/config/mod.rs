//! Configuration and support files.
//!
//! This module contains types for configuration and support files:
//! - `GameConfig` - boss rules, coefficient table and drop valuation knobs
//! - `Preferences` - tracked player name and feature toggles
//! - Stream, protocol and valuation constants

mod game_config;
mod preferences;

pub use game_config::*;
pub use preferences::*;

/// Stream reassembly configuration.
pub mod stream {
    /// Frame delimiter on the wire.
    pub const FRAME_DELIMITER: u8 = 0x00;

    /// Default ceiling for undelimited bytes held by the reassembler (16 MiB).
    pub const DEFAULT_MAX_BUFFER: usize = 16 * 1024 * 1024;

    /// Keep-alive chunk sent by the server between messages.
    pub const KEEPALIVE_CHUNK: &[u8] = b"99\0";

    /// Default read size for file and socket sources.
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;
}

/// Delimiters of the nested payload grammar.
pub mod delimiters {
    /// Instance envelope fields.
    pub const INSTANCE_FIELD: &str = "[$]";
    /// Fight summary participant entries.
    pub const SUMMARY_ENTRY: &str = "[--]";
    /// Fields of one participant entry.
    pub const ENTRY_FIELD: &str = "&";
    /// Records of an item, drif or equipment list.
    pub const RECORD: &str = "  ";
    /// Segments of one equipment or drif record.
    pub const SEGMENT: &str = "[-]";
    /// Property list inside an equipment segment.
    pub const PROPERTY: &str = "$";
    /// Comma list inside a property.
    pub const VALUE: &str = ",";
    /// Price broadcast entries.
    pub const PRICE_ENTRY: &str = "[&&]";
    /// Encoded space in payloads.
    pub const ENCODED_SPACE: &str = "%20";
}

/// Equipment valuation constants.
pub mod valuation {
    /// Multiplier applied to the raw base value of special-slot equipment.
    pub const SPECIAL_SLOT_MULTIPLIER: f64 = 0.3;

    /// Multiplier applied to the raw base value of trash-slot equipment.
    pub const TRASH_SLOT_MULTIPLIER: f64 = 0.025;

    /// Quality rank from which quoted items are priced in shards instead of essences.
    pub const SHARD_QUALITY_THRESHOLD: i64 = 7;

    /// Rows of the ornament/quality coefficient table.
    pub const COEFFICIENT_ROWS: usize = 9;

    /// Columns of the ornament/quality coefficient table.
    pub const COEFFICIENT_COLS: usize = 12;
}
