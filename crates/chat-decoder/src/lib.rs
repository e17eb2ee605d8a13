//! Chat message decoding core.
//!
//! Parses raw IRC-style chat lines with metadata tags into structured,
//! renderable events: tag decoding, message parsing, and emote
//! segmentation. Everything here is a pure function of its input and never
//! fails; malformed input degrades to defaults instead of erroring.

pub mod emotes;
pub mod message;
pub mod tags;

pub use emotes::{Fragment, segment_message};
pub use message::{ChatEvent, parse_badge_keys, parse_line};
pub use tags::decode_tags;
