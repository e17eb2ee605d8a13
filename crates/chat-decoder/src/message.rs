//! Raw chat line parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::emotes::{Fragment, segment_message};
use crate::tags::decode_tags;

const DEFAULT_NAME: &str = "Unknown";
const DEFAULT_COLOR: &str = "#ffffff";

/// A decoded chat message, one per accepted protocol line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    pub name: String,
    pub color: String,
    pub fragments: Vec<Fragment>,
    pub badge_keys: Vec<String>,
    pub room_id: String,
}

/// Parse one raw protocol line into a chat event.
///
/// Lines without the `" :"` payload delimiter yield `None`; that is not an
/// error, since control frames are expected to be filtered by the transport
/// before this is called. Absent or malformed tags fall back to defaults,
/// so parsing itself never fails.
pub fn parse_line(line: &str) -> Option<ChatEvent> {
    let (tags, working) = match line.strip_prefix('@') {
        Some(rest) => {
            let (blob, working) = rest.split_once(' ')?;
            (decode_tags(blob), working)
        }
        None => (HashMap::new(), line),
    };

    let (_, text) = working.split_once(" :")?;

    let tag = |key: &str| tags.get(key).map(String::as_str).unwrap_or_default();

    Some(ChatEvent {
        name: non_empty_or(tag("display-name"), DEFAULT_NAME),
        color: non_empty_or(tag("color"), DEFAULT_COLOR),
        fragments: segment_message(text, tag("emotes")),
        badge_keys: parse_badge_keys(tag("badges")),
        room_id: tag("room-id").to_string(),
    })
}

/// Split a raw `badges` tag value into `"setId/versionId"` keys.
///
/// Keys are trimmed and empty segments dropped; order is preserved.
pub fn parse_badge_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatEvent, parse_badge_keys, parse_line};
    use crate::emotes::Fragment;

    fn text(s: &str) -> Fragment {
        Fragment::Text { text: s.into() }
    }

    fn emote(id: &str) -> Fragment {
        Fragment::Emote { id: id.into() }
    }

    #[test]
    fn parses_fully_tagged_message() {
        let line = "@display-name=Bob;color=#112233;emotes=25:0-2/33:4-6;\
                    badges=subscriber/6;room-id=42 \
                    :tmi.twitch.tv PRIVMSG #ch :LOL yay";
        let event = parse_line(line).unwrap();
        assert_eq!(
            event,
            ChatEvent {
                name: "Bob".into(),
                color: "#112233".into(),
                fragments: vec![emote("25"), text(" "), emote("33")],
                badge_keys: vec!["subscriber/6".into()],
                room_id: "42".into(),
            }
        );
    }

    #[test]
    fn line_without_delimiter_yields_no_event() {
        assert!(parse_line(":tmi.twitch.tv JOIN #ch").is_none());
        assert!(parse_line("@room-id=42 PRIVMSG").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn untagged_line_falls_back_to_defaults() {
        let event = parse_line(":bob!bob@bob.tmi.twitch.tv PRIVMSG #ch :hello").unwrap();
        assert_eq!(event.name, "Unknown");
        assert_eq!(event.color, "#ffffff");
        assert_eq!(event.fragments, vec![text("hello")]);
        assert!(event.badge_keys.is_empty());
        assert_eq!(event.room_id, "");
    }

    #[test]
    fn empty_tag_values_fall_back_to_defaults() {
        let event = parse_line("@display-name=;color= :tmi PRIVMSG #ch :hi").unwrap();
        assert_eq!(event.name, "Unknown");
        assert_eq!(event.color, "#ffffff");
    }

    #[test]
    fn message_text_may_contain_the_delimiter() {
        let event = parse_line(":tmi PRIVMSG #ch :before : after").unwrap();
        assert_eq!(event.fragments, vec![text("before : after")]);
    }

    #[test]
    fn badge_keys_preserve_order() {
        let event =
            parse_line("@badges=broadcaster/1,subscriber/12 :tmi PRIVMSG #ch :hi").unwrap();
        assert_eq!(event.badge_keys, vec!["broadcaster/1", "subscriber/12"]);
    }

    #[test]
    fn badge_key_extraction_trims_and_drops_empties() {
        assert_eq!(
            parse_badge_keys(" subscriber/6 , ,moderator/1,"),
            vec!["subscriber/6".to_string(), "moderator/1".to_string()]
        );
        assert!(parse_badge_keys("").is_empty());
    }

    #[test]
    fn event_serializes_with_camel_case_keys() {
        let event = parse_line(
            "@display-name=Bob;badges=vip/1;room-id=9;emotes=25:0-2 :tmi PRIVMSG #ch :LOL hi",
        )
        .unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["badgeKeys"][0], "vip/1");
        assert_eq!(json["roomId"], "9");
        assert_eq!(json["fragments"][0]["type"], "emote");
        assert_eq!(json["fragments"][0]["id"], "25");
        assert_eq!(json["fragments"][1]["type"], "text");
        assert_eq!(json["fragments"][1]["text"], " hi");
    }
}
