//! Emote segmentation.
//!
//! Splits message text into literal-text and emote fragments based on the
//! compact `id:start-end,start-end/id:…` range spec carried by the `emotes`
//! tag. Offsets are inclusive UTF-16 code-unit positions, as transmitted by
//! the protocol.

use serde::{Deserialize, Serialize};

/// One display unit of a decoded message, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fragment {
    Text { text: String },
    Emote { id: String },
}

impl Fragment {
    fn text(units: &[u16]) -> Self {
        Self::Text {
            text: String::from_utf16_lossy(units),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EmoteRange {
    start: usize,
    end: usize,
    id: String,
}

/// Split `text` into ordered text/emote fragments per the emote spec.
///
/// An empty spec yields a single text fragment, and unparsable ranges are
/// skipped. For well-formed, non-overlapping ranges the fragments cover the
/// whole text exactly once. Overlapping ranges from malformed upstream data
/// are not detected; a range starting before the current cursor loses the
/// literal text ahead of it.
pub fn segment_message(text: &str, spec: &str) -> Vec<Fragment> {
    if spec.is_empty() {
        return vec![Fragment::Text {
            text: text.to_string(),
        }];
    }

    let mut ranges = parse_emote_spec(spec);
    if ranges.is_empty() {
        return vec![Fragment::Text {
            text: text.to_string(),
        }];
    }
    ranges.sort_by_key(|range| range.start);

    let units: Vec<u16> = text.encode_utf16().collect();
    let mut fragments = Vec::new();
    let mut cursor = 0usize;

    for range in ranges {
        if range.start > cursor {
            let from = cursor.min(units.len());
            let upto = range.start.min(units.len());
            if upto > from {
                fragments.push(Fragment::text(&units[from..upto]));
            }
        }
        fragments.push(Fragment::Emote { id: range.id });
        cursor = range.end + 1;
    }
    if cursor < units.len() {
        fragments.push(Fragment::text(&units[cursor..]));
    }

    fragments
}

fn parse_emote_spec(spec: &str) -> Vec<EmoteRange> {
    let mut ranges = Vec::new();
    for group in spec.split('/') {
        let Some((id, positions)) = group.split_once(':') else {
            tracing::trace!(group, "Skipping emote group without id separator");
            continue;
        };
        if id.is_empty() {
            continue;
        }
        for position in positions.split(',') {
            let Some((start, end)) = position.split_once('-') else {
                tracing::trace!(position, "Skipping emote range without bounds separator");
                continue;
            };
            let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) else {
                tracing::trace!(position, "Skipping emote range with non-numeric bounds");
                continue;
            };
            ranges.push(EmoteRange {
                start,
                end,
                id: id.to_string(),
            });
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::{Fragment, segment_message};

    fn text(s: &str) -> Fragment {
        Fragment::Text { text: s.into() }
    }

    fn emote(id: &str) -> Fragment {
        Fragment::Emote { id: id.into() }
    }

    /// Concatenated literal text of the fragments, emotes skipped.
    fn literal_text(fragments: &[Fragment]) -> String {
        fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Text { text } => Some(text.as_str()),
                Fragment::Emote { .. } => None,
            })
            .collect()
    }

    #[test]
    fn empty_spec_yields_single_text_fragment() {
        let fragments = segment_message("hello world", "");
        assert_eq!(fragments, vec![text("hello world")]);
    }

    #[test]
    fn segments_example_message() {
        // "LOL yay": chars 0-2 = "LOL", 3 = " ", 4-6 = "yay"
        let fragments = segment_message("LOL yay", "25:0-2/33:4-6");
        assert_eq!(fragments, vec![emote("25"), text(" "), emote("33")]);
    }

    #[test]
    fn repeated_emote_keeps_order() {
        // "LOL yay LOL": same emote at both ends
        let fragments = segment_message("LOL yay LOL", "25:0-2,8-10");
        assert_eq!(fragments, vec![emote("25"), text(" yay "), emote("25")]);
    }

    #[test]
    fn trailing_text_is_emitted() {
        let fragments = segment_message("LOL yay", "25:0-2");
        assert_eq!(fragments, vec![emote("25"), text(" yay")]);
    }

    #[test]
    fn covers_text_without_gaps() {
        let fragments = segment_message("one two three", "1:4-6");
        assert_eq!(fragments, vec![text("one "), emote("1"), text(" three")]);
        assert_eq!(literal_text(&fragments), "one  three");
    }

    #[test]
    fn unparsable_groups_are_skipped() {
        // No id separator, non-numeric bounds, and no bounds separator.
        let fragments = segment_message("LOL yay", "garbage/25:x-2/33:4");
        assert_eq!(fragments, vec![text("LOL yay")]);
    }

    #[test]
    fn valid_ranges_apply_when_others_are_malformed() {
        let fragments = segment_message("LOL yay", "bad/33:4-6");
        assert_eq!(fragments, vec![text("LOL "), emote("33")]);
    }

    #[test]
    fn ranges_are_sorted_by_start() {
        let fragments = segment_message("LOL yay", "33:4-6/25:0-2");
        assert_eq!(fragments, vec![emote("25"), text(" "), emote("33")]);
    }

    #[test]
    fn overlapping_range_loses_leading_text() {
        // Second range starts before the first one's end: its leading
        // characters are swallowed, per observed upstream behavior.
        let fragments = segment_message("abcdefgh", "1:0-4/2:2-6");
        assert_eq!(fragments, vec![emote("1"), emote("2"), text("h")]);
    }

    #[test]
    fn offsets_are_utf16_code_units() {
        // The emoji occupies two UTF-16 code units (0-1).
        let fragments = segment_message("\u{1F642} Kappa", "25:3-7");
        assert_eq!(fragments, vec![text("\u{1F642} "), emote("25")]);
    }

    #[test]
    fn emote_range_may_cover_a_surrogate_pair() {
        let fragments = segment_message("\u{1F642} Kappa", "301:0-1");
        assert_eq!(fragments, vec![emote("301"), text(" Kappa")]);
    }

    #[test]
    fn out_of_bounds_range_does_not_panic() {
        let fragments = segment_message("hi", "25:10-20");
        assert_eq!(fragments, vec![text("hi"), emote("25")]);
    }
}
