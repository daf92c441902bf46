//! Parsing of channel lines of the form `<speaker> text`
//!
//! Grammar:
//!
//! ```text
//! line    := spoken | raw
//! spoken  := '<' speaker '>' [' '] text
//! speaker := 1*(any char except '<', '>' and whitespace)
//! text    := *(any char)
//! ```
//!
//! Anything that does not match `spoken` is kept verbatim as `raw`.

/// A parsed channel line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine<'a> {
    Spoken { speaker: &'a str, text: &'a str },
    Raw(&'a str),
}

impl<'a> ChatLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        Self::parse_spoken(line).unwrap_or(ChatLine::Raw(line))
    }

    fn parse_spoken(line: &'a str) -> Option<Self> {
        let rest = line.strip_prefix('<')?;
        let close = rest.find('>')?;
        let speaker = &rest[..close];
        if speaker.is_empty() || speaker.chars().any(|c| c == '<' || c.is_whitespace()) {
            return None;
        }
        let after = &rest[close + 1..];
        let text = after.strip_prefix(' ').unwrap_or(after);
        Some(ChatLine::Spoken { speaker, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_line() {
        assert_eq!(
            ChatLine::parse("<alice> bob is a wolf"),
            ChatLine::Spoken { speaker: "alice", text: "bob is a wolf" }
        );
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(ChatLine::parse(""), ChatLine::Raw(""));
    }

    #[test]
    fn test_no_angle_brackets() {
        assert_eq!(ChatLine::parse("alice: hi"), ChatLine::Raw("alice: hi"));
        assert_eq!(ChatLine::parse("<alice hi"), ChatLine::Raw("<alice hi"));
    }

    #[test]
    fn test_nested_angle_brackets() {
        assert_eq!(ChatLine::parse("<<alice>> hi"), ChatLine::Raw("<<alice>> hi"));
        assert_eq!(ChatLine::parse("<a<b>> hi"), ChatLine::Raw("<a<b>> hi"));
        // Only the first tag is the speaker
        assert_eq!(
            ChatLine::parse("<alice> <bob> said so"),
            ChatLine::Spoken { speaker: "alice", text: "<bob> said so" }
        );
    }

    #[test]
    fn test_degenerate_speakers() {
        assert_eq!(ChatLine::parse("<> hi"), ChatLine::Raw("<> hi"));
        assert_eq!(ChatLine::parse("<al ice> hi"), ChatLine::Raw("<al ice> hi"));
        assert_eq!(
            ChatLine::parse("<alice>"),
            ChatLine::Spoken { speaker: "alice", text: "" }
        );
        assert_eq!(
            ChatLine::parse("<alice>hi"),
            ChatLine::Spoken { speaker: "alice", text: "hi" }
        );
    }
}
