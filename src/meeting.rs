use std::fmt;
use std::ops::RangeInclusive;

use crate::config::MEETING_ORDINAL_OFFSET;

/// Bijective base-26 code of a meeting ordinal: 165 -> "A", 190 -> "Z", 191 -> "AA".
/// Ordinals at or below the offset have no code.
pub fn ordinal_to_code(ordinal: u32) -> String {
    let mut rank = ordinal.saturating_sub(MEETING_ORDINAL_OFFSET);
    let mut letters = Vec::new();
    while rank > 0 {
        rank -= 1;
        letters.push(char::from(b'A' + (rank % 26) as u8));
        rank /= 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`ordinal_to_code`]. Case-insensitive; `None` for empty or non-alphabetic input.
pub fn code_to_ordinal(code: &str) -> Option<u32> {
    if code.is_empty() {
        return None;
    }
    let mut rank: u32 = 0;
    for c in code.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        rank = rank.checked_mul(26)?.checked_add(digit)?;
    }
    rank.checked_add(MEETING_ORDINAL_OFFSET)
}

/// clap value parser: accepts a numeric ordinal ("170") or a meeting code ("F").
pub fn parse_ordinal(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }
    code_to_ordinal(s).ok_or_else(|| format!("`{}` is neither a meeting ordinal nor a meeting code", s))
}

/// Inclusive range of meeting ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingRange {
    pub first: u32,
    pub last: u32,
}

impl MeetingRange {
    pub fn new(first: u32, last: u32) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    /// Range covering the first `count` tracked meetings.
    pub fn from_meeting_count(count: usize) -> Option<Self> {
        let count = u32::try_from(count).ok().filter(|&c| c > 0)?;
        Self::new(MEETING_ORDINAL_OFFSET + 1, MEETING_ORDINAL_OFFSET + count)
    }

    pub fn len(&self) -> usize {
        (self.last - self.first) as usize + 1
    }

    pub fn ordinals(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }

    /// Position of `ordinal` in a results buffer sized [`Self::len`].
    pub fn slot(&self, ordinal: u32) -> usize {
        (ordinal - self.first) as usize
    }
}

impl fmt::Display for MeetingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}..={})",
            ordinal_to_code(self.first),
            ordinal_to_code(self.last),
            self.first,
            self.last
        )
    }
}

/// One row of the site's meeting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingInfo {
    pub number: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub usl: String,
}

impl MeetingInfo {
    /// Code derived from the listed meeting number ("1" -> "A").
    pub fn code(&self) -> Option<String> {
        let number: u32 = self.number.trim().parse().ok()?;
        Some(ordinal_to_code(MEETING_ORDINAL_OFFSET + number)).filter(|c| !c.is_empty())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: u32 = MEETING_ORDINAL_OFFSET + 1;

    #[test]
    fn known_codes() {
        assert_eq!(ordinal_to_code(FIRST), "A");
        assert_eq!(ordinal_to_code(FIRST + 25), "Z");
        assert_eq!(ordinal_to_code(FIRST + 26), "AA");
        assert_eq!(ordinal_to_code(FIRST + 51), "AZ");
        assert_eq!(ordinal_to_code(FIRST + 52), "BA");
        assert_eq!(ordinal_to_code(FIRST + 26 * 27 - 1), "ZZ");
    }

    #[test]
    fn no_code_at_or_below_offset() {
        assert_eq!(ordinal_to_code(MEETING_ORDINAL_OFFSET), "");
        assert_eq!(ordinal_to_code(100), "");
        assert_eq!(ordinal_to_code(0), "");
    }

    #[test]
    fn codes_strictly_increase_and_round_trip() {
        let mut prev: Option<String> = None;
        for n in FIRST..=FIRST + 26 * 27 {
            let code = ordinal_to_code(n);
            assert!(!code.is_empty());
            assert!(code.chars().all(|c| c.is_ascii_uppercase()), "{}", code);
            if let Some(p) = &prev {
                let longer = code.len() > p.len();
                assert!(longer || (code.len() == p.len() && code > *p), "{} !> {}", code, p);
            }
            assert_eq!(code_to_ordinal(&code), Some(n));
            prev = Some(code);
        }
    }

    #[test]
    fn code_to_ordinal_rejects_garbage() {
        assert_eq!(code_to_ordinal(""), None);
        assert_eq!(code_to_ordinal("A1"), None);
        assert_eq!(code_to_ordinal("aj"), Some(FIRST + 35));
    }

    #[test]
    fn parse_ordinal_accepts_numbers_and_codes() {
        assert_eq!(parse_ordinal("170"), Ok(170));
        assert_eq!(parse_ordinal("F"), Ok(170));
        assert!(parse_ordinal("-").is_err());
    }

    #[test]
    fn range_from_meeting_count() {
        let r = MeetingRange::from_meeting_count(36).unwrap();
        assert_eq!((r.first, r.last), (165, 200));
        assert_eq!(r.len(), 36);
        assert_eq!(r.slot(170), 5);
        assert!(MeetingRange::from_meeting_count(0).is_none());
        assert!(MeetingRange::new(10, 9).is_none());
    }

    #[test]
    fn meeting_info_code() {
        let mut m = MeetingInfo {
            number: "32".into(),
            name: "Hannover".into(),
            start_date: String::new(),
            end_date: String::new(),
            usl: String::new(),
        };
        assert_eq!(m.code().as_deref(), Some("AF"));
        m.number = "n/a".into();
        assert_eq!(m.code(), None);
    }
}
