use serde::{Deserialize, Serialize};

/// Coarse proposal category, stored in the catalog as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProposalType {
    General = 0,
    Experiment = 1,
    AdHocGroup = 2,
    CrossCheck = 3,
}

impl ProposalType {
    /// Classify by the first token of a title ("EE2-1.3:", "AHG12", "Crosscheck").
    /// Rules are checked in order and the first hit wins.
    pub fn from_title(title: &str) -> Self {
        let prefix = title
            .split(' ')
            .next()
            .unwrap_or("")
            .split(':')
            .next()
            .unwrap_or("")
            .to_lowercase();

        if prefix.contains("ee") || prefix.contains("ce") {
            Self::Experiment
        } else if prefix.contains("ahg") {
            Self::AdHocGroup
        } else if prefix.contains("cross") {
            Self::CrossCheck
        } else {
            Self::General
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Experiment => "EE/CE",
            Self::AdHocGroup => "AHG",
            Self::CrossCheck => "cross-check",
        }
    }
}

impl From<ProposalType> for u8 {
    fn from(t: ProposalType) -> u8 {
        t.code()
    }
}

impl TryFrom<u8> for ProposalType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::General),
            1 => Ok(Self::Experiment),
            2 => Ok(Self::AdHocGroup),
            3 => Ok(Self::CrossCheck),
            other => Err(format!("unknown proposal type {}", other)),
        }
    }
}
