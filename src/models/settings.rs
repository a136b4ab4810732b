//! Company settings that select statutory rates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Where the company's head office is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Seoul metropolitan area (수도권).
    Capital,
    /// Everywhere else.
    NonCapital,
}

/// Statutory company size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    /// Small or medium enterprise (중소기업).
    Small,
    /// Middle-market enterprise (중견기업).
    Middle,
    /// Large enterprise.
    Large,
}

impl FromStr for Region {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "capital" | "수도권" => Ok(Region::Capital),
            "non_capital" | "noncapital" | "비수도권" | "지방" => Ok(Region::NonCapital),
            other => Err(EngineError::InvalidSettings {
                message: format!("unknown region: {}", other),
            }),
        }
    }
}

impl FromStr for CompanySize {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "중소" | "중소기업" => Ok(CompanySize::Small),
            "middle" | "중견" | "중견기업" => Ok(CompanySize::Middle),
            "large" | "대" | "대기업" | "일반" => Ok(CompanySize::Large),
            other => Err(EngineError::InvalidSettings {
                message: format!("unknown company size: {}", other),
            }),
        }
    }
}

/// Settings shared by all credit engines for one company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSettings {
    /// Head-office region.
    pub region: Region,
    /// Company size.
    pub size: CompanySize,
    /// New-growth service business; raises the social-insurance
    /// deduction factor for the normal band.
    #[serde(default)]
    pub growth_service: bool,
}

impl CreditSettings {
    /// Creates settings for a company that is not a new-growth service business.
    pub fn new(region: Region, size: CompanySize) -> Self {
        Self {
            region,
            size,
            growth_service: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_labels() {
        assert_eq!("수도권".parse::<Region>().unwrap(), Region::Capital);
        assert_eq!("non_capital".parse::<Region>().unwrap(), Region::NonCapital);
        assert!("moon".parse::<Region>().is_err());
    }

    #[test]
    fn test_parse_size_labels() {
        assert_eq!("중소기업".parse::<CompanySize>().unwrap(), CompanySize::Small);
        assert_eq!("Middle".parse::<CompanySize>().unwrap(), CompanySize::Middle);
        match "huge".parse::<CompanySize>() {
            Err(EngineError::InvalidSettings { message }) => assert!(message.contains("huge")),
            other => panic!("Expected InvalidSettings, got {:?}", other),
        }
    }

    #[test]
    fn test_settings_deserialize_with_default_growth_flag() {
        let json = r#"{"region":"capital","size":"small"}"#;
        let settings: CreditSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings, CreditSettings::new(Region::Capital, CompanySize::Small));
    }
}
