//! Languages
//!
//! Interface languages offered by the settings panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    TraditionalChinese,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::English, Self::TraditionalChinese, Self::Japanese];

    /// BCP 47 tag
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::TraditionalChinese => "zh-Hant",
            Self::Japanese => "ja",
        }
    }

    /// Name in the language itself
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::TraditionalChinese => "繁體中文",
            Self::Japanese => "日本語",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Self::English),
            "zh-hant" | "zh-tw" | "zh-hk" => Ok(Self::TraditionalChinese),
            "ja" | "ja-jp" => Ok(Self::Japanese),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("zh-TW".parse::<Language>().unwrap(), Language::TraditionalChinese);
        assert_eq!(" ja ".parse::<Language>().unwrap(), Language::Japanese);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_code_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
    }
}
