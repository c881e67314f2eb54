//! Categorical dimensions a lead can be sliced by, with their declared
//! category orders. Ordered fields are explicit enums with a total order;
//! out-of-vocabulary values live in an unmapped variant instead of
//! collapsing into a declared category.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::LeadRecord;

/// Canonical lead source after synonym normalization. Unordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Yahoo,
    Google,
    Facebook,
    Microsoft,
    Nikkei,
    CareNet,
    Line,
    ColumnSite,
    LinkedIn,
    /// Label that did not match the synonym table, kept verbatim.
    Other(String),
}

impl LeadSource {
    /// Map a raw source label through the synonym table. Unmapped labels
    /// pass through unchanged (fails open, never an error).
    pub fn canonicalize(raw: &str) -> LeadSource {
        match raw.trim() {
            "yahoo" | "Yahoo" => LeadSource::Yahoo,
            "google" | "Google" => LeadSource::Google,
            "Facebook" => LeadSource::Facebook,
            "microsoft" | "Bing Ad" => LeadSource::Microsoft,
            "nikkei" => LeadSource::Nikkei,
            "careNet" => LeadSource::CareNet,
            "line" | "Line" => LeadSource::Line,
            "columnSite" => LeadSource::ColumnSite,
            "LinkedIn" => LeadSource::LinkedIn,
            other => LeadSource::Other(other.to_string()),
        }
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, LeadSource::Other(_))
    }

    pub fn label(&self) -> &str {
        match self {
            LeadSource::Yahoo => "Yahoo",
            LeadSource::Google => "Google",
            LeadSource::Facebook => "Facebook",
            LeadSource::Microsoft => "Microsoft",
            LeadSource::Nikkei => "Nikkei",
            LeadSource::CareNet => "CareNet",
            LeadSource::Line => "LINE",
            LeadSource::ColumnSite => "コラムサイト",
            LeadSource::LinkedIn => "LinkedIn",
            LeadSource::Other(raw) => raw,
        }
    }
}

/// Net financial asset band, ascending wealth order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetBand {
    Under20M,
    Under50M,
    Under100M,
    Under500M,
    Over500M,
    /// Value outside the declared bands, raw label preserved.
    Unmapped(String),
}

impl AssetBand {
    pub const ORDERED: [AssetBand; 5] = [
        AssetBand::Under20M,
        AssetBand::Under50M,
        AssetBand::Under100M,
        AssetBand::Under500M,
        AssetBand::Over500M,
    ];

    pub fn parse(raw: &str) -> AssetBand {
        match raw.trim() {
            "2000万円未満" => AssetBand::Under20M,
            "5000万円未満" => AssetBand::Under50M,
            "1億円未満" => AssetBand::Under100M,
            "5億円未満" => AssetBand::Under500M,
            "5億円以上" => AssetBand::Over500M,
            other => AssetBand::Unmapped(other.to_string()),
        }
    }

    /// Declared rank, `None` for unmapped values.
    pub fn rank(&self) -> Option<u16> {
        match self {
            AssetBand::Under20M => Some(0),
            AssetBand::Under50M => Some(1),
            AssetBand::Under100M => Some(2),
            AssetBand::Under500M => Some(3),
            AssetBand::Over500M => Some(4),
            AssetBand::Unmapped(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AssetBand::Under20M => "2000万円未満",
            AssetBand::Under50M => "5000万円未満",
            AssetBand::Under100M => "1億円未満",
            AssetBand::Under500M => "5億円未満",
            AssetBand::Over500M => "5億円以上",
            AssetBand::Unmapped(raw) => raw,
        }
    }
}

/// Age bracket at the time of the information request, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    Twenties,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyToSeventyFour,
    SeventyFivePlus,
    Unmapped(String),
}

impl AgeBracket {
    pub const ORDERED: [AgeBracket; 7] = [
        AgeBracket::Twenties,
        AgeBracket::Thirties,
        AgeBracket::Forties,
        AgeBracket::Fifties,
        AgeBracket::Sixties,
        AgeBracket::SeventyToSeventyFour,
        AgeBracket::SeventyFivePlus,
    ];

    pub fn parse(raw: &str) -> AgeBracket {
        match raw.trim() {
            "20代" => AgeBracket::Twenties,
            "30代" => AgeBracket::Thirties,
            "40代" => AgeBracket::Forties,
            "50代" => AgeBracket::Fifties,
            "60代" => AgeBracket::Sixties,
            "70～74歳" => AgeBracket::SeventyToSeventyFour,
            "75歳以上" => AgeBracket::SeventyFivePlus,
            other => AgeBracket::Unmapped(other.to_string()),
        }
    }

    pub fn rank(&self) -> Option<u16> {
        match self {
            AgeBracket::Twenties => Some(0),
            AgeBracket::Thirties => Some(1),
            AgeBracket::Forties => Some(2),
            AgeBracket::Fifties => Some(3),
            AgeBracket::Sixties => Some(4),
            AgeBracket::SeventyToSeventyFour => Some(5),
            AgeBracket::SeventyFivePlus => Some(6),
            AgeBracket::Unmapped(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AgeBracket::Twenties => "20代",
            AgeBracket::Thirties => "30代",
            AgeBracket::Forties => "40代",
            AgeBracket::Fifties => "50代",
            AgeBracket::Sixties => "60代",
            AgeBracket::SeventyToSeventyFour => "70～74歳",
            AgeBracket::SeventyFivePlus => "75歳以上",
            AgeBracket::Unmapped(raw) => raw,
        }
    }
}

/// Years of investment experience, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentExperience {
    None,
    UnderOneYear,
    UnderThreeYears,
    ThreeYearsPlus,
    Unmapped(String),
}

impl InvestmentExperience {
    pub const ORDERED: [InvestmentExperience; 4] = [
        InvestmentExperience::None,
        InvestmentExperience::UnderOneYear,
        InvestmentExperience::UnderThreeYears,
        InvestmentExperience::ThreeYearsPlus,
    ];

    pub fn parse(raw: &str) -> InvestmentExperience {
        match raw.trim() {
            "なし" => InvestmentExperience::None,
            "1年未満" => InvestmentExperience::UnderOneYear,
            "3年未満" => InvestmentExperience::UnderThreeYears,
            "3年以上" => InvestmentExperience::ThreeYearsPlus,
            other => InvestmentExperience::Unmapped(other.to_string()),
        }
    }

    pub fn rank(&self) -> Option<u16> {
        match self {
            InvestmentExperience::None => Some(0),
            InvestmentExperience::UnderOneYear => Some(1),
            InvestmentExperience::UnderThreeYears => Some(2),
            InvestmentExperience::ThreeYearsPlus => Some(3),
            InvestmentExperience::Unmapped(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InvestmentExperience::None => "なし",
            InvestmentExperience::UnderOneYear => "1年未満",
            InvestmentExperience::UnderThreeYears => "3年未満",
            InvestmentExperience::ThreeYearsPlus => "3年以上",
            InvestmentExperience::Unmapped(raw) => raw,
        }
    }
}

/// The five analysis dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    LeadSource,
    Assets,
    Age,
    Experience,
    Occupation,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::LeadSource,
        Dimension::Assets,
        Dimension::Age,
        Dimension::Experience,
        Dimension::Occupation,
    ];

    pub fn parse(raw: &str) -> Option<Dimension> {
        match raw {
            "lead_source" => Some(Dimension::LeadSource),
            "assets" => Some(Dimension::Assets),
            "age" => Some(Dimension::Age),
            "experience" => Some(Dimension::Experience),
            "occupation" => Some(Dimension::Occupation),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::LeadSource => "lead_source",
            Dimension::Assets => "assets",
            Dimension::Age => "age",
            Dimension::Experience => "experience",
            Dimension::Occupation => "occupation",
        }
    }

    /// Display label matching the source data language.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::LeadSource => "リードソース",
            Dimension::Assets => "純金融資産",
            Dimension::Age => "年代",
            Dimension::Experience => "投資経験",
            Dimension::Occupation => "職業",
        }
    }

    /// True when the dimension carries a declared rank order.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            Dimension::Assets | Dimension::Age | Dimension::Experience
        )
    }

    /// The category a given lead falls into on this dimension.
    pub fn value_of(&self, lead: &LeadRecord) -> CategoryValue {
        match self {
            Dimension::LeadSource => match &lead.lead_source {
                Some(source) => CategoryValue::unordered(source.label()),
                None => CategoryValue::missing(),
            },
            Dimension::Assets => match &lead.assets {
                Some(band) => CategoryValue::new(band.label(), band.rank()),
                None => CategoryValue::missing(),
            },
            Dimension::Age => match &lead.age {
                Some(bracket) => CategoryValue::new(bracket.label(), bracket.rank()),
                None => CategoryValue::missing(),
            },
            Dimension::Experience => match &lead.experience {
                Some(exp) => CategoryValue::new(exp.label(), exp.rank()),
                None => CategoryValue::missing(),
            },
            Dimension::Occupation => match &lead.occupation {
                Some(occupation) => CategoryValue::unordered(occupation),
                None => CategoryValue::missing(),
            },
        }
    }
}

/// A single category on one dimension, used as a grouping key.
///
/// `label == None` is the missing-value group. `rank` is the declared
/// position on ordered dimensions; unmapped and unordered values have no
/// rank and sort after ranked ones, the missing group always sorts last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryValue {
    pub label: Option<String>,
    pub rank: Option<u16>,
}

impl CategoryValue {
    pub fn new(label: &str, rank: Option<u16>) -> CategoryValue {
        CategoryValue {
            label: Some(label.to_string()),
            rank,
        }
    }

    pub fn unordered(label: &str) -> CategoryValue {
        CategoryValue {
            label: Some(label.to_string()),
            rank: None,
        }
    }

    pub fn missing() -> CategoryValue {
        CategoryValue {
            label: None,
            rank: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.label.is_none()
    }

    /// Display label; the missing group renders as an explicit bucket.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or("（未設定）")
    }
}

impl Ord for CategoryValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.rank, other.rank) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (&self.label, &other.label) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl PartialOrd for CategoryValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
