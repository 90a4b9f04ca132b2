//! Domain-specific retrieval strategies.
//!
//! Finance and materials science are the hard domains: queries get extra
//! terminology appended before search, and downstream generation receives a
//! domain prompt wrapper plus a bias-mitigation checklist.

use serde::{Deserialize, Serialize};
use std::fmt;

const FINANCE_PROMPT: &str = "
[DOMAIN: FINANCE]

You are analyzing research in financial markets, risk management, and quantitative finance.
Pay special attention to:
- Financial terminology and metrics (Sharpe ratio, volatility, liquidity)
- Market mechanisms and trading strategies
- Risk assessment and portfolio optimization
- Regulatory frameworks and compliance
- Economic indicators and their relationships

Ensure claims about financial performance, market behavior, and risk are precisely
grounded in cited evidence. Avoid generalizations without specific data support.
";

const MATERIALS_PROMPT: &str = "
[DOMAIN: MATERIALS SCIENCE]

You are analyzing research in materials science, chemistry, and materials engineering.
Pay special attention to:
- Material properties (mechanical, thermal, electrical, optical)
- Synthesis methods and processing techniques
- Characterization methods (XRD, SEM, TEM, spectroscopy)
- Structure-property relationships
- Applications and performance metrics

Ensure claims about material properties, synthesis conditions, and performance
are precisely grounded in experimental data from cited sources. Include specific
values and conditions when available.
";

const GENERAL_PROMPT: &str = "
[DOMAIN: GENERAL]

You are conducting a comprehensive research analysis. Ensure all claims are
grounded in cited evidence and maintain high standards of accuracy and attribution.
";

/// Research domain of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    General,
    Finance,
    MaterialsScience,
}

impl Domain {
    /// Parse a free-form tag. Case-insensitive, spaces read as underscores.
    /// Unrecognised tags fall back to `General`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().replace(' ', "_").as_str() {
            "finance" => Self::Finance,
            "materials_science" => Self::MaterialsScience,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Finance => "finance",
            Self::MaterialsScience => "materials_science",
        }
    }

    /// Terminology appended to every search query in this domain.
    pub fn query_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Finance => Some(" financial markets risk management"),
            Self::MaterialsScience => Some(" materials properties synthesis characterization"),
            Self::General => None,
        }
    }

    /// Rewrite a sub-task into the query actually searched.
    pub fn refine_query(&self, query: &str) -> String {
        match self.query_suffix() {
            Some(suffix) => format!("{query}{suffix}"),
            None => query.to_string(),
        }
    }

    /// Instructions prepended to generation prompts for this domain.
    pub fn prompt_wrapper(&self) -> &'static str {
        match self {
            Self::Finance => FINANCE_PROMPT,
            Self::MaterialsScience => MATERIALS_PROMPT,
            Self::General => GENERAL_PROMPT,
        }
    }

    pub fn bias_mitigation(&self) -> BiasMitigation {
        let (sampling, terminology, recency) = match self {
            Self::Finance => (
                "Ensure diverse representation of market conditions and geographic regions",
                "Use precise financial terminology consistently",
                "Balance recent and historical research",
            ),
            Self::MaterialsScience => (
                "Include diverse material classes and synthesis methods",
                "Use standardized materials science nomenclature",
                "Balance novel materials with well-established ones",
            ),
            Self::General => (
                "Ensure diverse source representation",
                "Use clear, consistent terminology",
                "Balance contemporary and foundational work",
            ),
        };
        BiasMitigation {
            sampling_bias: sampling.to_string(),
            terminology_bias: terminology.to_string(),
            recency_bias: recency.to_string(),
            prompt_augmentation: self.prompt_wrapper().to_string(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bias-mitigation checklist handed to generation for a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasMitigation {
    pub sampling_bias: String,
    pub terminology_bias: String,
    pub recency_bias: String,
    pub prompt_augmentation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Domain::from_tag("finance"), Domain::Finance);
        assert_eq!(Domain::from_tag("FINANCE"), Domain::Finance);
        assert_eq!(Domain::from_tag("Materials Science"), Domain::MaterialsScience);
        assert_eq!(Domain::from_tag("materials_science"), Domain::MaterialsScience);
        assert_eq!(Domain::from_tag("biology"), Domain::General);
    }

    #[test]
    fn test_refine_query() {
        assert_eq!(
            Domain::Finance.refine_query("portfolio theory"),
            "portfolio theory financial markets risk management"
        );
        assert_eq!(
            Domain::MaterialsScience.refine_query("graphene"),
            "graphene materials properties synthesis characterization"
        );
        assert_eq!(Domain::General.refine_query("graphene"), "graphene");
    }

    #[test]
    fn test_prompt_wrapper() {
        assert!(Domain::Finance.prompt_wrapper().to_lowercase().contains("financial"));
        assert!(Domain::MaterialsScience.prompt_wrapper().contains("XRD"));
        assert!(Domain::General.prompt_wrapper().contains("[DOMAIN: GENERAL]"));
    }

    #[test]
    fn test_bias_mitigation() {
        let strategy = Domain::Finance.bias_mitigation();
        assert!(strategy.sampling_bias.contains("market conditions"));
        assert_eq!(strategy.prompt_augmentation, Domain::Finance.prompt_wrapper());
        assert_eq!(
            Domain::from_tag("unknown").bias_mitigation().recency_bias,
            "Balance contemporary and foundational work"
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Domain::MaterialsScience).unwrap(),
            "\"materials_science\""
        );
    }
}
