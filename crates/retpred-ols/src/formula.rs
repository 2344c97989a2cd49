//! R-style model formulas.
//!
//! Supported grammar:
//! ```text
//! formula := response "~" terms
//! terms   := term (("+" | "-") term)*
//! term    := name | Q("name") | "1" | "0"
//! ```
//! An intercept named `Intercept` is included unless removed with `- 1` or
//! `+ 0`; `+ 1` states it explicitly. `- name` removes an earlier term.
//! Names holding `+`, `-` or `~` must be quoted with `Q("...")`.

use crate::design::{Design, Target};
use crate::error::OlsError;
use crate::model::OlsModel;
use retpred_data::PredictorPanel;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Name of the intercept column added by formulas.
pub const INTERCEPT_NAME: &str = "Intercept";

/// Parsed `response ~ terms` formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    response: String,
    terms: Vec<String>,
    intercept: bool,
}

impl Formula {
    /// Parse a formula string.
    pub fn parse(formula: &str) -> Result<Self, OlsError> {
        let invalid = |reason: &str| OlsError::Formula {
            formula: formula.to_string(),
            reason: reason.to_string(),
        };

        let (lhs, rhs) = formula
            .split_once('~')
            .ok_or_else(|| invalid("expected 'response ~ terms'"))?;
        if rhs.contains('~') {
            return Err(invalid("more than one '~'"));
        }

        let response = parse_name(lhs.trim()).ok_or_else(|| invalid("missing response"))?;

        let mut terms: Vec<String> = Vec::new();
        let mut intercept = true;
        for (sign, token) in split_terms(rhs).map_err(|reason| invalid(&reason))? {
            match (sign, token.as_str()) {
                (Sign::Plus, "1") => intercept = true,
                (Sign::Plus, "0") | (Sign::Minus, "1") => intercept = false,
                (Sign::Minus, "0") => intercept = true,
                (Sign::Plus, _) => {
                    let name = parse_name(&token).ok_or_else(|| invalid("empty term"))?;
                    if !terms.contains(&name) {
                        terms.push(name);
                    }
                }
                (Sign::Minus, _) => {
                    let name = parse_name(&token).ok_or_else(|| invalid("empty term"))?;
                    terms.retain(|t| *t != name);
                }
            }
        }

        if !intercept && terms.is_empty() {
            return Err(invalid("model has no regressors"));
        }

        Ok(Self {
            response,
            terms,
            intercept,
        })
    }

    /// Dependent variable.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Regressor names, intercept excluded.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether an intercept is included.
    pub const fn has_intercept(&self) -> bool {
        self.intercept
    }

    /// Every panel column the formula reads, response first.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.response.as_str())
            .chain(self.terms.iter().map(String::as_str))
            .collect()
    }

    /// Build the model on a panel.
    ///
    /// Rows with a null in any referenced column are dropped first.
    pub fn to_model(&self, panel: &PredictorPanel) -> Result<OlsModel, OlsError> {
        let complete = panel.select(&self.columns())?.drop_incomplete()?;
        debug!(
            formula = %self,
            rows = panel.height(),
            complete_rows = complete.height(),
            "building formula design"
        );

        let mut design = Design::from_panel(&complete, &self.terms)?;
        if self.intercept {
            design = design.with_intercept(INTERCEPT_NAME)?;
        }
        let target = Target::from_panel(&complete, &self.response)?;
        OlsModel::new(target, design)
    }
}

impl FromStr for Formula {
    type Err = OlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.terms.iter().map(|t| display_name(t)).collect();
        if !self.intercept {
            parts.push("0".to_string());
        } else if parts.is_empty() {
            parts.push("1".to_string());
        }
        write!(f, "{} ~ {}", display_name(&self.response), parts.join(" + "))
    }
}

/// Parse `formula` and build its model on `panel`.
///
/// ```no_run
/// # fn demo(panel: &retpred_data::PredictorPanel) -> Result<(), retpred_ols::OlsError> {
/// let results = retpred_ols::ols_formula("ret ~ ep + infl12", panel)?.fit()?;
/// println!("{:?}", results.param("ep"));
/// # Ok(())
/// # }
/// ```
pub fn ols_formula(formula: &str, panel: &PredictorPanel) -> Result<OlsModel, OlsError> {
    Formula::parse(formula)?.to_model(panel)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

fn split_terms(rhs: &str) -> Result<Vec<(Sign, String)>, String> {
    let mut terms = Vec::new();
    let mut sign = Sign::Plus;
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in rhs.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '+' | '-' if !in_quotes => {
                let token = current.trim().to_string();
                if token.is_empty() {
                    // leading sign, e.g. "~ -1 + x"
                    if !terms.is_empty() {
                        return Err(format!("empty term before '{ch}'"));
                    }
                } else {
                    terms.push((sign, token));
                }
                sign = if ch == '+' { Sign::Plus } else { Sign::Minus };
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    let token = current.trim().to_string();
    if token.is_empty() {
        return Err("empty term at end of formula".to_string());
    }
    terms.push((sign, token));
    Ok(terms)
}

fn parse_name(token: &str) -> Option<String> {
    let token = token.trim();
    let name = token
        .strip_prefix("Q(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(|inner| inner.trim().trim_matches(|c| c == '"' || c == '\''))
        .unwrap_or(token);
    (!name.is_empty()).then(|| name.to_string())
}

fn display_name(name: &str) -> String {
    if name.contains(['+', '-', '~', ' ']) {
        format!("Q(\"{name}\")")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_basic_formula() {
        let formula = Formula::parse("ret ~ ep + infl12").unwrap();
        assert_eq!(formula.response(), "ret");
        assert_eq!(formula.terms(), ["ep", "infl12"]);
        assert!(formula.has_intercept());
        assert_eq!(formula.to_string(), "ret ~ ep + infl12");
    }

    #[rstest]
    #[case("ret ~ ep - 1", false)]
    #[case("ret ~ ep + 0", false)]
    #[case("ret ~ 0 + ep", false)]
    #[case("ret ~ 1 + ep", true)]
    #[case("ret ~ ep", true)]
    #[case("ret ~ -1 + ep", false)]
    fn test_intercept_handling(#[case] text: &str, #[case] intercept: bool) {
        let formula = Formula::parse(text).unwrap();
        assert_eq!(formula.has_intercept(), intercept);
        assert_eq!(formula.terms(), ["ep"]);
    }

    #[test]
    fn test_quoted_names_and_removal() {
        let formula = Formula::parse(r#"ret ~ Q("i/k") + b/m + lty - lty"#).unwrap();
        assert_eq!(formula.terms(), ["i/k", "b/m"]);

        let repeated = Formula::parse("ret ~ ep + ep").unwrap();
        assert_eq!(repeated.terms(), ["ep"]);
    }

    #[test]
    fn test_constant_only_formula() {
        let formula = Formula::parse("ret ~ 1").unwrap();
        assert!(formula.terms().is_empty());
        assert_eq!(formula.to_string(), "ret ~ 1");
    }

    #[rstest]
    #[case("ret ep")]
    #[case(" ~ ep")]
    #[case("ret ~ ")]
    #[case("ret ~ ep +")]
    #[case("ret ~ ep + + lty")]
    #[case("ret ~ ep ~ lty")]
    #[case("ret ~ 0")]
    #[case(r#"ret ~ Q("ep"#)]
    fn test_invalid_formulas(#[case] text: &str) {
        assert!(matches!(Formula::parse(text), Err(OlsError::Formula { .. })));
    }

    #[test]
    fn test_model_drops_incomplete_rows() {
        let panel = PredictorPanel::from_columns(
            vec![195001, 195002, 195003, 195004, 195005],
            vec![
                ("ret".to_string(), vec![Some(0.01), Some(0.02), None, Some(0.00), Some(0.03)]),
                ("ep".to_string(), vec![Some(0.05), Some(0.06), Some(0.07), None, Some(0.04)]),
                ("unused".to_string(), vec![None, None, None, None, None]),
            ],
        )
        .unwrap();

        let model = ols_formula("ret ~ ep", &panel).unwrap();
        assert_eq!(model.design().nobs(), 3);
        assert_eq!(model.design().names(), ["Intercept", "ep"]);
        assert_eq!(model.target().name(), "ret");
    }

    #[test]
    fn test_missing_column_surfaces() {
        let panel = PredictorPanel::from_columns(
            vec![195001],
            vec![("ret".to_string(), vec![Some(0.01)])],
        )
        .unwrap();
        assert!(matches!(
            ols_formula("ret ~ cay", &panel).unwrap_err(),
            OlsError::Data(_)
        ));
    }
}
