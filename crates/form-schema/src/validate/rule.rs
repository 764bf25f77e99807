//! The validation-rule mini-language.
//!
//! Rules are boolean expressions over `value` such as
//! `value >= 5 && value <= 15` or `value == 1 || value == 2`. The tree
//! stores them verbatim and nothing here evaluates them; this module only
//! builds the strings the rule editor writes and recognizes them again.

use std::fmt;

/// Editor mode a stored rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    #[default]
    NoCondition,
    Range,
    Equals,
}

impl RuleKind {
    /// Guesses the editor mode of `rule` from the operators it contains.
    ///
    /// A range needs both `&&` and `>=`, so a one-sided range such as
    /// `value >= 5` is classified as `NoCondition`.
    pub fn classify(rule: &str) -> RuleKind {
        if rule.contains("&&") && rule.contains(">=") {
            RuleKind::Range
        } else if rule.contains("==") || rule.contains("||") {
            RuleKind::Equals
        } else {
            RuleKind::NoCondition
        }
    }
}

/// A rule as the editor composes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationRule {
    /// No rule; stored as the empty string.
    #[default]
    None,
    /// Inclusive bounds. Blank bounds are left out of the expression.
    Range { min: String, max: String },
    /// Any of the listed values.
    Equals(Vec<String>),
}

impl ValidationRule {
    pub fn range(min: impl Into<String>, max: impl Into<String>) -> Self {
        ValidationRule::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Builds an `Equals` rule from comma-separated input such as `1, 2`.
    pub fn equals_from_input(input: &str) -> Self {
        ValidationRule::Equals(
            input
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Renders the stored expression.
    pub fn to_expression(&self) -> String {
        match self {
            ValidationRule::None => String::new(),
            ValidationRule::Range { min, max } => match (min.trim(), max.trim()) {
                ("", "") => String::new(),
                (min, "") => format!("value >= {min}"),
                ("", max) => format!("value <= {max}"),
                (min, max) => format!("value >= {min} && value <= {max}"),
            },
            ValidationRule::Equals(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| format!("value == {v}"))
                .collect::<Vec<_>>()
                .join(" || "),
        }
    }

    /// Recovers the editor state from an expression this module rendered.
    ///
    /// Hand-written expressions of any other shape return `None`.
    pub fn parse(expression: &str) -> Option<Self> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Some(ValidationRule::None);
        }

        if let Some((lower, upper)) = expression.split_once("&&") {
            let min = operand(lower, ">=")?;
            let max = operand(upper, "<=")?;
            return Some(ValidationRule::range(min, max));
        }
        if let Some(min) = operand(expression, ">=") {
            return Some(ValidationRule::range(min, ""));
        }
        if let Some(max) = operand(expression, "<=") {
            return Some(ValidationRule::range("", max));
        }

        let values = expression
            .split("||")
            .map(|term| operand(term, "==").map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some(ValidationRule::Equals(values))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            ValidationRule::None => RuleKind::NoCondition,
            ValidationRule::Range { .. } => RuleKind::Range,
            ValidationRule::Equals(_) => RuleKind::Equals,
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

/// Returns `X` from a term of the form `value <op> X`.
fn operand<'a>(term: &'a str, op: &str) -> Option<&'a str> {
    let rest = term.trim().strip_prefix("value")?.trim_start();
    let value = rest.strip_prefix(op)?.trim();
    if value.is_empty() || value.contains(['&', '|', '=', '<', '>']) {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_expressions() {
        assert_eq!(
            ValidationRule::range("5", "15").to_expression(),
            "value >= 5 && value <= 15"
        );
        assert_eq!(ValidationRule::range("5", " ").to_expression(), "value >= 5");
        assert_eq!(ValidationRule::range("", "15").to_expression(), "value <= 15");
        assert_eq!(ValidationRule::range("", "").to_expression(), "");
        assert_eq!(ValidationRule::None.to_expression(), "");
    }

    #[test]
    fn test_equals_expressions() {
        assert_eq!(
            ValidationRule::equals_from_input("1, 2").to_expression(),
            "value == 1 || value == 2"
        );
        assert_eq!(ValidationRule::equals_from_input("7").to_string(), "value == 7");
        assert_eq!(ValidationRule::equals_from_input(" , ").to_expression(), "");
    }

    #[test]
    fn test_classify() {
        assert_eq!(RuleKind::classify("value >= 5 && value <= 15"), RuleKind::Range);
        assert_eq!(RuleKind::classify("value == 1 || value == 2"), RuleKind::Equals);
        assert_eq!(RuleKind::classify("value == 1"), RuleKind::Equals);
        assert_eq!(RuleKind::classify(""), RuleKind::NoCondition);
        assert_eq!(RuleKind::classify("value >= 5"), RuleKind::NoCondition);
    }

    #[test]
    fn test_parse_rendered() {
        for rule in [
            ValidationRule::None,
            ValidationRule::range("5", "15"),
            ValidationRule::range("-1.5", ""),
            ValidationRule::range("", "100"),
            ValidationRule::equals_from_input("1,2,3"),
        ] {
            assert_eq!(ValidationRule::parse(&rule.to_expression()), Some(rule));
        }
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert_eq!(ValidationRule::parse("value > 5"), None);
        assert_eq!(ValidationRule::parse("x == 1"), None);
        assert_eq!(ValidationRule::parse("value == 1 && value == 2"), None);
        assert_eq!(ValidationRule::parse("value =="), None);
    }
}
