//! Side labels for one attribute of a split.

use crate::analysis::DistinguishingAttribute;
use crate::profile::{naming, AttributeProfile, AttributeType};
use crate::utils::{format_currency, format_number};
use crate::vectorize::Normalization;

/// Label pair for the two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SidePhrases {
    pub left: String,
    pub right: String,
}

impl SidePhrases {
    fn ordered(low: String, high: String, high_goes_right: bool) -> Self {
        if high_goes_right {
            Self { left: low, right: high }
        } else {
            Self { left: high, right: low }
        }
    }

    /// Text usable in a question: non-empty and free of unformattable values.
    pub(crate) fn is_usable(&self) -> bool {
        let ok = |s: &str| !s.trim().is_empty() && !s.contains("n/a") && !s.contains("NaN");
        ok(&self.left) && ok(&self.right)
    }
}

/// Everything known about one weighted feature of a split.
pub(crate) struct FeatureContext<'a> {
    pub name: &'a str,
    pub index: usize,
    pub weight: f64,
    pub threshold: f64,
    /// Whether this is the only non-zero weight of the split.
    pub axis_aligned: bool,
    pub normalization: Option<&'a Normalization>,
    pub profile: Option<&'a AttributeProfile>,
}

/// Phrase one feature, in order of preference:
/// real cutoff for axis splits, one-hot membership, profile quantiles, less/more.
pub(crate) fn phrase_feature(ctx: &FeatureContext<'_>) -> SidePhrases {
    let high_goes_right = ctx.weight > 0.0;

    if let Some((base, value)) = naming::split_one_hot(ctx.name) {
        return one_hot_phrases(base, value, high_goes_right);
    }

    if ctx.axis_aligned {
        if let Some(bounds) = ctx.normalization.filter(|b| ctx.index < b.n_features()) {
            let cutoff =
                bounds.mins[ctx.index] + (ctx.threshold / ctx.weight) * bounds.range(ctx.index);
            let desc = description(ctx.name, ctx.profile);
            let value = format_value(cutoff, ctx.profile);
            return if high_goes_right {
                SidePhrases {
                    left: format!("{} at or below {}", desc, value),
                    right: format!("{} above {}", desc, value),
                }
            } else {
                SidePhrases {
                    left: format!("{} at or above {}", desc, value),
                    right: format!("{} below {}", desc, value),
                }
            };
        }
    }

    if let Some(profile) = ctx.profile.filter(|p| !p.is_degenerate()) {
        if let Some(phrases) = profile_phrases(profile, high_goes_right) {
            return phrases;
        }
    }

    let desc = description(ctx.name, ctx.profile);
    SidePhrases::ordered(
        format!("less {}", desc),
        format!("more {}", desc),
        high_goes_right,
    )
}

/// Phrase an attribute from observed branch averages.
pub(crate) fn observed_phrases(
    attribute: &DistinguishingAttribute,
    profile: Option<&AttributeProfile>,
) -> SidePhrases {
    let high_goes_right = attribute.right_is_higher();
    if let Some((base, value)) = naming::split_one_hot(&attribute.name) {
        return one_hot_phrases(base, value, high_goes_right);
    }
    let desc = description(&attribute.name, profile);
    let (low, high) = if high_goes_right {
        (attribute.left_value, attribute.right_value)
    } else {
        (attribute.right_value, attribute.left_value)
    };
    SidePhrases::ordered(
        format!("lower {} (around {})", desc, format_value(low, profile)),
        format!("higher {} (around {})", desc, format_value(high, profile)),
        high_goes_right,
    )
}

/// Human description of a feature.
pub(crate) fn description(name: &str, profile: Option<&AttributeProfile>) -> String {
    if let Some((base, value)) = naming::split_one_hot(name) {
        return format!("{} {}", naming::humanize(base), value);
    }
    profile
        .map(|p| p.description.clone())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| naming::humanize(name))
}

fn one_hot_phrases(base: &str, value: &str, high_goes_right: bool) -> SidePhrases {
    let base = naming::humanize(base);
    let (is, is_not) = if value == naming::OTHER_CATEGORY {
        (format!("a less common {}", base), format!("a common {}", base))
    } else {
        (format!("{} is {}", base, value), format!("{} is not {}", base, value))
    };
    SidePhrases::ordered(is_not, is, high_goes_right)
}

fn profile_phrases(profile: &AttributeProfile, high_goes_right: bool) -> Option<SidePhrases> {
    let range = &profile.value_range;
    let desc = &profile.description;
    let median = format_value(range.median, Some(profile));
    let (low, high) = match profile.attribute_type {
        AttributeType::Price => (
            format!("budget-friendly options (under {})", median),
            format!("premium options ({} and up)", median),
        ),
        AttributeType::Rating => (
            format!(
                "{} between {} and {}",
                desc,
                format_value(range.min, Some(profile)),
                median
            ),
            format!(
                "{} between {} and {}",
                desc,
                median,
                format_value(range.max, Some(profile))
            ),
        ),
        AttributeType::Duration => (
            format!("faster {} (under {})", desc, median),
            format!("slower {} ({} or more)", desc, median),
        ),
        AttributeType::Count => (
            format!("fewer {} (under {})", desc, median),
            format!("more {} ({} or more)", desc, median),
        ),
        _ => return None,
    };
    Some(SidePhrases::ordered(low, high, high_goes_right))
}

/// Format a value in the attribute's unit.
pub(crate) fn format_value(value: f64, profile: Option<&AttributeProfile>) -> String {
    let Some(profile) = profile else {
        return format_number(value);
    };
    if profile.attribute_type == AttributeType::Price || profile.unit.as_deref() == Some("$") {
        return format_currency(value);
    }
    match profile.unit.as_deref() {
        Some("%") => format!("{}%", format_number(value)),
        Some(unit) => format!("{} {}", format_number(value), unit),
        None => format_number(value),
    }
}
