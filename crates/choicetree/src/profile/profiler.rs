//! Attribute profiling: statistics plus semantic inference from names and shapes.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use super::naming;
use super::types::{AttributeProfile, AttributeType, Direction, Scale, ValueRange};
use crate::data::RawTable;
use crate::utils::{self, parse_number};

/// Share of non-empty cells that must parse for a column to count as numeric.
pub const NUMERIC_CELL_RATIO: f64 = 0.6;

const PRICE_KEYWORDS: &[&str] = &["price", "cost", "msrp", "fee"];
const RATING_KEYWORDS: &[&str] = &["rating", "review", "score", "stars"];
const PERCENT_KEYWORDS: &[&str] = &["percent", "pct"];
const DURATION_KEYWORDS: &[&str] = &["duration", "time", "ship", "wait", "delivery"];
const WEIGHT_KEYWORDS: &[&str] = &["weight", "mass"];
const DIMENSION_KEYWORDS: &[&str] = &["dimension", "width", "height", "length", "depth", "size"];
const COUNT_KEYWORDS: &[&str] = &["count", "quantity", "qty", "stock", "sold", "number"];
const NEGATIVE_KEYWORDS: &[&str] = &["error", "defect", "failure", "complaint", "return"];

/// Profile a column of numeric values.
///
/// One-hot feature names (`"color=red"`) are forced to a categorical, neutral profile.
/// An empty slice yields a degenerate profile that is never preference-relevant.
pub fn profile_attribute(name: &str, values: &[f64]) -> AttributeProfile {
    let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        return degenerate_profile(name);
    }

    let value_range = compute_range(&valid);
    let unique_values = utils::count_unique(&valid);
    let unique_value_ratio = unique_values as f64 / valid.len() as f64;
    let scale = Scale::from_bounds(value_range.min, value_range.max);

    if let Some((base, value)) = naming::split_one_hot(name) {
        return AttributeProfile {
            name: name.to_string(),
            attribute_type: AttributeType::Unknown,
            is_preference_relevant: true,
            value_range,
            scale,
            direction: Direction::Neutral,
            description: format!("{} is {}", naming::humanize(base), value),
            unit: None,
            categorical: true,
            unique_values,
            unique_value_ratio,
        };
    }

    let attribute_type = detect_type(name, &valid, &value_range, unique_values);
    let direction = infer_direction(name, attribute_type);
    let is_preference_relevant = !matches!(
        attribute_type,
        AttributeType::Identifier | AttributeType::Coordinate
    ) && !naming::is_identifier_name(name);

    debug!(
        attribute = name,
        kind = attribute_type.as_str(),
        unique_values,
        "profiled numeric attribute"
    );

    AttributeProfile {
        name: name.to_string(),
        attribute_type,
        is_preference_relevant,
        value_range,
        scale,
        direction,
        description: naming::humanize(name),
        unit: infer_unit(name, attribute_type),
        categorical: unique_values <= 5 && unique_value_ratio < 0.5,
        unique_values,
        unique_value_ratio,
    }
}

/// Profile a raw column of cells.
///
/// Columns where fewer than 60% of non-empty cells parse as numbers are profiled as
/// categorical text: only the distinct-value counts are meaningful.
pub fn profile_column(name: &str, cells: &[&str]) -> AttributeProfile {
    let non_empty: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if non_empty.is_empty() {
        return degenerate_profile(name);
    }

    let numeric: Vec<f64> = non_empty.iter().filter_map(|c| parse_number(c)).collect();
    if numeric.len() as f64 >= NUMERIC_CELL_RATIO * non_empty.len() as f64 {
        return profile_attribute(name, &numeric);
    }

    let unique_values = non_empty.iter().collect::<HashSet<_>>().len();
    let identifier = naming::is_identifier_name(name);
    AttributeProfile {
        name: name.to_string(),
        attribute_type: if identifier {
            AttributeType::Identifier
        } else {
            AttributeType::Unknown
        },
        is_preference_relevant: !identifier && unique_values > 1,
        value_range: ValueRange::default(),
        scale: Scale::Small,
        direction: Direction::Neutral,
        description: naming::humanize(name),
        unit: None,
        categorical: true,
        unique_values,
        unique_value_ratio: unique_values as f64 / non_empty.len() as f64,
    }
}

/// Profile every column of a table, one profile per header, in header order.
pub fn profile_table(table: &RawTable) -> Vec<AttributeProfile> {
    (0..table.n_columns())
        .into_par_iter()
        .map(|idx| profile_column(&table.headers[idx], &table.column(idx)))
        .collect()
}

/// Look up a profile by attribute name.
pub fn find_profile<'a>(profiles: &'a [AttributeProfile], name: &str) -> Option<&'a AttributeProfile> {
    profiles.iter().find(|p| p.name == name)
}

fn degenerate_profile(name: &str) -> AttributeProfile {
    AttributeProfile {
        name: name.to_string(),
        attribute_type: AttributeType::Unknown,
        is_preference_relevant: false,
        value_range: ValueRange::default(),
        scale: Scale::Small,
        direction: Direction::Neutral,
        description: naming::humanize(name),
        unit: None,
        categorical: false,
        unique_values: 0,
        unique_value_ratio: 0.0,
    }
}

fn compute_range(valid: &[f64]) -> ValueRange {
    let sorted = utils::sorted(valid);
    let n = sorted.len();
    ValueRange {
        min: sorted[0],
        max: sorted[n - 1],
        mean: utils::mean(valid),
        median: utils::median(&sorted),
        std_dev: utils::variance(valid).sqrt(),
        q25: utils::nearest_rank(&sorted, 0.25),
        q75: utils::nearest_rank(&sorted, 0.75),
    }
}

fn detect_type(name: &str, valid: &[f64], range: &ValueRange, unique_values: usize) -> AttributeType {
    if naming::is_identifier_name(name) {
        return AttributeType::Identifier;
    }
    if naming::is_coordinate_name(name) {
        return AttributeType::Coordinate;
    }

    let keyword_rules: [(&[&str], AttributeType); 7] = [
        (PRICE_KEYWORDS, AttributeType::Price),
        (RATING_KEYWORDS, AttributeType::Rating),
        (PERCENT_KEYWORDS, AttributeType::Percentage),
        (DURATION_KEYWORDS, AttributeType::Duration),
        (WEIGHT_KEYWORDS, AttributeType::Weight),
        (DIMENSION_KEYWORDS, AttributeType::Dimension),
        (COUNT_KEYWORDS, AttributeType::Count),
    ];
    for (keywords, kind) in keyword_rules {
        if naming::contains_any(name, keywords) {
            return kind;
        }
    }

    // Shape fallback.
    let all_integers = valid.iter().all(|v| v.fract() == 0.0);
    let unique_ratio = unique_values as f64 / valid.len() as f64;
    if all_integers && valid.len() >= 10 && unique_ratio >= 0.95 {
        return AttributeType::Identifier;
    }
    if range.min >= 0.0 && range.max <= 10.0 && unique_values <= 20 && unique_values > 1 {
        return AttributeType::Rating;
    }
    AttributeType::Unknown
}

fn infer_direction(name: &str, kind: AttributeType) -> Direction {
    match kind {
        AttributeType::Price | AttributeType::Duration => Direction::LowerBetter,
        AttributeType::Rating | AttributeType::Percentage | AttributeType::Count => {
            if naming::contains_any(name, NEGATIVE_KEYWORDS) {
                Direction::LowerBetter
            } else {
                Direction::HigherBetter
            }
        }
        _ => Direction::Neutral,
    }
}

fn infer_unit(name: &str, kind: AttributeType) -> Option<String> {
    let words = naming::tokens(name);
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(&w.as_str()));
    let unit = match kind {
        AttributeType::Price => "$",
        AttributeType::Percentage => "%",
        AttributeType::Duration if has(&["day", "days"]) => "days",
        AttributeType::Duration if has(&["hour", "hours", "hr", "hrs"]) => "hours",
        AttributeType::Duration if has(&["minute", "minutes", "min", "mins"]) => "minutes",
        AttributeType::Duration if has(&["week", "weeks"]) => "weeks",
        AttributeType::Weight if has(&["kg"]) => "kg",
        AttributeType::Weight if has(&["lb", "lbs"]) => "lbs",
        AttributeType::Weight if has(&["g", "grams"]) => "g",
        AttributeType::Weight if has(&["oz"]) => "oz",
        AttributeType::Dimension if has(&["cm"]) => "cm",
        AttributeType::Dimension if has(&["mm"]) => "mm",
        AttributeType::Dimension if has(&["in", "inch", "inches"]) => "in",
        AttributeType::Dimension if has(&["ft"]) => "ft",
        _ => return None,
    };
    Some(unit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn statistics_use_nearest_rank() {
        let profile = profile_attribute("price", &[10.0, 40.0, 20.0, 30.0]);
        let r = profile.value_range;
        assert_eq!(r.min, 10.0);
        assert_eq!(r.max, 40.0);
        assert_abs_diff_eq!(r.mean, 25.0);
        assert_eq!(r.median, 30.0);
        assert_eq!(r.q25, 20.0);
        assert_eq!(r.q75, 40.0);
        assert_abs_diff_eq!(r.std_dev, 125.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(profile.scale, Scale::Medium);
    }

    #[rstest]
    #[case("price", AttributeType::Price, Direction::LowerBetter)]
    #[case("unit_cost", AttributeType::Price, Direction::LowerBetter)]
    #[case("customer_rating", AttributeType::Rating, Direction::HigherBetter)]
    #[case("shipping_days", AttributeType::Duration, Direction::LowerBetter)]
    #[case("weight_kg", AttributeType::Weight, Direction::Neutral)]
    #[case("width", AttributeType::Dimension, Direction::Neutral)]
    #[case("review_count", AttributeType::Rating, Direction::HigherBetter)]
    #[case("defect_count", AttributeType::Count, Direction::LowerBetter)]
    #[case("discount_percent", AttributeType::Percentage, Direction::HigherBetter)]
    #[case("product_id", AttributeType::Identifier, Direction::Neutral)]
    #[case("latitude", AttributeType::Coordinate, Direction::Neutral)]
    fn types_from_names(
        #[case] name: &str,
        #[case] kind: AttributeType,
        #[case] direction: Direction,
    ) {
        let profile = profile_attribute(name, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(profile.attribute_type, kind);
        assert_eq!(profile.direction, direction);
    }

    #[test]
    fn unique_integers_fall_back_to_identifier() {
        let values: Vec<f64> = (100..120).map(f64::from).collect();
        let profile = profile_attribute("code", &values);
        assert_eq!(profile.attribute_type, AttributeType::Identifier);
        assert!(!profile.is_preference_relevant);
    }

    #[test]
    fn bounded_low_cardinality_falls_back_to_rating() {
        let profile = profile_attribute("stars_given", &[1.0, 2.0, 5.0, 5.0]);
        assert_eq!(profile.attribute_type, AttributeType::Rating);

        let profile = profile_attribute("quality", &[1.0, 2.5, 3.0, 3.0, 4.5]);
        assert_eq!(profile.attribute_type, AttributeType::Rating);
    }

    #[test]
    fn one_hot_profiles_are_forced_categorical() {
        let profile = profile_attribute("color=red", &[0.0, 1.0, 1.0]);
        assert!(profile.categorical);
        assert_eq!(profile.attribute_type, AttributeType::Unknown);
        assert_eq!(profile.direction, Direction::Neutral);
        assert_eq!(profile.description, "color is red");
    }

    #[test]
    fn empty_values_give_degenerate_profile() {
        let profile = profile_attribute("price", &[]);
        assert!(profile.is_degenerate());
        assert!(!profile.is_preference_relevant);
        assert_eq!(profile.direction, Direction::Neutral);
    }

    #[test]
    fn units_are_inferred() {
        assert_eq!(profile_attribute("price", &[1.0]).unit.as_deref(), Some("$"));
        assert_eq!(
            profile_attribute("shipping_days", &[1.0]).unit.as_deref(),
            Some("days")
        );
        assert_eq!(profile_attribute("weight_kg", &[1.0]).unit.as_deref(), Some("kg"));
        assert_eq!(profile_attribute("width", &[1.0]).unit, None);
    }

    #[test]
    fn text_columns_are_categorical() {
        let profile = profile_column("color", &["red", "blue", "red", ""]);
        assert!(profile.categorical);
        assert_eq!(profile.unique_values, 2);
        assert!(profile.is_preference_relevant);
    }

    #[test]
    fn mostly_numeric_columns_parse() {
        let profile = profile_column("price", &["$10", "12", "n/a", "15", "20"]);
        assert_eq!(profile.attribute_type, AttributeType::Price);
        assert_eq!(profile.value_range.max, 20.0);
    }

    #[test]
    fn table_profiles_keep_header_order() {
        let table = RawTable::from_strs(
            &["id", "price", "color"],
            &[&["a", "1", "red"], &["b", "2", "blue"]],
        );
        let profiles = profile_table(&table);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "price", "color"]);
        assert_eq!(profiles[0].attribute_type, AttributeType::Identifier);
    }
}
