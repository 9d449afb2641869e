//! Column-name heuristics.
//!
//! Names are compared token-wise (`"shippingDays"` and `"shipping_days"` both yield
//! `["shipping", "days"]`) for identifiers and coordinates, and by substring for the
//! semantic keywords, which routinely appear inside compound words ("unitprice").

/// Separator between a column and a category in one-hot feature names.
pub const ONE_HOT_SEPARATOR: char = '=';

/// Category name of the overflow one-hot slot.
pub const OTHER_CATEGORY: &str = "Other";

const IDENTIFIER_TOKENS: &[&str] = &[
    "id", "ids", "uuid", "guid", "sku", "upc", "ean", "asin", "index", "idx", "row", "key",
];
const COORDINATE_TOKENS: &[&str] = &[
    "lat", "lon", "lng", "latitude", "longitude", "coord", "coords", "coordinate",
    "coordinates",
];
const TIMESTAMP_TOKENS: &[&str] = &["date", "timestamp", "created", "updated", "modified"];
const LOWER_BETTER_KEYWORDS: &[&str] = &["price", "cost", "time", "duration", "ship", "wait"];
const SCORE_KEYWORDS: &[&str] = &["rating", "score", "popularity"];
const SECONDARY_NUMERIC_KEYWORDS: &[&str] = &["rating", "score", "price"];

/// Split a column name into lowercase word tokens.
///
/// Breaks on any non-alphanumeric character and on lower-to-upper camel-case
/// transitions.
pub fn tokens(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Human-readable form of a column name (`"shipping_days"` → `"shipping days"`).
pub fn humanize(name: &str) -> String {
    let words = tokens(name);
    if words.is_empty() {
        return name.trim().to_string();
    }
    words.join(" ")
}

/// Split a one-hot feature name into `(base, value)`.
pub fn split_one_hot(name: &str) -> Option<(&str, &str)> {
    name.split_once(ONE_HOT_SEPARATOR)
}

/// Whether a feature name denotes a one-hot slot.
pub fn is_one_hot(name: &str) -> bool {
    name.contains(ONE_HOT_SEPARATOR)
}

/// Build the one-hot feature name for a column and category.
pub fn one_hot_name(column: &str, value: &str) -> String {
    format!("{}{}{}", column, ONE_HOT_SEPARATOR, value)
}

/// Lowercased substring test against a keyword list.
pub fn contains_any(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

fn has_token(name: &str, wanted: &[&str]) -> bool {
    tokens(name).iter().any(|t| wanted.contains(&t.as_str()))
}

/// Identifier-like names: `id`, `product_id`, `SKU`, `row`, `index`, ...
pub fn is_identifier_name(name: &str) -> bool {
    !is_one_hot(name) && has_token(name, IDENTIFIER_TOKENS)
}

/// Geographic coordinate names.
pub fn is_coordinate_name(name: &str) -> bool {
    has_token(name, COORDINATE_TOKENS)
}

/// Timestamp-like names (`created_at`, `release_date`, ...).
pub fn is_timestamp_name(name: &str) -> bool {
    let words = tokens(name);
    words.iter().any(|t| TIMESTAMP_TOKENS.contains(&t.as_str()))
        || (words.len() > 1 && words.last().map(String::as_str) == Some("at"))
}

/// Names whose smaller values are preferable (price, shipping time, ...).
pub fn is_lower_better_name(name: &str) -> bool {
    contains_any(name, LOWER_BETTER_KEYWORDS)
}

/// Names that already express an overall preference score.
pub fn is_score_name(name: &str) -> bool {
    contains_any(name, SCORE_KEYWORDS)
}

/// Numeric attributes that rarely make a good primary question topic on their own.
pub fn is_secondary_numeric_name(name: &str) -> bool {
    !is_one_hot(name) && contains_any(name, SECONDARY_NUMERIC_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("shipping_days", &["shipping", "days"])]
    #[case("shippingDays", &["shipping", "days"])]
    #[case("Price (USD)", &["price", "usd"])]
    #[case("ID", &["id"])]
    fn tokens_split_words(#[case] name: &str, #[case] expected: &[&str]) {
        assert_eq!(tokens(name), expected);
    }

    #[rstest]
    #[case("id", true)]
    #[case("product_id", true)]
    #[case("productId", true)]
    #[case("SKU", true)]
    #[case("idle_minutes", false)]
    #[case("width", false)]
    #[case("color=id", false)]
    fn identifier_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_identifier_name(name), expected);
    }

    #[test]
    fn timestamp_names() {
        assert!(is_timestamp_name("created_at"));
        assert!(is_timestamp_name("release_date"));
        assert!(!is_timestamp_name("delivery_time"));
    }

    #[test]
    fn one_hot_names_round_trip() {
        let name = one_hot_name("color", "red");
        assert_eq!(name, "color=red");
        assert_eq!(split_one_hot(&name), Some(("color", "red")));
    }
}
