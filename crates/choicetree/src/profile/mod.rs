//! Attribute profiling.
//!
//! Classifies each raw column into a semantic [`AttributeType`], computes summary
//! statistics, and infers preference [`Direction`], unit and description. Profiles are
//! immutable once computed; a build produces one per raw column.
//!
//! ```
//! use choicetree::profile::{profile_attribute, AttributeType, Direction};
//!
//! let profile = profile_attribute("price", &[19.0, 25.0, 49.0, 99.0]);
//! assert_eq!(profile.attribute_type, AttributeType::Price);
//! assert_eq!(profile.direction, Direction::LowerBetter);
//! assert_eq!(profile.unit.as_deref(), Some("$"));
//! ```

pub mod naming;
mod profiler;
mod types;

pub use profiler::{find_profile, profile_attribute, profile_column, profile_table, NUMERIC_CELL_RATIO};
pub use types::{AttributeProfile, AttributeType, Direction, Scale, ValueRange};
