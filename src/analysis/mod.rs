//! Employee status analysis and exclusion resolution.

mod exclusion;
mod status;

pub use exclusion::{
    ExclusionOverride, apply_overrides, ids_compatible, normalize_name, resolve_exclusion,
    resolve_exclusions,
};
pub use status::{
    CENTURY_PIVOT, age_on, analyze_employees, birth_date_from_id, classify_employee, employed_on,
};
