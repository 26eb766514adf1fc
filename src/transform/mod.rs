//! Pure row transforms applied between extraction and loading.
//!
//! Every function here takes borrowed input and returns new records; nothing
//! mutates the extracted rows.

pub mod date;
pub mod diagnosis;
pub mod name;

pub use self::date::parse_dob;
pub use self::diagnosis::{diagnosis_codes, empty_token_count, explode_diagnoses};
pub use self::name::{is_sentinel_name, split_full_name};

use crate::models::{NewPerson, RawPatientRecord};

/// Normalize one raw record into the person row that will be loaded
pub fn normalize_person(record: &RawPatientRecord) -> NewPerson {
    let name = split_full_name(&record.full_name);
    NewPerson {
        first_name: name.first_name,
        last_name: name.last_name,
        dob: parse_dob(&record.dob_string),
        legacy_id: record.raw_id,
    }
}
