pub mod case_study;
pub mod enums;
pub mod features;
pub mod prediction;

pub use case_study::*;
pub use enums::*;
pub use features::*;
pub use prediction::*;

/// Current UTC time at the millisecond precision the store keeps.
pub fn timestamp_now() -> chrono::DateTime<chrono::Utc> {
    use chrono::SubsecRound;
    chrono::Utc::now().trunc_subsecs(3)
}
