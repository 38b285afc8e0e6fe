pub mod engine;
pub mod matcher;
pub mod params;

pub use engine::{FingerprintEngine, FingerprintSpec};
pub use matcher::{Matcher, MATCH_THRESHOLD};
pub use params::FingerprintParams;
