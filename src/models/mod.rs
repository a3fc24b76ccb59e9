pub mod boy;
pub mod donation;
pub mod lenient;
pub mod media;
pub mod sponsorship;
pub mod stats;
pub mod volunteer;
