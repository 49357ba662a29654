pub mod tracker;

pub use tracker::AttemptTracker;
pub use tracker::LockoutPolicy;
