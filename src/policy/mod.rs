//! Policy trait and baseline implementations.

pub mod learned;
pub mod nearest;
pub mod random;
pub mod trait_;

pub use learned::LearnedPolicy;
pub use nearest::NearestStationPolicy;
pub use random::RandomPolicy;
pub use trait_::Policy;
