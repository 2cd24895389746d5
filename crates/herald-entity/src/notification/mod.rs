//! Notification domain models.

pub mod creator;
pub mod kind;
pub mod model;
pub mod priority;
pub mod targeting;

pub use creator::CreatorSnapshot;
pub use kind::NotificationKind;
pub use model::Notification;
pub use priority::Priority;
pub use targeting::{Targeting, TargetingMode};
