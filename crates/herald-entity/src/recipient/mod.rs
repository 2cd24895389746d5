//! Per-recipient read and visibility state.

pub mod counts;
pub mod model;
pub mod surface;
pub mod view;

pub use counts::{UnreadCounts, UnreadSummary};
pub use model::RecipientState;
pub use surface::Surface;
pub use view::RecipientView;
