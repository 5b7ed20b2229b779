//! Command handlers behind the CLI subcommands.

pub mod candidates;
pub mod promo;
pub mod shows;
pub mod summarize;

pub use candidates::candidates;
pub use promo::{promo, PromoFlags};
pub use shows::shows;
pub use summarize::summarize;
