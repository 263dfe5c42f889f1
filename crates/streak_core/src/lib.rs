pub mod achievements;
pub mod calendar;
pub mod dashboard;
pub mod history;
pub mod instant;
pub mod interval;
pub mod journal;
pub mod levels;
pub mod oracle;
pub mod profile;
pub mod projection;
pub mod service;
pub mod stats;
pub mod store;
pub mod xp;

pub use crate::service::{StreakService, StreakServiceBuilder};
