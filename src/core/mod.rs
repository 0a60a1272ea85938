pub mod classifier;
pub mod desk;
pub mod greetings;
pub mod inbox;
pub mod knowledge;
pub mod matcher;

pub use crate::domain::model::{Domain, FaqEntry, Reply};
pub use crate::domain::ports::{FaqStore, Generator};
pub use crate::utils::error::Result;
