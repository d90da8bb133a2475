pub mod command;
pub mod error;
pub mod models;
pub mod validation;

pub use command::{Command, CommandError};
pub use error::{Committed, PersistOp, PersistenceWarning, PollError, Result};
pub use models::*;
pub use validation::*;
