//! Form-side types: handler templates, submissions and composite names.

mod name;
mod submission;
mod template;

pub use name::*;
pub use submission::*;
pub use template::*;
