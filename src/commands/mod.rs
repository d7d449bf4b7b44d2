mod cycles;
mod dereference;
mod output;
mod rules;
mod validate;

pub use cycles::cycles_command;
pub use dereference::dereference_command;
pub use output::OutputFormat;
pub use rules::rules_command;
pub use validate::validate_command;
