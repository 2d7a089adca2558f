//! Line-delimited JSON result files exported by JATOS.

mod parse;
mod table;

pub use parse::{TrialFileFormat, parse_jatos_data, parse_labjs_data, parse_trial_file};
pub use table::{DataTable, Record};
