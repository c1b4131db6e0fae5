pub mod cell;
pub mod data_state;
pub mod status;
pub mod value;

pub use cell::{CellFullState, CellKey, Generation};
pub use data_state::{ColumnDigest, DataDependency, DataState, DataStateDiff};
pub use status::{Suggestion, ValidationStatus};
pub use value::{is_missing_value, is_numeric_value, value_to_f64, value_to_string, value_to_usize};
