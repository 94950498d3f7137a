pub use crate::app::App;
pub use trellis_types::prelude::*;

// vim: ts=4
