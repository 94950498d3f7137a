pub use trellis_core::prelude::*;

// vim: ts=4
