//! Interactive surface
//!
//! - `menu` - location selection and the occupancy menu loop

pub mod menu;

pub use menu::{parse_selection, InputError, MenuChoice, Session};
