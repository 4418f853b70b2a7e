//! Database table operations

mod release_table;
mod track_table;
mod user_table;

pub use release_table::{ReleaseTable, SweepReport};
pub use track_table::TrackTable;
pub use user_table::UserTable;
