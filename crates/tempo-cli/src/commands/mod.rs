pub mod activity;
pub mod backup;
pub mod entries;
pub mod goal;
pub mod schema;
pub mod stats;
pub mod status;
pub mod tag;
pub mod timer;
pub mod util;
