pub mod format;
pub mod helpers;
