pub mod menu;
pub mod preview;
