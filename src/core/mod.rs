pub mod cards;
pub mod contact;
pub mod discovery;
pub mod effects;
pub mod intro;
pub mod menu;
pub mod scroll;
pub mod theme;

pub use cards::{CardCoordinator, CardId, CardState, ExpansionView, GroupId};
pub use crate::utils::error::Result;
