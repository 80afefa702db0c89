pub mod page;
pub mod script;

pub use page::{DispatchOutcome, Page, PageSnapshot};
pub use script::{EventScript, ScriptReport, ScriptStep, TargetRef};
