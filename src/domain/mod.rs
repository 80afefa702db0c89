// Domain layer: page document, core models and ports (interfaces).

pub mod document;
pub mod model;
pub mod ports;
pub mod selector;
