// Adapters layer: concrete implementations for external systems (theme storage, e-mail delivery, animation sink).

pub mod animator;
pub mod emailjs;
pub mod theme_store;
