//! Brochure app: UI-facing controller wiring the core state machine to the
//! engine. A frontend owns a `Controller`, feeds it user messages, and calls
//! `pump` from its tick to fold engine events back into the view model.
mod controller;

pub use controller::Controller;
