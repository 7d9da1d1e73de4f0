//! Brochure core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod request;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use request::{validate, GenerationMode, GenerationRequest, ValidationError};
pub use state::{AppState, FormState, GeneratedDocument, Session, SessionId, SessionStatus};
pub use update::update;
pub use view_model::AppViewModel;
