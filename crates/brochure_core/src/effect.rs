use crate::{GenerationRequest, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the in-flight request of a superseded session.
    CancelSession { session_id: SessionId },
    /// Start the network request for a freshly created session.
    Submit {
        session_id: SessionId,
        request: GenerationRequest,
    },
}
