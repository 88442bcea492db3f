//! Handler error types

use crate::protocol::ProtocolError;
use thiserror::Error;

/// Handler error type
///
/// Almost every failure in the session state machine is policy-silent (the
/// frame is dropped and the connection lives on); what surfaces here is
/// only what the connection loop wants to trace.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The inbound frame could not be decoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
