//! Delete-with-confirmation flow.
//!
//! One confirmation before anything is sent. If the backend answers 409 the user is asked a
//! second time and, only on acceptance, the same delete is resent with the force flag. At most
//! two requests are ever issued for one target.

use crate::api::HealthTrendsClient;
use crate::{ClientResult, ErrorClass};
use healthtrends_core::DeleteTarget;

/// Blocking yes/no prompt shown to the user.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// How a delete attempt ended. Failures other than a declined force are returned as errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The first confirmation was declined; nothing was sent.
    Cancelled,
    /// Deleted on the first request.
    Deleted(String),
    /// Deleted on the forced retry after a conflict.
    Forced(String),
    /// The backend reported a conflict and the user declined to force it.
    ForceDeclined(String),
}

impl DeleteOutcome {
    pub fn status_line(&self) -> String {
        match self {
            DeleteOutcome::Cancelled => "Delete cancelled.".to_string(),
            DeleteOutcome::Deleted(msg) | DeleteOutcome::Forced(msg) => msg.clone(),
            DeleteOutcome::ForceDeclined(detail) => format!("Not deleted: {detail}"),
        }
    }
}

pub async fn delete_with_confirmation<C>(
    client: &HealthTrendsClient,
    target: &DeleteTarget,
    confirmer: &mut C,
) -> ClientResult<DeleteOutcome>
where
    C: Confirmer + ?Sized,
{
    if !confirmer.confirm(&target.confirmation_prompt()) {
        return Ok(DeleteOutcome::Cancelled);
    }

    let conflict = match client.delete_record(target, false).await {
        Ok(ack) => {
            tracing::info!("deleted {:?} record", target.class());
            return Ok(DeleteOutcome::Deleted(ack.message));
        }
        Err(e) if e.class() == ErrorClass::Conflict => e,
        Err(e) => return Err(e),
    };

    let detail = conflict.detail().unwrap_or_default().to_string();
    if !confirmer.confirm(&target.force_prompt(&detail)) {
        return Ok(DeleteOutcome::ForceDeclined(detail));
    }

    tracing::warn!("forcing delete of {:?} record after conflict", target.class());
    let ack = client.delete_record(target, true).await?;
    Ok(DeleteOutcome::Forced(ack.message))
}
