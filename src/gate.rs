use anyhow::{ensure, Context, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps the number of probes allowed to do network I/O at the same time.
///
/// Each slot is handed out as an [`Admission`] guard; dropping the guard frees the
/// slot, so a probe that fails, times out or panics still gives it back.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    sem: Arc<Semaphore>,
}

/// One reserved slot of an [`AdmissionGate`].
#[derive(Debug)]
#[must_use = "dropping the admission releases the slot immediately"]
pub struct Admission {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Create a gate with `slots` concurrent admissions. `slots` must be positive.
    pub fn new(slots: usize) -> Result<Self> {
        ensure!(slots > 0, "admission gate needs at least one slot");
        Ok(Self {
            sem: Arc::new(Semaphore::new(slots)),
        })
    }

    /// Wait until a slot is free and reserve it.
    pub async fn acquire(&self) -> Result<Admission> {
        let permit = self
            .sem
            .clone()
            .acquire_owned()
            .await
            .context("admission gate closed")?;
        Ok(Admission { _permit: permit })
    }
}
