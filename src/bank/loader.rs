use std::sync::{Arc, Mutex};

use crate::bank::Bank;
use crate::bank::normalize::parse_bank;
use crate::bank::source::BankSource;

/// Loads and memoizes the normalized bank.
///
/// The slot mutex is held across the fetch, so callers racing a cold cache
/// wait on the single in-flight load instead of issuing their own. Failed
/// loads hand back an empty bank and leave the slot cold so a retry fetches
/// again.
pub struct BankLoader {
    source: Box<dyn BankSource>,
    slot: Mutex<Option<Arc<Bank>>>,
}

impl BankLoader {
    pub fn new(source: Box<dyn BankSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
        }
    }

    pub fn load(&self) -> Arc<Bank> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bank) = slot.as_ref() {
            return Arc::clone(bank);
        }

        match self.fetch_and_normalize() {
            Ok(bank) => {
                tracing::info!(
                    source = %self.source.describe(),
                    questions = bank.len(),
                    "question bank loaded"
                );
                let bank = Arc::new(bank);
                *slot = Some(Arc::clone(&bank));
                bank
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %e,
                    "question bank unavailable, continuing with an empty bank"
                );
                Arc::new(Bank::default())
            }
        }
    }

    pub fn cached(&self) -> Option<Arc<Bank>> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    /// Drop the warm cache; the next `load` fetches again.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn fetch_and_normalize(&self) -> anyhow::Result<Bank> {
        let raw = self.source.fetch()?;
        Ok(parse_bank(&raw, &mut rand::thread_rng())?)
    }
}
