//! Transport-agnostic application state.
//!
//! `CoreState` is the single shared state behind every HTTP handler.
//! Wrapped in `Arc` at startup; interior locks keep reads concurrent
//! and writes exclusive. The schedule is a cache derived from the
//! medication list and is rebuilt under the same critical section as
//! any list change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::cart::{format_cents, Cart, CartError, CartView, OrderReceipt};
use crate::config;
use crate::models::{CandidateRecord, MedicationRecord};
use crate::scan::{detect_image_mime, fields, RecognitionError, ScanOutcome, TextRecognizer};
use crate::schedule::{self, ScheduleEntry};
use crate::store::{MedicationStore, StoreError};

// ═══════════════════════════════════════════════════════════
// CoreState — shared by every HTTP handler
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// Medication list plus its backing file.
    store: RwLock<MedicationStore>,
    /// Today's dose entries, derived from the list. Rebuilt on every
    /// list change, which also resets taken checkmarks.
    schedule: RwLock<Vec<ScheduleEntry>>,
    /// Mock pharmacy cart.
    cart: Mutex<Cart>,
    /// Label text recognizer. Blocking; calls go through `spawn_blocking`.
    recognizer: Arc<dyn TextRecognizer>,
    /// At most one label scan at a time; vision models are heavyweight.
    scan_in_flight: AtomicBool,
    /// At most one mock checkout at a time.
    checkout_in_flight: AtomicBool,
    /// Simulated payment delay. Shortened in tests.
    checkout_delay: Duration,
}

impl CoreState {
    pub fn new(store: MedicationStore, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let entries = schedule::generate(store.list());
        Self {
            store: RwLock::new(store),
            schedule: RwLock::new(entries),
            cart: Mutex::new(Cart::default()),
            recognizer,
            scan_in_flight: AtomicBool::new(false),
            checkout_in_flight: AtomicBool::new(false),
            checkout_delay: config::CHECKOUT_DELAY,
        }
    }

    /// Override the checkout delay. Tests use a few milliseconds.
    pub fn with_checkout_delay(mut self, delay: Duration) -> Self {
        self.checkout_delay = delay;
        self
    }

    // ── Medications ─────────────────────────────────────────

    pub fn medications(&self) -> Result<Vec<MedicationRecord>, CoreError> {
        let store = self.store.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(store.list().to_vec())
    }

    pub fn medication_count(&self) -> Result<usize, CoreError> {
        let store = self.store.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(store.list().len())
    }

    /// Add a confirmed candidate and rebuild the schedule.
    ///
    /// Lock order is store before schedule, here and everywhere else.
    pub fn add_medication(
        &self,
        candidate: CandidateRecord,
    ) -> Result<MedicationRecord, CoreError> {
        let mut store = self.store.write().map_err(|_| CoreError::LockPoisoned)?;
        let record = store.add(candidate)?;

        let mut entries = self.schedule.write().map_err(|_| CoreError::LockPoisoned)?;
        *entries = schedule::generate(store.list());

        Ok(record)
    }

    // ── Label scanning ──────────────────────────────────────

    /// Run one label photo through the recognizer and extract fields.
    ///
    /// The in-flight flag is taken before the first await, so of two
    /// racing calls exactly one proceeds and the other gets
    /// `ScanInFlight` immediately.
    pub async fn scan(&self, image_bytes: Vec<u8>) -> Result<ScanOutcome, CoreError> {
        if detect_image_mime(&image_bytes).is_none() {
            return Err(CoreError::Recognition(RecognitionError::UnreadableImage));
        }

        if self.scan_in_flight.swap(true, Ordering::SeqCst) {
            return Err(CoreError::ScanInFlight);
        }

        let recognizer = Arc::clone(&self.recognizer);
        let join = tokio::task::spawn_blocking(move || recognizer.recognize(&image_bytes)).await;
        self.scan_in_flight.store(false, Ordering::SeqCst);

        let text = match join {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(CoreError::Recognition(e)),
            Err(e) => return Err(CoreError::RecognitionTask(e.to_string())),
        };

        let candidate = fields::extract(&text);
        let recognized_chars = text.chars().count();
        tracing::debug!(chars = recognized_chars, name = %candidate.name, "Label scan complete");

        Ok(ScanOutcome {
            recognized_chars,
            candidate,
        })
    }

    pub fn is_scan_in_flight(&self) -> bool {
        self.scan_in_flight.load(Ordering::SeqCst)
    }

    // ── Schedule ────────────────────────────────────────────

    pub fn schedule_entries(&self) -> Result<Vec<ScheduleEntry>, CoreError> {
        let entries = self.schedule.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(entries.clone())
    }

    pub fn toggle_schedule_entry(&self, entry_id: &str) -> Result<ScheduleEntry, CoreError> {
        let mut entries = self.schedule.write().map_err(|_| CoreError::LockPoisoned)?;
        schedule::toggle(&mut entries, entry_id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownScheduleEntry(entry_id.to_string()))
    }

    // ── Cart ────────────────────────────────────────────────

    pub fn cart_view(&self) -> Result<CartView, CoreError> {
        let cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(cart.view())
    }

    pub fn add_to_cart(&self, medication_id: &Uuid) -> Result<CartView, CoreError> {
        let record = {
            let store = self.store.read().map_err(|_| CoreError::LockPoisoned)?;
            store
                .find(medication_id)
                .cloned()
                .ok_or(CoreError::UnknownMedication(*medication_id))?
        };

        let mut cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
        cart.add(&record);
        Ok(cart.view())
    }

    pub fn remove_from_cart(&self, medication_id: &Uuid) -> Result<CartView, CoreError> {
        let mut cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
        cart.remove(medication_id);
        Ok(cart.view())
    }

    pub fn clear_cart(&self) -> Result<CartView, CoreError> {
        let mut cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
        cart.clear();
        Ok(cart.view())
    }

    /// Mock checkout: hold the order for the configured delay, then
    /// clear the cart and hand back a receipt.
    ///
    /// Same single-flight shape as `scan`: the flag is taken before the
    /// first await, so a second racing checkout fails fast.
    pub async fn checkout(&self) -> Result<OrderReceipt, CoreError> {
        if self.checkout_in_flight.swap(true, Ordering::SeqCst) {
            return Err(CoreError::Cart(CartError::CheckoutInFlight));
        }

        let result = self.checkout_inner().await;
        self.checkout_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn checkout_inner(&self) -> Result<OrderReceipt, CoreError> {
        // Totals are snapshotted up front: the receipt reflects the cart
        // as the user confirmed it, not whatever it drifts to while the
        // mock payment runs. The guard must drop before the await.
        let (total_cents, item_count) = {
            let cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
            if cart.is_empty() {
                return Err(CoreError::Cart(CartError::EmptyCart));
            }
            (cart.total_cents(), cart.unit_count())
        };

        tokio::time::sleep(self.checkout_delay).await;

        let mut cart = self.cart.lock().map_err(|_| CoreError::LockPoisoned)?;
        cart.clear();

        let receipt = OrderReceipt {
            order_id: Uuid::new_v4(),
            total_cents,
            total: format_cents(total_cents),
            item_count,
            placed_at: Utc::now(),
        };
        tracing::info!(order_id = %receipt.order_id, total = %receipt.total, "Mock order placed");
        Ok(receipt)
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Cart(#[from] CartError),
    #[error("{0}")]
    Recognition(#[from] RecognitionError),
    #[error("A scan is already in progress")]
    ScanInFlight,
    #[error("Recognition task failed: {0}")]
    RecognitionTask(String),
    #[error("No schedule entry with id {0}")]
    UnknownScheduleEntry(String),
    #[error("No medication with id {0}")]
    UnknownMedication(Uuid),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
