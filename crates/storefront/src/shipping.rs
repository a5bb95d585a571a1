//! Shipping cost estimator.
//!
//! Quotes are a declared simulation, not a carrier lookup: the cost from each
//! of the two shipping origins grows linearly with the numeric distance
//! between postal codes and is rounded to the nearest 100.
//!
//! The estimator models a network round trip. A request moves it to
//! [`ShippingStatus::Pending`] for a fixed delay, then to
//! [`ShippingStatus::Quoted`]. Only the latest request can resolve: issuing a
//! new one cancels the one in flight, and a stale timer that fires anyway is
//! discarded because its generation no longer matches.

use std::sync::Arc;
use std::time::Duration;

use metafora_core::{PostalCode, PostalCodeError, Price};
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Postal code assumed when the digits cannot be used as a number.
const FALLBACK_POSTAL_NUMBER: u64 = 1000;

/// Origin a parcel ships from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Ciudad Autónoma de Buenos Aires (urban).
    Caba,
    /// Merlo, San Luis (rural).
    SanLuis,
}

impl Origin {
    /// Both origins, urban first.
    pub const ALL: [Self; 2] = [Self::Caba, Self::SanLuis];

    /// Reference postal code of the origin.
    #[must_use]
    pub const fn postal_number(self) -> u64 {
        match self {
            Self::Caba => 1000,
            Self::SanLuis => 5700,
        }
    }

    /// Flat cost before distance is added.
    #[must_use]
    pub fn base_cost(self) -> Decimal {
        match self {
            Self::Caba => Decimal::from(3500),
            Self::SanLuis => Decimal::from(3200),
        }
    }

    /// Short origin name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Caba => "CABA",
            Self::SanLuis => "San Luis",
        }
    }

    /// Label shown next to a shipping rate.
    #[must_use]
    pub fn rate_label(self) -> String {
        format!("Desde {}", self.name())
    }

    /// Label shown for in-store pickup.
    #[must_use]
    pub fn pickup_label(self) -> String {
        format!("Retiro en Tienda ({})", self.name())
    }
}

/// Cost of shipping from one origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginRate {
    pub origin: Origin,
    pub cost: Price,
}

/// Costs from both origins for one postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingQuote {
    pub postal_code: PostalCode,
    pub caba: OriginRate,
    pub san_luis: OriginRate,
}

impl ShippingQuote {
    /// Both rates, urban first.
    #[must_use]
    pub const fn rates(&self) -> [&OriginRate; 2] {
        [&self.caba, &self.san_luis]
    }
}

/// Free in-store pickup at an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPoint {
    pub origin: Origin,
    pub label: String,
    pub cost: Price,
}

/// Pickup is offered at both origins at no cost.
#[must_use]
pub fn pickup_points() -> Vec<PickupPoint> {
    Origin::ALL
        .into_iter()
        .map(|origin| PickupPoint {
            origin,
            label: origin.pickup_label(),
            cost: Price::ZERO,
        })
        .collect()
}

/// Compute a quote synchronously.
///
/// A postal code of all zeros, or one too long to fit in a `u64`, is priced
/// as if it were 1000.
#[must_use]
pub fn quote(postal_code: &PostalCode) -> ShippingQuote {
    let number = postal_code
        .number()
        .filter(|n| *n != 0)
        .unwrap_or(FALLBACK_POSTAL_NUMBER);

    ShippingQuote {
        postal_code: postal_code.clone(),
        caba: rate_from(Origin::Caba, number),
        san_luis: rate_from(Origin::SanLuis, number),
    }
}

fn rate_from(origin: Origin, number: u64) -> OriginRate {
    let distance = Decimal::from(number.abs_diff(origin.postal_number()));
    let raw = origin.base_cost() + distance * Decimal::new(8, 1);
    let hundred = Decimal::ONE_HUNDRED;
    let rounded = (raw / hundred).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * hundred;

    OriginRate {
        origin,
        // Base costs are positive and distances non-negative.
        cost: Price::new(rounded).unwrap_or_default(),
    }
}

/// Where the estimator is in its request cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShippingStatus {
    /// No request yet, or the last quote was cleared.
    #[default]
    Idle,
    /// Waiting out the simulated round trip.
    Pending { postal_code: PostalCode },
    /// Latest request resolved.
    Quoted(ShippingQuote),
}

impl ShippingStatus {
    /// The quote, if resolved.
    #[must_use]
    pub const fn quote(&self) -> Option<&ShippingQuote> {
        match self {
            Self::Quoted(quote) => Some(quote),
            _ => None,
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Status plus the generation of the request that produced it.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    generation: u64,
    status: ShippingStatus,
}

/// Subscription to estimator status changes.
#[derive(Debug, Clone)]
pub struct ShippingUpdates {
    rx: watch::Receiver<Snapshot>,
}

impl ShippingUpdates {
    /// The latest status.
    #[must_use]
    pub fn current(&self) -> ShippingStatus {
        self.rx.borrow().status.clone()
    }

    /// Wait for the next status change.
    ///
    /// Returns `None` once the estimator has been dropped.
    pub async fn changed(&mut self) -> Option<ShippingStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().status.clone())
    }

    /// Wait until a quote is surfaced.
    ///
    /// Returns `None` once the estimator has been dropped.
    pub async fn next_quote(&mut self) -> Option<ShippingQuote> {
        loop {
            if let ShippingStatus::Quoted(quote) = self.changed().await? {
                return Some(quote);
            }
        }
    }
}

/// Last-request-wins shipping estimator.
#[derive(Debug)]
pub struct ShippingEstimator {
    delay: Duration,
    state: Arc<watch::Sender<Snapshot>>,
    in_flight: Option<JoinHandle<()>>,
}

impl ShippingEstimator {
    /// Create an idle estimator that resolves requests after `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self {
            delay,
            state: Arc::new(tx),
            in_flight: None,
        }
    }

    /// The current status.
    #[must_use]
    pub fn status(&self) -> ShippingStatus {
        self.state.borrow().status.clone()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> ShippingUpdates {
        ShippingUpdates {
            rx: self.state.subscribe(),
        }
    }

    /// Start an estimate for free-form postal input.
    ///
    /// Invalid input (fewer than four digits) starts nothing and leaves the
    /// estimator exactly as it was; the error exists so callers can keep
    /// their submit control disabled, not to be shown as a failure. Valid
    /// input supersedes any request in flight.
    ///
    /// # Errors
    ///
    /// Returns the parse error for input that is not a postal code.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(self))]
    pub fn request(&mut self, input: &str) -> Result<(), PostalCodeError> {
        let postal_code = match PostalCode::parse(input) {
            Ok(code) => code,
            Err(e) => {
                debug!(error = %e, "ignoring shipping request");
                return Err(e);
            }
        };

        self.cancel_in_flight();

        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.status = ShippingStatus::Pending {
                postal_code: postal_code.clone(),
            };
            generation = snapshot.generation;
        });
        info!(postal_code = %postal_code, generation, "shipping estimate started");

        let state = Arc::clone(&self.state);
        let delay = self.delay;
        self.in_flight = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let quote = quote(&postal_code);

            let surfaced = state.send_if_modified(|snapshot| {
                if snapshot.generation != generation {
                    return false;
                }
                snapshot.status = ShippingStatus::Quoted(quote);
                true
            });

            if surfaced {
                debug!(generation, "shipping estimate resolved");
            } else {
                debug!(generation, "stale shipping estimate discarded");
            }
        }));

        Ok(())
    }

    /// Drop the current quote and cancel any request in flight.
    ///
    /// Call when the postal code input changes.
    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.state.send_if_modified(|snapshot| {
            snapshot.generation += 1;
            if snapshot.status == ShippingStatus::Idle {
                return false;
            }
            snapshot.status = ShippingStatus::Idle;
            true
        });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for ShippingEstimator {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
