//! Request admission for single-flight operations.
//!
//! Every service keeps at most one request of a given kind in flight. A
//! [`RequestGate`] decides, for each new call, whether it is a duplicate to
//! be dropped or a fresh request, and which earlier request (if any) it
//! supersedes.
//!
//! Each admitted request gets a [`Ticket`]. Results are only applied while
//! their ticket is still current, so a response that arrives after its
//! request was superseded or reset is ignored.

/// Identifies one admitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Numeric value, mostly useful for logging.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// How a gate treats a call that arrives while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Drop the new call. Used for page loads and profile fetches.
    SkipWhileBusy,
    /// Drop the call if its key matches the in-flight one, otherwise
    /// supersede. Used for token exchange (by code) and avatar (by username).
    SkipSameKey,
    /// Always supersede. Used for like/unlike.
    Replace,
}

/// Outcome of [`RequestGate::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Duplicate call, nothing to do.
    Skip,
    /// Start a request under `ticket`.
    Start {
        /// Ticket of the new request.
        ticket: Ticket,
        /// Request that must be cancelled, if one was in flight.
        superseded: Option<Ticket>,
    },
}

/// Single-flight bookkeeping keyed by `K`.
///
/// Use `()` as the key for operations without a de-duplication key.
#[derive(Debug, Clone)]
pub struct RequestGate<K> {
    policy: GatePolicy,
    issued: u64,
    in_flight: Option<(Ticket, K)>,
}

impl<K: PartialEq> RequestGate<K> {
    /// Create an idle gate.
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            issued: 0,
            in_flight: None,
        }
    }

    /// Decide what to do with a new call for `key`.
    ///
    /// On [`Admission::Start`] the gate already records the new request as
    /// in flight; the caller must cancel `superseded` if present.
    pub fn admit(&mut self, key: K) -> Admission {
        let superseded = match (&self.in_flight, self.policy) {
            (None, _) => None,
            (Some(_), GatePolicy::SkipWhileBusy) => return Admission::Skip,
            (Some((_, current)), GatePolicy::SkipSameKey) if *current == key => {
                return Admission::Skip
            }
            (Some((ticket, _)), _) => Some(*ticket),
        };

        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some((ticket, key));
        Admission::Start { ticket, superseded }
    }

    /// Mark `ticket` as finished.
    ///
    /// Returns `false` if the ticket is stale (superseded or cancelled), in
    /// which case its result must be discarded and the gate is unchanged.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if self.is_current(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Whether `ticket` belongs to the request currently in flight.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        matches!(&self.in_flight, Some((current, _)) if *current == ticket)
    }

    /// Forget the in-flight request, returning its ticket.
    pub fn cancel(&mut self) -> Option<Ticket> {
        self.in_flight.take().map(|(ticket, _)| ticket)
    }

    /// Whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Key of the in-flight request.
    pub fn in_flight_key(&self) -> Option<&K> {
        self.in_flight.as_ref().map(|(_, key)| key)
    }

    /// The policy this gate applies.
    pub fn policy(&self) -> GatePolicy {
        self.policy
    }
}
