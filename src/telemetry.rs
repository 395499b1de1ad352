//! Reports for coerced settings, out-of-order calls, and broken invariants.
//!
//! The engine never fails on bad settings. It swaps, clamps, or falls back to a
//! default, and tells a [`ViolationObserver`] what it did. Without an observer
//! the report goes to `tracing` through [`TracingObserver`]; tests attach a
//! [`CollectingObserver`] and assert on what was gathered.
//!
//! # Example
//!
//! ```
//! use bingo_draw::telemetry::CollectingObserver;
//! use bingo_draw::GameBuilder;
//! use std::sync::Arc;
//!
//! let observer = Arc::new(CollectingObserver::new());
//! let mut game = GameBuilder::new()
//!     .with_seed(7)
//!     .with_violation_observer(observer.clone())
//!     .start();
//!
//! // A reversed range is swapped, and the swap is reported.
//! game.configure(10, 1, 1);
//! assert_eq!(observer.len(), 1);
//! ```

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// How bad a reported problem is. Ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// The engine substituted a corrected value and carried on.
    Warning,
    /// A request could not be honored as asked, e.g. an empty random range.
    Error,
    /// Draw state may be corrupt, e.g. a ball both drawn and remaining.
    Critical,
}

impl ViolationSeverity {
    /// Lowercase label for log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What area of the engine a report concerns.
///
/// New kinds may be added; match with a wildcard arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// Settings were coerced: a swapped range, a zero batch, a narrowed range.
    Configuration,
    /// Calls arrived out of order, such as `finish_draw` with nothing in flight.
    DrawState,
    /// Undrained events were dropped to keep the event queue bounded.
    EventQueue,
    /// The engine reached a state its own logic rules out.
    InternalError,
    /// An [`InvariantChecker`] failed. Only checked in debug builds or with `paranoid`.
    Invariant,
}

impl ViolationKind {
    /// Snake-case label for log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::DrawState => "draw_state",
            Self::EventQueue => "event_queue",
            Self::InternalError => "internal_error",
            Self::Invariant => "invariant",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report delivered to a [`ViolationObserver`].
///
/// ```
/// use bingo_draw::telemetry::{SpecViolation, ViolationKind, ViolationSeverity};
///
/// let violation = SpecViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Configuration,
///     "min_number greater than max_number, swapped",
///     "config.rs:42",
/// )
/// .with_drawn_count(0)
/// .with_context("min_number", "90");
///
/// assert!(violation.to_string().starts_with("[warning/configuration]"));
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct SpecViolation {
    /// How bad it is.
    pub severity: ViolationSeverity,
    /// Which area it concerns.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
    /// `file:line` of the report site.
    pub location: &'static str,
    /// Balls drawn at the time, when the reporter knew.
    pub drawn_count: Option<usize>,
    /// Extra key/value detail, such as the requested and applied values.
    pub context: BTreeMap<String, String>,
}

impl SpecViolation {
    /// Creates a report with no drawn count and no context.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            drawn_count: None,
            context: BTreeMap::new(),
        }
    }

    /// Attaches the number of balls drawn so far.
    #[must_use]
    pub fn with_drawn_count(mut self, drawn_count: usize) -> Self {
        self.drawn_count = Some(drawn_count);
        self
    }

    /// Attaches one key/value pair of context.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Serializes the report as one line of JSON, or `None` if that fails.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

impl fmt::Display for SpecViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {} @ {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if let Some(drawn) = self.drawn_count {
            write!(f, " drawn={drawn}")?;
        }
        for (key, value) in &self.context {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Receives reports from a game.
///
/// With the `sync-send` feature observers must also be `Send + Sync`, which
/// makes a `GameState` with an observer `Send`.
///
/// ```
/// use bingo_draw::telemetry::{SpecViolation, ViolationObserver};
///
/// struct NoticeBanner;
///
/// impl ViolationObserver for NoticeBanner {
///     fn on_violation(&self, violation: &SpecViolation) {
///         // Show `violation.message` to the caller
///         let _ = &violation.message;
///     }
/// }
/// ```
#[cfg(feature = "sync-send")]
pub trait ViolationObserver: Send + Sync {
    /// Handles one report.
    fn on_violation(&self, violation: &SpecViolation);
}

/// Receives reports from a game.
#[cfg(not(feature = "sync-send"))]
pub trait ViolationObserver {
    /// Handles one report.
    fn on_violation(&self, violation: &SpecViolation);
}

/// Logs each report through `tracing`: warnings at `warn`, the rest at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates the observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &SpecViolation) {
        let SpecViolation {
            severity,
            kind,
            message,
            location,
            drawn_count,
            context,
        } = violation;
        if *severity == ViolationSeverity::Warning {
            tracing::warn!(
                kind = kind.as_str(),
                location,
                drawn = ?drawn_count,
                ?context,
                "{message}"
            );
        } else {
            tracing::error!(
                severity = severity.as_str(),
                kind = kind.as_str(),
                location,
                drawn = ?drawn_count,
                ?context,
                "{message}"
            );
        }
    }
}

/// Keeps every report in memory, for assertions in tests.
///
/// ```
/// use bingo_draw::telemetry::{
///     CollectingObserver, SpecViolation, ViolationKind, ViolationObserver, ViolationSeverity,
/// };
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&SpecViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::DrawState,
///     "finish_draw while idle",
///     "game.rs:1",
/// ));
/// assert!(observer.has_violation(ViolationKind::DrawState));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<SpecViolation>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report so far, oldest first.
    #[must_use]
    pub fn violations(&self) -> Vec<SpecViolation> {
        self.violations.lock().clone()
    }

    /// Number of reports so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// True if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// True if a report of `kind` was collected.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// True if a report of `severity` was collected.
    #[must_use]
    pub fn has_severity(&self, severity: ViolationSeverity) -> bool {
        self.violations
            .lock()
            .iter()
            .any(|v| v.severity == severity)
    }

    /// The reports of `kind`, oldest first.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<SpecViolation> {
        let violations = self.violations.lock();
        violations
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &SpecViolation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Delivers `violation` to `observer`, or to [`TracingObserver`] when there is none.
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &SpecViolation,
) {
    match observer {
        Some(observer) => observer.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// Logs a report through [`TracingObserver`], tagged with the call site.
///
/// ```
/// use bingo_draw::report_violation;
/// use bingo_draw::telemetry::{ViolationKind, ViolationSeverity};
///
/// report_violation!(
///     ViolationSeverity::Warning,
///     ViolationKind::Configuration,
///     "batch size {} raised to {}",
///     0,
///     1
/// );
/// ```
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $($message:tt)+) => {{
        use $crate::telemetry::ViolationObserver as _;
        $crate::telemetry::TracingObserver.on_violation(&$crate::telemetry::SpecViolation::new(
            $severity,
            $kind,
            format!($($message)+),
            concat!(file!(), ":", line!()),
        ));
    }};
}

/// Delivers a report to a game's `Option<Arc<dyn ViolationObserver>>`.
///
/// Falls back to [`TracingObserver`] for `None`. An optional
/// `drawn = expr;` before the severity attaches the drawn count.
///
/// ```text
/// report_violation_to!(observer, severity, kind, "message {}", arg);
/// report_violation_to!(observer, drawn = count; severity, kind, "message");
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, drawn = $drawn:expr; $severity:expr, $kind:expr, $($message:tt)+) => {{
        let violation = $crate::telemetry::SpecViolation::new(
            $severity,
            $kind,
            format!($($message)+),
            concat!(file!(), ":", line!()),
        )
        .with_drawn_count($drawn);
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $($message:tt)+) => {{
        let violation = $crate::telemetry::SpecViolation::new(
            $severity,
            $kind,
            format!($($message)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

/// Fails the test unless the collector is empty, listing what it holds.
///
/// ```
/// use bingo_draw::{assert_no_violations, telemetry::CollectingObserver};
///
/// assert_no_violations!(CollectingObserver::new());
/// ```
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr $(, $note:expr)?) => {{
        let found = $observer.violations();
        let note: Option<String> = None $(.or(Some(format!("{}: ", $note))))?;
        assert!(
            found.is_empty(),
            "{}expected no violations, got {}: {:#?}",
            note.unwrap_or_default(),
            found.len(),
            found
        );
    }};
}

/// Fails the test unless the collector holds a report of the given kind.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr $(, $note:expr)?) => {{
        let note: Option<String> = None $(.or(Some(format!("{}: ", $note))))?;
        assert!(
            $observer.has_violation($kind),
            "{}expected a {:?} violation, got {:#?}",
            note.unwrap_or_default(),
            $kind,
            $observer.violations()
        );
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// A broken invariant, returned by [`InvariantChecker::check_invariants`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// The type that broke it.
    pub type_name: &'static str,
    /// The invariant, stated as the rule that failed.
    pub invariant: String,
    /// Offending values, if any.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// Creates a violation without details.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Attaches the offending values.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.invariant)?;
        match &self.details {
            Some(details) => write!(f, " ({details})"),
            None => Ok(()),
        }
    }
}

/// Types that can verify their own consistency.
///
/// ```
/// use bingo_draw::telemetry::{InvariantChecker, InvariantViolation};
///
/// struct Tally {
///     drawn: usize,
///     pool_size: usize,
/// }
///
/// impl InvariantChecker for Tally {
///     fn check_invariants(&self) -> Result<(), InvariantViolation> {
///         if self.drawn > self.pool_size {
///             return Err(InvariantViolation::new("Tally", "drawn <= pool_size")
///                 .with_details(format!("drawn={}, pool_size={}", self.drawn, self.pool_size)));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait InvariantChecker {
    /// Returns the first broken invariant, if any.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Runs [`InvariantChecker::check_invariants`] and logs a `Critical` report on failure.
///
/// A no-op in release builds unless the `paranoid` feature is on.
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($subject:expr $(, $during:expr)?) => {{
        use $crate::telemetry::{InvariantChecker as _, ViolationObserver as _};
        if let Err(broken) = $subject.check_invariants() {
            let violation = $crate::telemetry::SpecViolation::new(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                broken.to_string(),
                concat!(file!(), ":", line!()),
            )
            $(.with_context("during", $during))?;
            $crate::telemetry::TracingObserver.on_violation(&violation);
        }
    }};
}

/// Release build without `paranoid`: invariant checks compile away.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($subject:expr $(, $during:expr)?) => {{}};
}

/// Panics if [`InvariantChecker::check_invariants`] fails (debug builds or `paranoid`).
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! assert_invariants {
    ($subject:expr $(, $during:expr)?) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(broken) = $subject.check_invariants() {
            let during: Option<String> = None $(.or(Some(format!(" {}", $during))))?;
            panic!("invariant broken{}: {}", during.unwrap_or_default(), broken);
        }
    }};
}

/// Release build without `paranoid`: invariant assertions compile away.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! assert_invariants {
    ($subject:expr $(, $during:expr)?) => {{}};
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn swap_report() -> SpecViolation {
        SpecViolation::new(
            ViolationSeverity::Warning,
            ViolationKind::Configuration,
            "range swapped",
            "config.rs:1",
        )
    }

    struct Broken;

    impl InvariantChecker for Broken {
        fn check_invariants(&self) -> Result<(), InvariantViolation> {
            Err(InvariantViolation::new("Broken", "always fails"))
        }
    }

    #[test]
    fn severities_are_ordered() {
        assert!(ViolationSeverity::Warning < ViolationSeverity::Error);
        assert!(ViolationSeverity::Error < ViolationSeverity::Critical);
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ViolationKind::DrawState.to_string(), "draw_state");
        assert_eq!(ViolationKind::EventQueue.to_string(), "event_queue");
    }

    #[test]
    fn display_lists_drawn_count_and_context() {
        let violation = swap_report()
            .with_drawn_count(12)
            .with_context("max_number", "1")
            .with_context("min_number", "90");
        assert_eq!(
            violation.to_string(),
            "[warning/configuration] range swapped @ config.rs:1 drawn=12 max_number=1 min_number=90"
        );
    }

    #[test]
    fn collector_filters_by_kind_and_severity() {
        let observer = CollectingObserver::new();
        assert!(observer.is_empty());

        observer.on_violation(&swap_report());
        observer.on_violation(&SpecViolation::new(
            ViolationSeverity::Error,
            ViolationKind::DrawState,
            "second",
            "game.rs:2",
        ));

        assert_eq!(observer.len(), 2);
        assert!(observer.has_violation(ViolationKind::DrawState));
        assert!(!observer.has_violation(ViolationKind::Invariant));
        assert!(observer.has_severity(ViolationSeverity::Error));
        assert!(!observer.has_severity(ViolationSeverity::Critical));
        let swaps = observer.violations_of_kind(ViolationKind::Configuration);
        assert_eq!(swaps.len(), 1);
    }

    #[test]
    fn report_violation_to_attaches_drawn_count() {
        let collector = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());

        report_violation_to!(
            observer,
            drawn = 4;
            ViolationSeverity::Warning,
            ViolationKind::DrawState,
            "ignored {} call",
            "finish_draw"
        );

        let violations = collector.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].drawn_count, Some(4));
        assert_eq!(violations[0].message, "ignored finish_draw call");
        assert!(violations[0].location.contains("telemetry.rs"));
    }

    #[test]
    fn report_violation_to_without_observer_logs() {
        let observer: Option<Arc<dyn ViolationObserver>> = None;
        report_violation_to!(
            observer,
            ViolationSeverity::Warning,
            ViolationKind::Configuration,
            "logged only"
        );
    }

    #[test]
    fn debug_check_invariants_does_not_panic() {
        debug_check_invariants!(Broken, "after draw");
        debug_check_invariants!(Broken);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "invariant broken after draw: Broken: always fails")]
    fn assert_invariants_panics_with_context() {
        assert_invariants!(Broken, "after draw");
    }

    #[test]
    fn invariant_violation_display() {
        let violation =
            InvariantViolation::new("BallPool", "no duplicates").with_details("ball=7");
        assert_eq!(violation.to_string(), "BallPool: no duplicates (ball=7)");
        assert_eq!(InvariantViolation::new("BallPool", "x").to_string(), "BallPool: x");
    }

    #[cfg(feature = "json")]
    #[test]
    fn to_json_uses_snake_case_labels() {
        let json = swap_report().to_json().unwrap();
        assert!(json.contains(r#""severity":"warning""#));
        assert!(json.contains(r#""kind":"configuration""#));
        assert!(json.contains(r#""drawn_count":null"#));
    }
}
