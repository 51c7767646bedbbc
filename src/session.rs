//! Measurement state: a reference pair, an actual pair and the reference length.
//!
//! Each pair fills start first, then end, and ignores further points until it
//! is reset. The actual object's length is its pixel length scaled by
//! `reference_length / reference pixel length`.

use std::fmt;

// ── Points ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Euclidean distance in pixels.
pub fn distance(p: Point, q: Point) -> f64 {
    let dx = f64::from(p.x) - f64::from(q.x);
    let dy = f64::from(p.y) - f64::from(q.y);
    (dx * dx + dy * dy).sqrt()
}

/// Two endpoints of one measurement group. `start` is always filled before `end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointPair {
    start: Option<Point>,
    end: Option<Point>,
}

impl PointPair {
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Returns false when the pair already holds both points.
    pub fn set_point(&mut self, point: Point) -> bool {
        if self.start.is_none() {
            self.start = Some(point);
            true
        } else if self.end.is_none() {
            self.end = Some(point);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Both endpoints, when both are set and distinct.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match (self.start, self.end) {
            (Some(s), Some(e)) if s != e => Some((s, e)),
            _ => None,
        }
    }

    pub fn pixel_length(&self) -> Option<f64> {
        self.endpoints().map(|(s, e)| distance(s, e))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Reference,
    Actual,
}

impl Group {
    pub fn name(self) -> &'static str {
        match self {
            Group::Reference => "Reference",
            Group::Actual => "Actual",
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter an input!")]
    MissingInput,
    #[error("Please try again with a larger value!")]
    NonPositiveLength,
    #[error("Please change the reference length!")]
    MissingReferenceLength,
    #[error("Please change the reference object coordinates!")]
    IncompleteReferencePair,
    #[error("Please change the actual object coordinates!")]
    IncompleteActualPair,
}

impl SessionError {
    /// Title of the dialog reporting this error.
    pub fn title(self) -> &'static str {
        match self {
            SessionError::MissingInput => "No input",
            SessionError::NonPositiveLength => "Length Error",
            SessionError::MissingReferenceLength
            | SessionError::IncompleteReferencePair
            | SessionError::IncompleteActualPair => "Error",
        }
    }
}

// ── Session ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Session {
    reference: PointPair,
    actual: PointPair,
    reference_length: Option<f64>,
    result: Option<f64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(&self, group: Group) -> &PointPair {
        match group {
            Group::Reference => &self.reference,
            Group::Actual => &self.actual,
        }
    }

    fn pair_mut(&mut self, group: Group) -> &mut PointPair {
        match group {
            Group::Reference => &mut self.reference,
            Group::Actual => &mut self.actual,
        }
    }

    pub fn set_point(&mut self, group: Group, x: u32, y: u32) -> bool {
        let recorded = self.pair_mut(group).set_point(Point::new(x, y));
        if recorded {
            log::debug!("{} point recorded at ({x}, {y})", group.name());
        } else {
            log::debug!("{} pair is full, ignoring ({x}, {y})", group.name());
        }
        recorded
    }

    pub fn reset(&mut self, group: Group) {
        self.pair_mut(group).reset();
        log::debug!("{} pair reset", group.name());
    }

    pub fn reference_length(&self) -> Option<f64> {
        self.reference_length
    }

    /// `None` means the entry dialog was cancelled.
    pub fn set_reference_length(&mut self, value: Option<f64>) -> Result<f64, SessionError> {
        let value = value.ok_or(SessionError::MissingInput)?;
        if !value.is_finite() || value <= 0.0 {
            return Err(SessionError::NonPositiveLength);
        }
        self.reference_length = Some(value);
        log::info!("reference length set to {value}");
        Ok(value)
    }

    pub fn compute(&self) -> Result<f64, SessionError> {
        let reference_length = self
            .reference_length
            .filter(|len| *len > 0.0)
            .ok_or(SessionError::MissingReferenceLength)?;
        let ref_dist = self
            .reference
            .pixel_length()
            .ok_or(SessionError::IncompleteReferencePair)?;
        let act_dist = self
            .actual
            .pixel_length()
            .ok_or(SessionError::IncompleteActualPair)?;
        Ok(act_dist * (reference_length / ref_dist))
    }

    /// Computes the measurement and keeps it for display. A failure leaves the
    /// previous result in place.
    pub fn submit(&mut self) -> Result<f64, SessionError> {
        let value = self.compute()?;
        self.result = Some(value);
        log::info!("actual object length computed: {value}");
        Ok(value)
    }

    pub fn result(&self) -> Option<f64> {
        self.result
    }

    // Display strings, rebuilt from state on every frame.

    pub fn start_label(&self, group: Group) -> String {
        point_label("Start", self.pair(group).start())
    }

    pub fn end_label(&self, group: Group) -> String {
        point_label("End", self.pair(group).end())
    }

    pub fn reference_length_label(&self) -> String {
        match self.reference_length() {
            Some(len) => format!("Reference Length: {len}"),
            None => "Reference Length: unset".to_owned(),
        }
    }

    pub fn result_label(&self) -> String {
        match self.result() {
            Some(value) => format!("{value:.4}"),
            None => "...".to_owned(),
        }
    }
}

fn point_label(name: &str, point: Option<Point>) -> String {
    match point {
        Some(p) => format!("{name}: {p}"),
        None => format!("{name}: unset"),
    }
}
