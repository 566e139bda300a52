//! Rotary dial gesture translation
//!
//! The dial keeps a cumulative orientation in `[0, 360)` and splits it into
//! twelve 30° sectors. Wheel ticks rotate it by exactly one sector; pointer
//! drags rotate it by the angle swept around the dial centre. Every sector
//! change yields one [`DialCommand`] and a new dial image path.
//!
//! ```text
//!            0°
//!      sector 12 | sector 1
//!   270° ---------+--------- 90°
//!                 |
//!               180°
//! ```

use crate::image_path::sector_image;
use cellview_core::constants::{DIAL_LEFT_TOKEN, DIAL_RIGHT_TOKEN, SECTOR_COUNT, SECTOR_DEGREES};
use cellview_core::PanelError;
use serde::{Deserialize, Serialize};

/// Normalize an angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// A position in display coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Angle of `pointer` around `center`, with straight up reading as 0°
/// and angles growing clockwise
pub fn pointer_angle(pointer: Point, center: Point) -> Result<f64, PanelError> {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    if !dx.is_finite() || !dy.is_finite() {
        return Err(PanelError::NonFinite {
            what: "pointer offset",
            value: if dx.is_finite() { dy } else { dx },
        });
    }
    Ok(normalize_degrees(dy.atan2(dx).to_degrees() + 90.0))
}

/// Cumulative dial rotation, always within `[0, 360)`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Orientation(f64);

impl Orientation {
    /// Orientation at `degrees`, normalized into `[0, 360)`
    pub fn new(degrees: f64) -> Result<Self, PanelError> {
        if !degrees.is_finite() {
            return Err(PanelError::NonFinite {
                what: "orientation",
                value: degrees,
            });
        }
        Ok(Self(normalize_degrees(degrees)))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Rotate by `delta` degrees (positive is clockwise)
    pub fn rotated(self, delta: f64) -> Result<Self, PanelError> {
        if !delta.is_finite() {
            return Err(PanelError::NonFinite {
                what: "rotation",
                value: delta,
            });
        }
        Self::new(self.0 + delta)
    }

    // Both operands are finite and bounded here, so the sum is too.
    fn turned(self, delta: f64) -> Self {
        debug_assert!(delta.is_finite());
        Self(normalize_degrees(self.0 + delta))
    }

    pub fn sector(self) -> Sector {
        Sector::from_orientation(self)
    }
}

impl TryFrom<f64> for Orientation {
    type Error = PanelError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

impl From<Orientation> for f64 {
    fn from(orientation: Orientation) -> Self {
        orientation.0
    }
}

/// One of the twelve 30° dial buckets, numbered 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sector(u8);

impl Sector {
    pub fn new(value: u8) -> Result<Self, PanelError> {
        if (1..=SECTOR_COUNT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PanelError::SectorOutOfRange {
                value,
                max: SECTOR_COUNT,
            })
        }
    }

    /// `floor(orientation / 30) + 1`
    pub fn from_orientation(orientation: Orientation) -> Self {
        let index = (orientation.degrees() / SECTOR_DEGREES).floor() as u8;
        Self(index.min(SECTOR_COUNT - 1) + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Sector {
    type Error = PanelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sector> for u8 {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directional command sent to the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialCommand {
    Right,
    Left,
}

impl DialCommand {
    /// Key value understood by the keypad endpoint
    pub fn token(self) -> &'static str {
        match self {
            DialCommand::Right => DIAL_RIGHT_TOKEN,
            DialCommand::Left => DIAL_LEFT_TOKEN,
        }
    }

    /// Command for a move from sector `old` to sector `new`
    ///
    /// Only the sign of the sector margin matters, so a fast drag that skips
    /// sectors still yields one command. The pair {1, 12} sits across the
    /// 0° seam and is read as a single step in the opposite direction.
    /// Other seam-crossing jumps keep the naive sign.
    pub fn between(old: Sector, new: Sector) -> Option<Self> {
        let mut margin = i16::from(new.get()) - i16::from(old.get());
        if margin == 0 {
            return None;
        }
        let (low, high) = (old.min(new).get(), old.max(new).get());
        if low == 1 && high == SECTOR_COUNT {
            margin = -margin;
        }
        Some(if margin > 0 {
            DialCommand::Right
        } else {
            DialCommand::Left
        })
    }
}

impl std::fmt::Display for DialCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Direction of one wheel tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    Clockwise,
    CounterClockwise,
}

impl WheelDirection {
    /// Direction for a raw wheel delta; zero deltas are not ticks
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(WheelDirection::Clockwise)
        } else if delta < 0.0 {
            Some(WheelDirection::CounterClockwise)
        } else {
            None
        }
    }

    fn step(self) -> f64 {
        match self {
            WheelDirection::Clockwise => SECTOR_DEGREES,
            WheelDirection::CounterClockwise => -SECTOR_DEGREES,
        }
    }

    fn command(self) -> DialCommand {
        match self {
            WheelDirection::Clockwise => DialCommand::Right,
            WheelDirection::CounterClockwise => DialCommand::Left,
        }
    }
}

/// State of one press-drag-release interaction with the dial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    first_sample: bool,
    previous_angle: f64,
}

impl GestureSession {
    pub fn new() -> Self {
        Self {
            first_sample: true,
            previous_angle: 0.0,
        }
    }

    pub fn awaiting_first_sample(&self) -> bool {
        self.first_sample
    }

    /// Record `angle` and return the raw delta from the previous sample,
    /// or `None` for the baseline sample
    pub fn advance(&mut self, angle: f64) -> Option<f64> {
        let previous = std::mem::replace(&mut self.previous_angle, angle);
        if std::mem::take(&mut self.first_sample) {
            return None;
        }
        Some(angle - previous)
    }
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a rotation that crossed a sector boundary
#[derive(Debug, Clone, PartialEq)]
pub struct DialUpdate {
    pub command: DialCommand,
    pub sector: Sector,
    pub orientation: Orientation,
    /// Dial image path for the new sector
    pub image: String,
}

/// Turns wheel ticks and pointer drags into dial commands
///
/// `Idle` until [`press`](Self::press); motion samples are ignored while idle.
/// [`release`](Self::release) or [`focus_lost`](Self::focus_lost) end the
/// gesture. Wheel ticks are accepted in both states.
#[derive(Debug, Clone)]
pub struct DialTranslator {
    orientation: Orientation,
    session: Option<GestureSession>,
    image: String,
}

impl DialTranslator {
    /// Create an idle dial at 0° showing `image`
    pub fn new(image: impl Into<String>) -> Self {
        Self::with_orientation(image, Orientation::default())
    }

    pub fn with_orientation(image: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            orientation,
            session: None,
            image: image.into(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn sector(&self) -> Sector {
        self.orientation.sector()
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Pointer or touch went down inside the dial
    pub fn press(&mut self) {
        self.session = Some(GestureSession::new());
    }

    /// Pointer or touch went up
    pub fn release(&mut self) {
        self.session = None;
    }

    /// Input focus left the dial or the window
    pub fn focus_lost(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("Dial gesture cancelled by focus loss");
        }
    }

    /// Rotate by one sector
    ///
    /// A tick always crosses exactly one boundary, so it always emits.
    pub fn wheel(&mut self, direction: WheelDirection) -> DialUpdate {
        self.orientation = self.orientation.turned(direction.step());
        let sector = self.orientation.sector();
        self.image = sector_image(&self.image, sector);
        DialUpdate {
            command: direction.command(),
            sector,
            orientation: self.orientation,
            image: self.image.clone(),
        }
    }

    /// Feed a motion sample taken while the pointer is down
    ///
    /// Returns `Ok(None)` while idle, for the baseline sample and whenever
    /// the sample stays inside the current sector.
    pub fn pointer_moved(
        &mut self,
        pointer: Point,
        center: Point,
    ) -> Result<Option<DialUpdate>, PanelError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let angle = pointer_angle(pointer, center)?;
        let Some(delta) = session.advance(angle) else {
            return Ok(None);
        };

        let old = self.orientation.sector();
        self.orientation = self.orientation.turned(delta);
        let new = self.orientation.sector();

        let Some(command) = DialCommand::between(old, new) else {
            return Ok(None);
        };
        self.image = sector_image(&self.image, new);
        tracing::trace!("Dial sector {} -> {}: {}", old, new, command);

        Ok(Some(DialUpdate {
            command,
            sector: new,
            orientation: self.orientation,
            image: self.image.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point { x: 100.0, y: 100.0 };

    // Point on a radius-50 circle around CENTER at `degrees` (0 = up, clockwise).
    fn at(degrees: f64) -> Point {
        let rad = (degrees - 90.0).to_radians();
        Point::new(CENTER.x + 50.0 * rad.cos(), CENTER.y + 50.0 * rad.sin())
    }

    fn sector(n: u8) -> Sector {
        Sector::new(n).unwrap()
    }

    fn same_angle(a: f64, b: f64) -> bool {
        let d = (a - b).rem_euclid(360.0);
        d < 1e-9 || d > 360.0 - 1e-9
    }

    #[test]
    fn up_reads_as_zero_and_angles_grow_clockwise() {
        let angle = |x, y| pointer_angle(Point::new(x, y), CENTER).unwrap();
        assert!(same_angle(angle(100.0, 0.0), 0.0));
        assert!(same_angle(angle(200.0, 100.0), 90.0));
        assert!(same_angle(angle(100.0, 200.0), 180.0));
        assert!(same_angle(angle(0.0, 100.0), 270.0));
    }

    #[test]
    fn non_finite_pointer_is_rejected() {
        assert!(pointer_angle(Point::new(f64::NAN, 0.0), CENTER).is_err());
    }

    #[test]
    fn sector_buckets() {
        assert_eq!(Orientation::new(0.0).unwrap().sector(), sector(1));
        assert_eq!(Orientation::new(29.999).unwrap().sector(), sector(1));
        assert_eq!(Orientation::new(30.0).unwrap().sector(), sector(2));
        assert_eq!(Orientation::new(359.9).unwrap().sector(), sector(12));
        assert_eq!(Orientation::new(-10.0).unwrap().sector(), sector(12));
        assert!(Sector::new(0).is_err());
        assert!(Sector::new(13).is_err());
    }

    #[test]
    fn normalization_wraps_both_ways() {
        assert_eq!(Orientation::new(370.0).unwrap().degrees(), 10.0);
        assert_eq!(Orientation::new(-30.0).unwrap().degrees(), 330.0);
        assert_eq!(Orientation::new(-1e-20).unwrap().degrees(), 0.0);
    }

    #[test]
    fn non_finite_orientation_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                Orientation::new(bad),
                Err(PanelError::NonFinite { what: "orientation", .. })
            ));
        }
        let start = Orientation::new(10.0).unwrap();
        assert!(start.rotated(f64::NAN).is_err());
        assert!(start.rotated(f64::INFINITY).is_err());
        assert_eq!(start.rotated(-20.0).unwrap().degrees(), 350.0);
    }

    #[test]
    fn deserialization_keeps_ranges() {
        let orientation: Orientation = serde_json::from_str("720.0").unwrap();
        assert_eq!(orientation.degrees(), 0.0);
        assert_eq!(serde_json::to_string(&orientation).unwrap(), "0.0");

        assert_eq!(serde_json::from_str::<Sector>("12").unwrap(), sector(12));
        assert!(serde_json::from_str::<Sector>("0").is_err());
        assert!(serde_json::from_str::<Sector>("200").is_err());
        assert_eq!(serde_json::to_string(&sector(7)).unwrap(), "7");
    }

    #[test]
    fn seam_pair_inverts_sign() {
        assert_eq!(DialCommand::between(sector(12), sector(1)), Some(DialCommand::Right));
        assert_eq!(DialCommand::between(sector(1), sector(12)), Some(DialCommand::Left));
        assert_eq!(DialCommand::between(sector(3), sector(4)), Some(DialCommand::Right));
        assert_eq!(DialCommand::between(sector(4), sector(2)), Some(DialCommand::Left));
        assert_eq!(DialCommand::between(sector(5), sector(5)), None);
    }

    #[test]
    fn other_seam_jumps_keep_naive_sign() {
        // 11 -> 2 going forward across 0° still reads as a backwards margin.
        assert_eq!(DialCommand::between(sector(11), sector(2)), Some(DialCommand::Left));
    }

    #[test]
    fn tokens() {
        assert_eq!(DialCommand::Right.token(), "DIAL:RIGH");
        assert_eq!(DialCommand::Left.token(), "DIAL:LEFT");
    }

    #[test]
    fn wheel_steps_one_sector_and_rewrites_image() {
        let mut dial = DialTranslator::new("/static/img/dial1.png");
        let update = dial.wheel(WheelDirection::Clockwise);
        assert_eq!(update.command, DialCommand::Right);
        assert_eq!(update.sector, sector(2));
        assert_eq!(update.image, "/static/img/dial2.png");

        dial.wheel(WheelDirection::CounterClockwise);
        let update = dial.wheel(WheelDirection::CounterClockwise);
        assert_eq!(update.command, DialCommand::Left);
        assert_eq!(update.orientation.degrees(), 330.0);
        assert_eq!(dial.image(), "/static/img/dial12.png");
    }

    #[test]
    fn wheel_delta_sign() {
        assert_eq!(WheelDirection::from_delta(3.0), Some(WheelDirection::Clockwise));
        assert_eq!(WheelDirection::from_delta(-1.0), Some(WheelDirection::CounterClockwise));
        assert_eq!(WheelDirection::from_delta(0.0), None);
    }

    #[test]
    fn motion_is_ignored_while_idle() {
        let mut dial = DialTranslator::new("dial1.png");
        assert_eq!(dial.pointer_moved(at(0.0), CENTER).unwrap(), None);
        assert_eq!(dial.pointer_moved(at(90.0), CENTER).unwrap(), None);
        assert_eq!(dial.orientation().degrees(), 0.0);
    }

    #[test]
    fn first_sample_sets_baseline_only() {
        let mut dial = DialTranslator::new("dial1.png");
        dial.press();
        assert!(dial.session().unwrap().awaiting_first_sample());
        assert_eq!(dial.pointer_moved(at(200.0), CENTER).unwrap(), None);
        assert_eq!(dial.orientation().degrees(), 0.0);
        assert!(!dial.session().unwrap().awaiting_first_sample());
    }

    #[test]
    fn drag_within_sector_emits_nothing() {
        let mut dial =
            DialTranslator::with_orientation("dial1.png", Orientation::new(5.0).unwrap());
        dial.press();
        dial.pointer_moved(at(10.0), CENTER).unwrap();
        assert_eq!(dial.pointer_moved(at(25.0), CENTER).unwrap(), None);
        assert!((dial.orientation().degrees() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn drag_forward_across_seam_emits_right() {
        let mut dial =
            DialTranslator::with_orientation("dial12.png", Orientation::new(350.0).unwrap());
        dial.press();
        dial.pointer_moved(at(40.0), CENTER).unwrap();
        let update = dial.pointer_moved(at(60.0), CENTER).unwrap().unwrap();
        assert!((update.orientation.degrees() - 10.0).abs() < 1e-9);
        assert_eq!(update.sector, sector(1));
        assert_eq!(update.command, DialCommand::Right);
        assert_eq!(update.image, "dial1.png");
    }

    #[test]
    fn pointer_crossing_its_own_seam_uses_raw_delta() {
        // Pointer moves from 350° to 10°: the raw delta is -340°, which
        // normalizes to a +20° rotation of the dial.
        let mut dial =
            DialTranslator::with_orientation("dial1.png", Orientation::new(25.0).unwrap());
        dial.press();
        dial.pointer_moved(at(350.0), CENTER).unwrap();
        let update = dial.pointer_moved(at(10.0), CENTER).unwrap().unwrap();
        assert!((update.orientation.degrees() - 45.0).abs() < 1e-6);
        assert_eq!(update.command, DialCommand::Right);
    }

    #[test]
    fn fast_drag_collapses_to_one_command() {
        let mut dial = DialTranslator::new("dial1.png");
        dial.press();
        dial.pointer_moved(at(0.0), CENTER).unwrap();
        let update = dial.pointer_moved(at(135.0), CENTER).unwrap().unwrap();
        assert_eq!(update.sector, sector(5));
        assert_eq!(update.command, DialCommand::Right);
    }

    #[test]
    fn release_and_focus_loss_end_the_gesture() {
        let mut dial = DialTranslator::new("dial1.png");
        dial.press();
        assert!(dial.is_active());
        dial.release();
        assert!(!dial.is_active());

        dial.press();
        dial.focus_lost();
        assert!(!dial.is_active());
        assert_eq!(dial.pointer_moved(at(90.0), CENTER).unwrap(), None);
    }

    #[test]
    fn new_press_resets_baseline() {
        let mut dial = DialTranslator::new("dial1.png");
        dial.press();
        dial.pointer_moved(at(0.0), CENTER).unwrap();
        dial.release();

        dial.press();
        // Far from the previous sample, but this is a new baseline.
        assert_eq!(dial.pointer_moved(at(180.0), CENTER).unwrap(), None);
        assert_eq!(dial.orientation().degrees(), 0.0);
    }
}
