use crate::gnc::burns::BurnPlan;

/// A maneuver order handed to the controller, either from a scripted
/// command or auto-armed by a finishing maneuver.
#[derive(Debug, Clone, PartialEq)]
pub enum ManeuverRequest {
    /// Climb to a circular orbit of the given radius.
    Geo { radius: f64 },
    /// Align the body +x axis with the velocity vector and match the
    /// rotation rate to the orbital rate.
    Synchronize,
    /// Two-impulse transfer from the current circular orbit to the given
    /// radius.
    Hohmann { radius: f64 },
    /// Leave the surface at 90% main-engine power.
    Takeoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoPhase {
    /// Radial climb toward the target radius.
    Approach,
    /// Tilted thrust building tangential speed until radius, speed and
    /// attitude are all inside tolerance.
    Reaching,
}

/// Active GEO-insertion state. Thrusters are chosen once at arm time and
/// never reselected mid-maneuver.
#[derive(Debug, Clone)]
pub struct GeoInsertion {
    pub phase: GeoPhase,
    pub target_radius: f64,
    pub target_speed: f64,
    /// Radius fraction at which the approach tips over into reaching.
    pub switch_threshold: f64,
    pub gamma_approach: f64,
    pub gamma_reaching: f64,
    /// Single-tick lateral power pulse fired at the phase switch.
    pub rot_pulse: f64,
    pub main: String,
    pub lateral: String,
    pub eps_radius: f64,
    pub eps_speed: f64,
    pub eps_angle: f64,
}

impl GeoInsertion {
    pub const SWITCH_THRESHOLD: f64 = 0.80;
    pub const GAMMA_APPROACH: f64 = 0.025;
    pub const GAMMA_REACHING: f64 = 0.02;
    pub const ROT_PULSE_SCALE: f64 = 0.0015;
    pub const EPSILON: f64 = 0.02;
}

#[derive(Debug, Clone)]
pub enum SyncPhase {
    /// Cancel the current spin about the z axis.
    Stop { plan: BurnPlan, iteration: u32 },
    /// Coast until −uy points at the planet center.
    Wait { period: f64 },
    /// Spin up to one revolution per orbital period.
    Sync { plan: BurnPlan, iteration: u32 },
}

#[derive(Debug, Clone)]
pub struct RotationSync {
    pub phase: SyncPhase,
    pub epsilon: f64,
}

impl RotationSync {
    pub const ALIGN_EPSILON: f64 = 0.005;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HohmannPhase {
    /// Departure burn (plus alignment spin) onto the transfer ellipse.
    ReachElliptic,
    /// Unpowered coast over the half ellipse.
    OnElliptic,
    /// Arrival circularization burn.
    ReachGeo,
}

#[derive(Debug, Clone)]
pub struct HohmannTransfer {
    pub phase: HohmannPhase,
    pub target_radius: f64,
    /// Half-ellipse coast duration (s).
    pub transfer_time: f64,
    /// Simulated time at which the coast ends.
    pub stop_at: f64,
    /// Active translational burn; replaced by the arrival plan at
    /// circularization.
    pub plan: BurnPlan,
    /// Alignment spin fired alongside the departure burn.
    pub rotation: Option<BurnPlan>,
    /// Tick counter shared by the departure burns.
    pub iteration: u32,
}
