use nalgebra as na;

/// Mounting direction of a thruster nozzle, one of the six body half-axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrusterAxis {
    XPlus,
    XMinus,
    YPlus,
    YMinus,
    ZPlus,
    ZMinus,
}

impl ThrusterAxis {
    pub fn direction(self) -> na::Vector3<f64> {
        match self {
            ThrusterAxis::XPlus => na::Vector3::x(),
            ThrusterAxis::XMinus => -na::Vector3::x(),
            ThrusterAxis::YPlus => na::Vector3::y(),
            ThrusterAxis::YMinus => -na::Vector3::y(),
            ThrusterAxis::ZPlus => na::Vector3::z(),
            ThrusterAxis::ZMinus => -na::Vector3::z(),
        }
    }
}

/// A fixed thruster producing force along one body axis and the torque its
/// mounting offset implies. Pure function of the commanded power fraction.
#[derive(Debug, Clone)]
pub struct Thruster {
    pub name: String,
    /// Mounting offset from the center of mass, body frame (m).
    pub offset: na::Vector3<f64>,
    pub axis: ThrusterAxis,
    /// Largest force magnitude the thruster can produce (N).
    pub max_thrust: f64,
    /// Per-axis torque at full power: offset × direction, scaled (N·m).
    pub max_torque: na::Vector3<f64>,
    pub power: f64,
    pub thrust: na::Vector3<f64>,
    pub torque: na::Vector3<f64>,
}

impl Thruster {
    pub fn new(name: &str, offset: na::Vector3<f64>, max_thrust: f64, axis: ThrusterAxis) -> Self {
        let max_torque = offset.cross(&axis.direction()) * max_thrust;
        Thruster {
            name: name.to_string(),
            offset,
            axis,
            max_thrust,
            max_torque,
            power: 0.0,
            thrust: na::Vector3::zeros(),
            torque: na::Vector3::zeros(),
        }
    }

    pub fn direction(&self) -> na::Vector3<f64> {
        self.axis.direction()
    }

    /// Command a power fraction. The input is clamped to [0, 1]; thrust and
    /// torque scale linearly with the clamped value.
    pub fn on(&mut self, power: f64) {
        self.power = power.clamp(0.0, 1.0);
        self.thrust = self.direction() * (self.power * self.max_thrust);
        self.torque = self.max_torque * self.power;
    }

    pub fn off(&mut self) {
        self.power = 0.0;
        self.thrust = na::Vector3::zeros();
        self.torque = na::Vector3::zeros();
    }
}
