pub const G: f64 = 6.6743015e-11; // Gravitational constant (m³/kg/s²)
pub const M_EARTH: f64 = 5.972e24; // Mass of Earth (kg)
pub const R_EARTH: f64 = 6.371e6; // Radius of Earth (m)

// Math
pub const PI: f64 = std::f64::consts::PI;
