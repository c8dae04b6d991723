use nalgebra as na;

/// Fixed-step semi-implicit Euler update for one (value, rate, curvature)
/// triple. The rate is advanced first and the updated rate drives the value;
/// this ordering is load-bearing for trajectory reproducibility and must not
/// be swapped for the explicit form.
pub fn semi_implicit_euler(
    f: &na::Vector3<f64>,
    df: &na::Vector3<f64>,
    ddf: &na::Vector3<f64>,
    dt: f64,
) -> (na::Vector3<f64>, na::Vector3<f64>) {
    let df_next = df + dt * ddf;
    let f_next = f + dt * df_next;
    (f_next, df_next)
}
