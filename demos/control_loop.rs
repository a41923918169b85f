// control_loop.rs — the filters wired into a periodic control task
//
// Simulates a 1D cart: a linear Kalman filter estimates position and
// velocity from a disturbed position measurement, a PID controller steers
// the estimate toward a setpoint, and an IIR section smooths the actuator
// command. Run with:
//
//     cargo run --example control_loop

use control_filters_rs::types::linalg::{Matrix, Vector};
use control_filters_rs::{IirFilter, LinearKalmanFilter, PidConfig};

const DT: f64 = 0.05;
const SETPOINT: f64 = 1.0;

fn main() {
    env_logger::init();

    // Plant state, driven by the previous actuator command as acceleration
    let mut position = 0.0;
    let mut velocity = 0.0;
    let mut command = 0.0;

    let mut estimator = LinearKalmanFilter::new(Vector::<2>::zeros());
    let mut controller = PidConfig::new(8.0, 0.4, 1.2).with_clamp(-4.0, 4.0).build();
    let mut command_shaper = IirFilter::<f64>::new(&[0.4, 0.4], &[-0.2]);

    // Constant-velocity model with the command entering through u
    let f = Matrix::<2, 2>::new(1.0, DT, 0.0, 1.0);
    let h = Matrix::<1, 2>::new(1.0, 0.0);
    let q = Matrix::<2, 2>::new(
        0.25 * DT.powi(4),
        0.5 * DT.powi(3),
        0.5 * DT.powi(3),
        DT * DT,
    );
    let r = Matrix::<1, 1>::new(0.01);

    for tick in 0..200u32 {
        velocity += command * DT;
        position += velocity * DT;

        // Deterministic disturbance standing in for sensor noise
        let measurement = position + 0.02 * (tick as f64 * 0.7).sin();

        let u = Vector::<2>::new(0.0, command * DT);
        let z = Vector::<1>::new(measurement);
        if let Err(err) = estimator.update(&f, &u, &h, &q, &r, &z) {
            log::warn!("tick {tick}: estimate held, update failed: {err}");
            continue;
        }

        let error = SETPOINT - estimator.get_state()[0];
        let raw_command = controller.update(error, DT);
        command = command_shaper.update(raw_command);

        if tick % 20 == 0 {
            println!(
                "tick {tick:3}  pos {position:7.4}  est {:7.4}  err {error:7.4}  cmd {command:7.4}",
                estimator.get_state()[0],
            );
        }
    }

    println!(
        "final position {position:.4} (setpoint {SETPOINT}), saturation {:?}",
        controller.get_saturation()
    );
}
