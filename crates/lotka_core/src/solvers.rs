use crate::traits::{DynamicalSystem, EmbeddedStepper, Scalar, Steppable};

/// Classic Runge-Kutta 4th Order Solver
///
/// Local truncation error O(dt^5), global error O(dt^4).
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let half = T::constant(0.5);
        let sixth = T::constant(1.0 / 6.0);
        let two = T::constant(2.0);

        let t0 = *t;

        // k1 = f(t, y)
        system.apply(t0, state, &mut self.k1);

        // k2 = f(t + dt/2, y + dt*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k1[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k2);

        // k3 = f(t + dt/2, y + dt*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k2[i] * half;
        }
        system.apply(t0 + dt * half, &self.tmp, &mut self.k3);

        // k4 = f(t + dt, y + dt*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(t0 + dt, &self.tmp, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + dt * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *t = t0 + dt;
    }
}

/// Dormand-Prince 5(4) Solver
///
/// Propagates the 5th order solution and estimates the local error from the
/// embedded 4th order one.
pub struct Dopri5<T: Scalar> {
    k: [Vec<T>; 7],
    tmp: Vec<T>,
}

// Butcher tableau.
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

// 5th order weights (identical to the last tableau row, FSAL).
const B: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

// Difference between the 5th and 4th order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

impl<T: Scalar> Dopri5<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k: std::array::from_fn(|_| vec![T::zero(); dim]),
            tmp: vec![T::zero(); dim],
        }
    }

    fn stages(&mut self, system: &impl DynamicalSystem<T>, t0: T, state: &[T], dt: T) {
        system.apply(t0, state, &mut self.k[0]);
        for stage in 1..7 {
            for i in 0..state.len() {
                let mut acc = T::zero();
                for (j, &a) in A[stage].iter().enumerate().take(stage) {
                    acc = acc + T::constant(a) * self.k[j][i];
                }
                self.tmp[i] = state[i] + dt * acc;
            }
            system.apply(t0 + T::constant(C[stage]) * dt, &self.tmp, &mut self.k[stage]);
        }
    }
}

impl<T: Scalar> EmbeddedStepper<T> for Dopri5<T> {
    fn order(&self) -> u32 {
        5
    }

    fn attempt(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: T,
        state: &[T],
        dt: T,
        rtol: T,
        atol: T,
        out: &mut [T],
    ) -> T {
        self.stages(system, t, state, dt);

        // The 7th stage was evaluated at the 5th order solution, which is what tmp holds now.
        out.copy_from_slice(&self.tmp);

        let mut sum = T::zero();
        for i in 0..state.len() {
            let mut err = T::zero();
            for (j, &e) in E.iter().enumerate() {
                err = err + T::constant(e) * self.k[j][i];
            }
            err = err * dt;
            let scale = atol + rtol * state[i].abs().max(out[i].abs());
            let ratio = err / scale;
            sum = sum + ratio * ratio;
        }
        let n = T::from_usize(state.len().max(1)).unwrap_or_else(T::one);
        (sum / n).sqrt()
    }
}

impl<T: Scalar> Steppable<T> for Dopri5<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;
        self.stages(system, t0, state, dt);
        for i in 0..state.len() {
            let mut acc = T::zero();
            for (j, &b) in B.iter().enumerate() {
                acc = acc + T::constant(b) * self.k[j][i];
            }
            state[i] = state[i] + dt * acc;
        }
        *t = t0 + dt;
    }
}
