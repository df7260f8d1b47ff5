use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the rate model and the steppers.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {
    /// Lifts an `f64` constant into the scalar type.
    /// Unrepresentable constants become NaN so the divergence checks catch them.
    fn constant(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::nan)
    }
}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Represents a continuous-time dynamical system dx/dt = f(t, x).
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// x: current state
    /// t: current time
    /// out: buffer to write dx/dt into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);

    /// Upper bound on the magnitude of the Jacobian near `x`.
    /// Fixed-step integrators shrink their step as it grows; zero means unknown.
    fn rate_bound(&self, _t: T, _x: &[T]) -> T {
        T::zero()
    }
}

/// A trait for solvers that can step a system forward by a fixed amount.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// A solver with an embedded lower-order solution, used for local error control.
pub trait EmbeddedStepper<T: Scalar> {
    /// Order of the propagated solution; drives the step-size controller exponent.
    fn order(&self) -> u32;

    /// Attempts a step of size dt from (t, state) without committing it.
    /// The candidate solution is written to `out` and the scaled RMS error norm
    /// (accept when <= 1) is returned.
    fn attempt(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: T,
        state: &[T],
        dt: T,
        rtol: T,
        atol: T,
        out: &mut [T],
    ) -> T;
}
