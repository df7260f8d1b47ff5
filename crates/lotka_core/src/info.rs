//! Static model metadata served by the informational endpoints.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub equations: [&'static str; 2],
    pub parameters: Vec<ParameterInfo>,
}

pub fn model_info() -> ModelInfo {
    ModelInfo {
        name: "Lotka-Volterra Predator-Prey Model",
        description: "Two coupled first-order ODEs describing how a prey population grows \
            on its own and is consumed by a predator population, which in turn dies off \
            without prey. Solutions oscillate periodically around the coexistence equilibrium.",
        equations: ["dx/dt = alpha*x - beta*x*y", "dy/dt = delta*x*y - gamma*y"],
        parameters: vec![
            ParameterInfo {
                name: "x0",
                symbol: "x(0)",
                description: "Initial prey population",
            },
            ParameterInfo {
                name: "y0",
                symbol: "y(0)",
                description: "Initial predator population",
            },
            ParameterInfo {
                name: "alpha",
                symbol: "α",
                description: "Prey birth rate",
            },
            ParameterInfo {
                name: "beta",
                symbol: "β",
                description: "Predation rate (prey lost per predator encounter)",
            },
            ParameterInfo {
                name: "gamma",
                symbol: "γ",
                description: "Predator death rate",
            },
            ParameterInfo {
                name: "delta",
                symbol: "δ",
                description: "Predator growth rate per prey consumed",
            },
            ParameterInfo {
                name: "T",
                symbol: "T",
                description: "Total simulated time",
            },
        ],
    }
}
