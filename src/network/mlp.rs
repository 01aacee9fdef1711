//! Dense ReLU network with an Adam optimizer, in plain Rust.
//!
//! Architecture: `input → hidden[0] → … → hidden[k-1] → n_actions`, ReLU on
//! every hidden layer and a linear output.

use rand::Rng;

use super::{check_action, check_observation, QFunction, QTarget};
use crate::error::{AgentError, ConfigError};

/// Fully connected layer, weights stored row-major as `[outputs][inputs]`.
#[derive(Debug, Clone, PartialEq)]
struct Dense {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl Dense {
    /// Uniform `±1/sqrt(fan_in)` initialization for weights and biases.
    fn new<R: Rng>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (inputs as f64).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.gen_range(-bound..=bound))
            .collect();
        let bias = (0..outputs).map(|_| rng.gen_range(-bound..=bound)).collect();
        Self {
            inputs,
            outputs,
            weights,
            bias,
        }
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>() + b)
            .collect()
    }

    fn n_params(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

/// Adam moment estimates, laid out like [`MlpQNetwork::parameters`].
#[derive(Debug, Clone)]
struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    t: i32,
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Adam {
    fn new(lr: f64, n_params: usize) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            m: vec![0.0; n_params],
            v: vec![0.0; n_params],
        }
    }

    /// Applies one bias-corrected Adam update to `params` in place.
    fn step<'a>(&mut self, params: impl Iterator<Item = &'a mut f64>, grads: &[f64]) {
        self.t += 1;
        let c1 = 1.0 - self.beta1.powi(self.t);
        let c2 = 1.0 - self.beta2.powi(self.t);
        for (i, p) in params.enumerate() {
            let g = grads[i];
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = self.m[i] / c1;
            let v_hat = self.v[i] / c2;
            *p -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

/// Multi-layer perceptron Q-network.
#[derive(Debug, Clone)]
pub struct MlpQNetwork {
    layers: Vec<Dense>,
    optimizer: Adam,
}

impl MlpQNetwork {
    /// Creates a randomly initialized network.
    ///
    /// # Arguments
    ///
    /// * `input_dim` - Observation length
    /// * `n_actions` - Number of discrete actions
    /// * `hidden` - Hidden layer widths, e.g. `[128, 64]`
    /// * `learning_rate` - Adam step size
    /// * `rng` - Source for weight initialization
    pub fn new<R: Rng>(
        input_dim: usize,
        n_actions: usize,
        hidden: &[usize],
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if input_dim == 0 {
            return Err(ConfigError::ZeroDimension("input"));
        }
        if n_actions == 0 {
            return Err(ConfigError::ZeroDimension("output"));
        }
        if hidden.contains(&0) {
            return Err(ConfigError::ZeroDimension("hidden"));
        }
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(ConfigError::NonPositiveLearningRate(learning_rate));
        }

        let widths: Vec<usize> = std::iter::once(input_dim)
            .chain(hidden.iter().copied())
            .chain(std::iter::once(n_actions))
            .collect();
        let layers: Vec<Dense> = widths
            .windows(2)
            .map(|w| Dense::new(w[0], w[1], rng))
            .collect();
        let n_params = layers.iter().map(Dense::n_params).sum();

        Ok(Self {
            layers,
            optimizer: Adam::new(learning_rate, n_params),
        })
    }

    /// Activations of every layer, input first, output last.
    fn forward_trace(&self, x: &[f64]) -> Vec<Vec<f64>> {
        let mut trace = Vec::with_capacity(self.layers.len() + 1);
        trace.push(x.to_vec());
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let mut out = layer.forward(&trace[i]);
            if i < last {
                out.iter_mut().for_each(|v| *v = v.max(0.0));
            }
            trace.push(out);
        }
        trace
    }

    fn n_params(&self) -> usize {
        self.optimizer.m.len()
    }

    /// Offsets of each layer's weights within the flat parameter vector.
    fn layer_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.layers.len());
        let mut acc = 0;
        for layer in &self.layers {
            offsets.push(acc);
            acc += layer.n_params();
        }
        offsets
    }
}

impl QFunction for MlpQNetwork {
    fn input_dim(&self) -> usize {
        self.layers[0].inputs
    }

    fn n_actions(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs
    }

    fn q_values(&self, observation: &[f64]) -> Result<Vec<f64>, AgentError> {
        check_observation(observation, self.input_dim())?;
        let mut trace = self.forward_trace(observation);
        Ok(trace.pop().unwrap_or_default())
    }

    fn fit(&mut self, batch: &[QTarget<'_>]) -> Result<f64, AgentError> {
        if batch.is_empty() {
            return Ok(0.0);
        }
        for sample in batch {
            check_observation(sample.observation, self.input_dim())?;
            check_action(sample.action, self.n_actions())?;
        }

        let scale = 1.0 / batch.len() as f64;
        let offsets = self.layer_offsets();
        let mut grads = vec![0.0; self.n_params()];
        let mut loss = 0.0;

        for sample in batch {
            let trace = self.forward_trace(sample.observation);
            let output = &trace[trace.len() - 1];
            let error = output[sample.action] - sample.target;
            loss += error * error * scale;

            // d(mean sq. error)/dQ is nonzero only for the taken action.
            let mut delta = vec![0.0; output.len()];
            delta[sample.action] = 2.0 * error * scale;

            for (l, layer) in self.layers.iter().enumerate().rev() {
                let input = &trace[l];
                let w_off = offsets[l];
                let b_off = w_off + layer.weights.len();
                for (o, &d) in delta.iter().enumerate() {
                    if d == 0.0 {
                        continue;
                    }
                    let row = w_off + o * layer.inputs;
                    for (i, &x) in input.iter().enumerate() {
                        grads[row + i] += d * x;
                    }
                    grads[b_off + o] += d;
                }

                if l > 0 {
                    let mut prev = vec![0.0; layer.inputs];
                    for (o, &d) in delta.iter().enumerate() {
                        if d == 0.0 {
                            continue;
                        }
                        let row = &layer.weights[o * layer.inputs..(o + 1) * layer.inputs];
                        for (p, w) in prev.iter_mut().zip(row) {
                            *p += w * d;
                        }
                    }
                    // ReLU derivative of the hidden activation feeding this layer.
                    for (p, &a) in prev.iter_mut().zip(input) {
                        if a <= 0.0 {
                            *p = 0.0;
                        }
                    }
                    delta = prev;
                }
            }
        }

        let params = self
            .layers
            .iter_mut()
            .flat_map(|l| l.weights.iter_mut().chain(l.bias.iter_mut()));
        self.optimizer.step(params, &grads);

        Ok(loss)
    }

    fn duplicate(&self) -> Result<Self, AgentError> {
        Ok(self.clone())
    }

    fn copy_from(&mut self, source: &Self) -> Result<(), AgentError> {
        let same_shape = self.layers.len() == source.layers.len()
            && self
                .layers
                .iter()
                .zip(&source.layers)
                .all(|(a, b)| a.inputs == b.inputs && a.outputs == b.outputs);
        if !same_shape {
            return Err(AgentError::Network(
                "cannot copy parameters between networks of different shape".into(),
            ));
        }
        for (dst, src) in self.layers.iter_mut().zip(&source.layers) {
            dst.weights.copy_from_slice(&src.weights);
            dst.bias.copy_from_slice(&src.bias);
        }
        Ok(())
    }

    fn parameters(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().chain(&l.bias).copied())
            .collect()
    }
}
