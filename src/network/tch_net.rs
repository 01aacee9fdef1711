//! Q-network on tch-rs (PyTorch bindings).
//!
//! Same architecture as [`super::MlpQNetwork`]: `obs_dim → hidden… →
//! n_actions` with ReLU activations, trained with Adam.
//! This module is only available with the `rl-nn` feature.

use tch::{nn, nn::Module, nn::OptimizerConfig, Device, Kind, Tensor};

use super::{check_action, check_observation, QFunction, QTarget};
use crate::error::{AgentError, ConfigError};

fn backend_error(e: tch::TchError) -> AgentError {
    AgentError::Network(e.to_string())
}

/// MLP Q-network backed by a libtorch variable store.
pub struct TchQNetwork {
    vs: nn::VarStore,
    net: nn::Sequential,
    opt: nn::Optimizer,
    input_dim: usize,
    n_actions: usize,
    hidden: Vec<usize>,
    learning_rate: f64,
}

impl TchQNetwork {
    /// Creates a new network on `device`.
    pub fn new(
        input_dim: usize,
        n_actions: usize,
        hidden: &[usize],
        learning_rate: f64,
        device: Device,
    ) -> Result<Self, AgentError> {
        if input_dim == 0 {
            return Err(ConfigError::ZeroDimension("input").into());
        }
        if n_actions == 0 {
            return Err(ConfigError::ZeroDimension("output").into());
        }
        if hidden.contains(&0) {
            return Err(ConfigError::ZeroDimension("hidden").into());
        }
        if !(learning_rate > 0.0) {
            return Err(ConfigError::NonPositiveLearningRate(learning_rate).into());
        }

        let vs = nn::VarStore::new(device);
        let net = Self::build(&vs.root(), input_dim, n_actions, hidden);
        let opt = nn::Adam::default()
            .build(&vs, learning_rate)
            .map_err(backend_error)?;

        Ok(Self {
            vs,
            net,
            opt,
            input_dim,
            n_actions,
            hidden: hidden.to_vec(),
            learning_rate,
        })
    }

    fn build(p: &nn::Path, input_dim: usize, n_actions: usize, hidden: &[usize]) -> nn::Sequential {
        let mut net = nn::seq();
        let mut width = input_dim as i64;
        for (i, &h) in hidden.iter().enumerate() {
            net = net
                .add(nn::linear(
                    p / format!("l{}", i + 1),
                    width,
                    h as i64,
                    Default::default(),
                ))
                .add_fn(|x| x.relu());
            width = h as i64;
        }
        net.add(nn::linear(
            p / "out",
            width,
            n_actions as i64,
            Default::default(),
        ))
    }

    /// Device the parameters live on.
    pub fn device(&self) -> Device {
        self.vs.device()
    }

    fn to_tensor(&self, rows: &[&[f64]]) -> Tensor {
        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|r| r.iter().map(|&v| v as f32))
            .collect();
        Tensor::from_slice(&flat)
            .view([rows.len() as i64, self.input_dim as i64])
            .to_device(self.device())
    }
}

impl QFunction for TchQNetwork {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn q_values(&self, observation: &[f64]) -> Result<Vec<f64>, AgentError> {
        check_observation(observation, self.input_dim)?;
        let x = self.to_tensor(&[observation]);
        let q = tch::no_grad(|| self.net.forward(&x));
        Vec::<f64>::try_from(&q.to_kind(Kind::Double).view([-1])).map_err(backend_error)
    }

    fn fit(&mut self, batch: &[QTarget<'_>]) -> Result<f64, AgentError> {
        if batch.is_empty() {
            return Ok(0.0);
        }
        for sample in batch {
            check_observation(sample.observation, self.input_dim)?;
            check_action(sample.action, self.n_actions)?;
        }

        let device = self.device();
        let rows: Vec<&[f64]> = batch.iter().map(|s| s.observation).collect();
        let states = self.to_tensor(&rows);
        let actions: Vec<i64> = batch.iter().map(|s| s.action as i64).collect();
        let actions = Tensor::from_slice(&actions).to_device(device);
        let targets: Vec<f32> = batch.iter().map(|s| s.target as f32).collect();
        let targets = Tensor::from_slice(&targets).to_device(device);

        let current = self
            .net
            .forward(&states)
            .gather(1, &actions.unsqueeze(1), false)
            .squeeze_dim(1);
        let loss = current.mse_loss(&targets, tch::Reduction::Mean);
        self.opt.backward_step(&loss);

        Ok(loss.double_value(&[]))
    }

    fn duplicate(&self) -> Result<Self, AgentError> {
        let mut copy = Self::new(
            self.input_dim,
            self.n_actions,
            &self.hidden,
            self.learning_rate,
            self.device(),
        )?;
        copy.copy_from(self)?;
        Ok(copy)
    }

    fn copy_from(&mut self, source: &Self) -> Result<(), AgentError> {
        self.vs.copy(&source.vs).map_err(backend_error)
    }

    fn parameters(&self) -> Vec<f64> {
        let mut named: Vec<(String, Tensor)> = self.vs.variables().into_iter().collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));
        named
            .iter()
            .flat_map(|(_, t)| {
                Vec::<f64>::try_from(&t.to_kind(Kind::Double).view([-1])).unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_net() -> TchQNetwork {
        TchQNetwork::new(5, 2, &[16, 8], 1e-3, Device::Cpu).unwrap()
    }

    #[test]
    fn forward_shape() {
        let net = make_net();
        assert_eq!(net.q_values(&[0.5; 5]).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_copies_parameters() {
        let net = make_net();
        let copy = net.duplicate().unwrap();
        assert_eq!(net.parameters(), copy.parameters());
    }

    #[test]
    fn fit_changes_parameters() {
        let mut net = make_net();
        let before = net.parameters();
        let obs = [1.0, 0.0, 0.5, 1.0, 7.0];
        net.fit(&[QTarget {
            observation: &obs,
            action: 0,
            target: 5.0,
        }])
        .unwrap();
        assert_ne!(before, net.parameters());
    }
}
