//! Greedy policy over trained DQN agents.

use super::trait_::Policy;
use crate::error::AgentError;
use crate::network::QFunction;
use crate::training::DqnAgent;

/// Acts greedily with one agent per EV, without exploring or learning.
pub struct LearnedPolicy<'a, Q: QFunction> {
    agents: &'a [DqnAgent<Q>],
}

impl<'a, Q: QFunction> LearnedPolicy<'a, Q> {
    pub fn new(agents: &'a [DqnAgent<Q>]) -> Self {
        Self { agents }
    }
}

impl<Q: QFunction> Policy for LearnedPolicy<'_, Q> {
    fn select_actions(&mut self, observations: &[Vec<f64>]) -> Result<Vec<usize>, AgentError> {
        if observations.len() != self.agents.len() {
            return Err(AgentError::AgentCountMismatch {
                expected: self.agents.len(),
                got: observations.len(),
            });
        }
        self.agents
            .iter()
            .zip(observations)
            .map(|(agent, obs)| agent.greedy_action(obs))
            .collect()
    }

    fn name(&self) -> &str {
        "dqn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DqnConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agents(n: usize) -> Vec<DqnAgent> {
        (0..n)
            .map(|i| {
                DqnAgent::new(5, 2, DqnConfig::default(), StdRng::seed_from_u64(i as u64))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn matches_greedy_actions() {
        let agents = agents(2);
        let obs = vec![vec![0.0, 1.0, 0.5, 1.0, 7.0], vec![4.0, 3.0, 0.6, 7.0, 1.0]];
        let mut policy = LearnedPolicy::new(&agents);
        let actions = policy.select_actions(&obs).unwrap();
        assert_eq!(actions[0], agents[0].greedy_action(&obs[0]).unwrap());
        assert_eq!(actions[1], agents[1].greedy_action(&obs[1]).unwrap());
    }

    #[test]
    fn count_mismatch_rejected() {
        let agents = agents(2);
        let mut policy = LearnedPolicy::new(&agents);
        assert_eq!(
            policy.select_actions(&[vec![0.0; 5]]),
            Err(AgentError::AgentCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }
}
