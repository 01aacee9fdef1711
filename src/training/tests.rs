//! End-to-end tests for the training loop.

use super::*;
use crate::config::{DqnConfig, EnvConfig, SessionConfig};
use crate::error::{ConfigError, Error};
use crate::network::QFunction;
use rand::rngs::StdRng;

fn session_config(episodes: u32, seed: u64) -> SessionConfig {
    SessionConfig {
        episodes,
        steps_per_episode: 20,
        target_sync_interval: 3,
        log_interval: 1,
        seed,
    }
}

fn dqn_config() -> DqnConfig {
    DqnConfig {
        hidden_layers: vec![16, 8],
        memory_capacity: 200,
        ..DqnConfig::default()
    }
}

fn session(episodes: u32, seed: u64) -> TrainingSession {
    TrainingSession::new(
        session_config(episodes, seed),
        EnvConfig::default(),
        dqn_config(),
    )
    .unwrap()
}

#[cfg(test)]
mod construction {
    use super::*;

    #[test]
    fn test_one_agent_per_ev() {
        let env_config = EnvConfig {
            num_evs: 4,
            ..EnvConfig::default()
        };
        let s = TrainingSession::new(session_config(1, 0), env_config, dqn_config()).unwrap();
        assert_eq!(s.agents().len(), 4);
        assert_eq!(s.env().n_evs(), 4);
        assert_eq!(s.episode(), 0);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_invalid_session_config_rejected() {
        let err = TrainingSession::new(session_config(0, 0), EnvConfig::default(), dqn_config())
            .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::ZeroSessionParameter("episode count"))
        );
    }

    #[test]
    fn test_invalid_dqn_config_rejected() {
        let dqn = DqnConfig {
            batch_size: 0,
            ..dqn_config()
        };
        let err = TrainingSession::new(session_config(1, 0), EnvConfig::default(), dqn)
            .unwrap_err();
        assert!(matches!(err, Error::Agent(_)));
    }

    #[test]
    fn test_observation_dim_mismatch_rejected() {
        let err = TrainingSession::with_agents(
            session_config(1, 0),
            EnvConfig::default(),
            |rng: StdRng| DqnAgent::new(4, 2, dqn_config(), rng),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::ObservationDimMismatch { env: 5, agent: 4 })
        );
    }

    #[test]
    fn test_action_dim_mismatch_rejected() {
        let err = TrainingSession::with_agents(
            session_config(1, 0),
            EnvConfig::default(),
            |rng: StdRng| DqnAgent::new(5, 3, dqn_config(), rng),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::ActionDimMismatch { env: 2, agent: 3 })
        );
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(session(1, 0).run_id(), session(1, 0).run_id());
    }
}

#[cfg(test)]
mod determinism {
    use super::*;

    #[test]
    fn test_same_seed_same_history() {
        let mut a = session(4, 17);
        let mut b = session(4, 17);
        a.train().unwrap();
        b.train().unwrap();
        assert_eq!(a.history(), b.history());
        assert_eq!(a.env().positions(), b.env().positions());
        assert_eq!(a.env().socs(), b.env().socs());
    }

    #[test]
    fn test_same_seed_same_initial_state() {
        let a = session(1, 99);
        let b = session(1, 99);
        assert_eq!(a.env().positions(), b.env().positions());
        assert_eq!(a.env().socs(), b.env().socs());
        assert_eq!(
            a.agents()[0].policy_network().parameters(),
            b.agents()[0].policy_network().parameters()
        );
    }

    #[test]
    fn test_agents_get_distinct_streams() {
        let s = session(1, 5);
        assert_ne!(
            s.agents()[0].policy_network().parameters(),
            s.agents()[1].policy_network().parameters()
        );
    }
}

#[cfg(test)]
mod training_loop {
    use super::*;

    #[test]
    fn test_train_records_every_episode() {
        let mut s = session(5, 1);
        let history = s.train().unwrap();
        assert_eq!(history.len(), 5);
        for (i, summary) in history.iter().enumerate() {
            assert_eq!(summary.episode, i as u32);
            // Every step ends with each EV either charging or on a finished trip.
            assert!(summary.arrivals + summary.depletions >= 2);
            assert!(summary.mean_soc > 0.0 && summary.mean_soc <= 1.0);
        }
        assert_eq!(s.episode(), 5);
    }

    #[test]
    fn test_epsilon_non_increasing_and_floored() {
        let mut s = session(8, 2);
        s.train().unwrap();
        let eps: Vec<f64> = s.history().iter().map(|h| h.epsilon).collect();
        assert!((eps[0] - 0.995).abs() < 1e-12);
        for pair in eps.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert!(eps.iter().all(|&e| e >= 0.05));
    }

    #[test]
    fn test_replay_waits_for_a_full_batch() {
        // Two EVs, 20 steps: each agent holds 20 transitions after the first
        // episode, below the batch size of 32.
        let mut s = session(2, 3);
        let first = s.run_episode().unwrap();
        assert_eq!(first.mean_loss, None);
        assert!(s.agents().iter().all(|a| a.updates() == 0));

        let second = s.run_episode().unwrap();
        assert!(second.mean_loss.is_some());
        // Memory reaches 32 at step 12 of the second episode.
        assert!(s.agents().iter().all(|a| a.updates() == 9));
    }

    #[test]
    fn test_targets_synced_on_interval() {
        let mut s = session(3, 4);
        s.run_episode().unwrap();
        s.run_episode().unwrap();
        for agent in s.agents() {
            assert_ne!(
                agent.policy_network().parameters(),
                agent.target_network().parameters()
            );
        }
        s.run_episode().unwrap();
        for agent in s.agents() {
            assert_eq!(
                agent.policy_network().parameters(),
                agent.target_network().parameters()
            );
        }
    }

    #[test]
    fn test_evaluate_after_training() {
        let mut s = session(3, 6);
        s.train().unwrap();
        let metrics = s.evaluate(2).unwrap();
        assert_eq!(metrics.policy, "dqn");
        assert_eq!(metrics.n_episodes, 2);
        assert!(metrics.mean_final_soc > 0.0 && metrics.mean_final_soc <= 1.0);
    }
}
