//! Description of an action space.
use crate::{error::MlagentsError, ActionTuple};
use anyhow::Result;
use log::debug;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Action space of an agent.
///
/// An action space has `continuous_size` real-valued components and one
/// categorical branch per entry of `discrete_branches`, whose value is the
/// number of choices of the branch. Either part may be empty.
///
/// ```
/// use mlagents_core::ActionSpec;
///
/// let spec = ActionSpec::default().continuous_size(2).discrete_branches(vec![3, 2]);
/// assert_eq!(spec.discrete_size(), 2);
/// assert_eq!(spec.total_size(), 7);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Default)]
pub struct ActionSpec {
    /// Number of continuous action components.
    #[serde(default)]
    pub continuous_size: usize,

    /// Number of choices of each discrete branch.
    #[serde(default)]
    pub discrete_branches: Vec<usize>,
}

impl ActionSpec {
    /// Constructs an action spec.
    pub fn new(continuous_size: usize, discrete_branches: Vec<usize>) -> Self {
        Self {
            continuous_size,
            discrete_branches,
        }
    }

    /// Constructs a purely continuous action spec.
    pub fn continuous(continuous_size: usize) -> Self {
        Self::new(continuous_size, vec![])
    }

    /// Constructs a purely discrete action spec.
    pub fn discrete(discrete_branches: Vec<usize>) -> Self {
        Self::new(0, discrete_branches)
    }

    /// Sets the number of continuous action components.
    pub fn continuous_size(mut self, v: usize) -> Self {
        self.continuous_size = v;
        self
    }

    /// Sets the sizes of the discrete branches.
    pub fn discrete_branches(mut self, v: Vec<usize>) -> Self {
        self.discrete_branches = v;
        self
    }

    /// Returns `true` if the space has only continuous actions.
    pub fn is_continuous(&self) -> bool {
        self.continuous_size > 0 && self.discrete_branches.is_empty()
    }

    /// Returns `true` if the space has only discrete actions.
    pub fn is_discrete(&self) -> bool {
        self.continuous_size == 0 && !self.discrete_branches.is_empty()
    }

    /// Returns the number of discrete branches.
    pub fn discrete_size(&self) -> usize {
        self.discrete_branches.len()
    }

    /// Width of an action whose discrete branches are one-hot encoded.
    pub fn total_size(&self) -> usize {
        self.continuous_size + self.discrete_branches.iter().sum::<usize>()
    }

    /// Checks that every discrete branch has at least one choice.
    pub fn validate(&self) -> Result<(), MlagentsError> {
        if let Some(i) = self.discrete_branches.iter().position(|&n| n == 0) {
            return Err(MlagentsError::InvalidActionSpec(format!(
                "discrete branch {} has no choices",
                i
            )));
        }
        Ok(())
    }

    /// Returns zero actions for `n_agents` agents.
    pub fn empty_action(&self, n_agents: usize) -> ActionTuple {
        ActionTuple {
            continuous: ArrayD::zeros(IxDyn(&[n_agents, self.continuous_size])),
            discrete: ArrayD::zeros(IxDyn(&[n_agents, self.discrete_size()])),
        }
    }

    /// Samples uniformly random actions for `n_agents` agents.
    ///
    /// Continuous components are drawn from `[-1, 1)` and every discrete
    /// branch from `[0, branch_size)`.
    pub fn random_action(&self, n_agents: usize, seed: u64) -> Result<ActionTuple> {
        self.validate()?;
        let rng = fastrand::Rng::with_seed(seed);

        let continuous = (0..n_agents * self.continuous_size)
            .map(|_| rng.f32() * 2.0 - 1.0)
            .collect::<Vec<_>>();
        let continuous =
            ArrayD::from_shape_vec(IxDyn(&[n_agents, self.continuous_size]), continuous)?;

        let discrete = (0..n_agents)
            .flat_map(|_| {
                self.discrete_branches
                    .iter()
                    .map(|&n| rng.i32(0..n as i32))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let discrete = ArrayD::from_shape_vec(IxDyn(&[n_agents, self.discrete_size()]), discrete)?;

        Ok(ActionTuple {
            continuous,
            discrete,
        })
    }

    /// Loads the action spec from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let spec: Self = serde_yaml::from_reader(rdr)?;
        spec.validate()?;
        debug!("Loaded action spec from {:?}", path_);
        Ok(spec)
    }

    /// Saves the action spec as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        debug!("Saved action spec to {:?}", path_);
        Ok(())
    }
}
