//! Host-side actions sent to the environment manager.
use crate::{error::MlagentsError, Act, BufferKey};
use ndarray::{ArrayD, IxDyn};

/// Continuous and discrete actions of a set of agents as host arrays.
///
/// `continuous` has the shape `[n_agents, continuous_size]` and `discrete`
/// has the shape `[n_agents, num_branches]`. An action space without one of
/// the components is represented with a zero-width trailing axis, so both
/// arrays always agree on the number of agents.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionTuple {
    pub(crate) continuous: ArrayD<f32>,
    pub(crate) discrete: ArrayD<i32>,
}

fn check_rank2(key: BufferKey, shape: &[usize]) -> Result<(), MlagentsError> {
    if shape.len() != 2 {
        return Err(MlagentsError::ShapeMismatch {
            key: key.to_string(),
            expected: "[n_agents, size]".to_string(),
            actual: shape.to_vec(),
        });
    }
    Ok(())
}

impl ActionTuple {
    /// Constructs an action tuple from both components.
    pub fn new(continuous: ArrayD<f32>, discrete: ArrayD<i32>) -> Result<Self, MlagentsError> {
        check_rank2(BufferKey::ContinuousAction, continuous.shape())?;
        check_rank2(BufferKey::DiscreteAction, discrete.shape())?;

        if continuous.shape()[0] != discrete.shape()[0] {
            return Err(MlagentsError::ShapeMismatch {
                key: BufferKey::DiscreteAction.to_string(),
                expected: format!("[{}, num_branches]", continuous.shape()[0]),
                actual: discrete.shape().to_vec(),
            });
        }

        Ok(Self {
            continuous,
            discrete,
        })
    }

    /// Constructs an action tuple having only continuous actions.
    pub fn with_continuous(continuous: ArrayD<f32>) -> Result<Self, MlagentsError> {
        check_rank2(BufferKey::ContinuousAction, continuous.shape())?;
        let n = continuous.shape()[0];
        Self::new(continuous, ArrayD::zeros(IxDyn(&[n, 0])))
    }

    /// Constructs an action tuple having only discrete actions.
    pub fn with_discrete(discrete: ArrayD<i32>) -> Result<Self, MlagentsError> {
        check_rank2(BufferKey::DiscreteAction, discrete.shape())?;
        let n = discrete.shape()[0];
        Self::new(ArrayD::zeros(IxDyn(&[n, 0])), discrete)
    }

    /// Continuous actions, `[n_agents, continuous_size]`.
    pub fn continuous(&self) -> &ArrayD<f32> {
        &self.continuous
    }

    /// Discrete actions, `[n_agents, num_branches]`.
    pub fn discrete(&self) -> &ArrayD<i32> {
        &self.discrete
    }

    /// Returns the number of agents.
    pub fn n_agents(&self) -> usize {
        self.continuous.shape()[0]
    }

    /// Decomposes into `(continuous, discrete)`.
    pub fn into_parts(self) -> (ArrayD<f32>, ArrayD<i32>) {
        (self.continuous, self.discrete)
    }
}

impl Act for ActionTuple {
    fn len(&self) -> usize {
        self.n_agents()
    }
}
