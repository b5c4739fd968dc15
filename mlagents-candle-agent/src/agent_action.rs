//! Actions of agents as tensors.
use crate::util::{buffer_array_to_tensor, tensor_to_arrayd};
use anyhow::Result;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::encoding::one_hot;
use log::trace;
use mlagents_core::{error::MlagentsError, Act, ActionSpec, ActionTuple, ArrayDict, BufferKey};
use ndarray::{ArrayD, IxDyn};
use std::convert::TryFrom;

/// Continuous and discrete actions of a batch of agents.
///
/// `continuous` has the shape `[batch, continuous_size]`. `discrete` holds one
/// tensor of shape `[batch]` per discrete branch, in branch order. Either of
/// them is `None` when the action space has no such component.
///
/// The actions are converted to the named arrays of a flat buffer with
/// [`AgentAction::to_flat_arrays`] and read back with
/// [`AgentAction::from_flat_arrays`]. Continuous and discrete actions are
/// stored under separate keys to keep the buffer flat.
#[derive(Clone, Debug, Default)]
pub struct AgentAction {
    continuous: Option<Tensor>,
    discrete: Option<Vec<Tensor>>,
}

impl AgentAction {
    /// Constructs an action from its components.
    pub fn new(continuous: Option<Tensor>, discrete: Option<Vec<Tensor>>) -> Self {
        Self {
            continuous,
            discrete,
        }
    }

    /// Continuous actions, `[batch, continuous_size]`.
    pub fn continuous(&self) -> Option<&Tensor> {
        self.continuous.as_ref()
    }

    /// Discrete actions, one `[batch]` tensor per branch.
    pub fn discrete(&self) -> Option<&[Tensor]> {
        self.discrete.as_deref()
    }

    /// Returns the number of discrete branches, 0 if there are no discrete actions.
    pub fn num_discrete_branches(&self) -> usize {
        self.discrete.as_ref().map_or(0, |d| d.len())
    }

    /// Returns the batch size, 0 if the action is empty.
    pub fn batch_size(&self) -> usize {
        let lead = |t: &Tensor| t.dims().first().copied().unwrap_or(1);
        match (&self.continuous, &self.discrete) {
            (Some(c), _) => lead(c),
            (None, Some(d)) => d.first().map_or(0, lead),
            (None, None) => 0,
        }
    }

    /// Returns the discrete actions stacked along a new last axis,
    /// `[batch, num_branches]`.
    ///
    /// Fails with [`MlagentsError::MissingField`] if there are no discrete actions.
    pub fn discrete_tensor(&self) -> Result<Tensor> {
        let discrete = self
            .discrete
            .as_ref()
            .ok_or(MlagentsError::MissingField("discrete_action"))?;
        Ok(Tensor::stack(discrete.as_slice(), D::Minus1)?)
    }

    /// Stacked discrete actions of shape `[batch, num_branches]`.
    ///
    /// Branches given as `[batch, k]` tensors stack to `[batch, k, num_branches]`;
    /// only the first column of each branch is kept.
    fn stacked_discrete(&self) -> Result<Tensor> {
        let t = self.discrete_tensor()?;
        match t.rank() {
            2 => Ok(t),
            3 => Ok(t.i((.., 0, ..))?),
            _ => Err(MlagentsError::ShapeMismatch {
                key: BufferKey::DiscreteAction.to_string(),
                expected: "[batch] or [batch, k] per branch".to_string(),
                actual: t.dims().to_vec(),
            }
            .into()),
        }
    }

    /// Returns the actions as named arrays of a flat buffer.
    ///
    /// Continuous actions are stored under `continuous_action` as `f32` and
    /// discrete actions under `discrete_action` as `i64` with the shape
    /// `[batch, num_branches]`. Absent components are not stored.
    pub fn to_flat_arrays(&self) -> Result<ArrayDict> {
        let mut dict = ArrayDict::new();

        if let Some(continuous) = &self.continuous {
            let a = tensor_to_arrayd::<f32>(continuous.to_dtype(DType::F32)?, false)?;
            trace!("{}: {:?}", BufferKey::ContinuousAction, a.shape());
            dict.insert(BufferKey::ContinuousAction, a);
        }

        if self.discrete.is_some() {
            let t = self.stacked_discrete()?.to_dtype(DType::I64)?;
            let a = tensor_to_arrayd::<i64>(t, false)?;
            trace!("{}: {:?}", BufferKey::DiscreteAction, a.shape());
            dict.insert(BufferKey::DiscreteAction, a);
        }

        Ok(dict)
    }

    /// Constructs an action from the named arrays of a flat buffer.
    ///
    /// Tensors are created on the CPU. See [`AgentAction::from_flat_arrays_on`].
    pub fn from_flat_arrays(dict: &ArrayDict) -> Result<Self> {
        Self::from_flat_arrays_on(dict, crate::Device::Cpu)
    }

    /// Constructs an action from the named arrays of a flat buffer, creating
    /// tensors on `device`.
    ///
    /// `continuous_action` becomes an `F32` tensor. `discrete_action` must have
    /// the shape `[batch, num_branches]` with at least one branch; it is read as
    /// `I64` and split into one `[batch]` tensor per branch. Other keys are
    /// ignored. Fails if candle was built without support for `device`.
    pub fn from_flat_arrays_on(dict: &ArrayDict, device: crate::Device) -> Result<Self> {
        let device = &device.to_candle()?;
        let continuous = match dict.get(BufferKey::ContinuousAction) {
            Some(a) => Some(buffer_array_to_tensor(a, None, device)?),
            None => None,
        };

        let discrete = match dict.get(BufferKey::DiscreteAction) {
            Some(a) => {
                let shape = a.shape();
                if shape.len() != 2 || shape[1] == 0 {
                    return Err(MlagentsError::ShapeMismatch {
                        key: BufferKey::DiscreteAction.to_string(),
                        expected: "[batch, num_branches] with num_branches > 0".to_string(),
                        actual: shape.to_vec(),
                    }
                    .into());
                }

                let t = buffer_array_to_tensor(a, Some(DType::I64), device)?;
                let branches = (0..shape[1])
                    .map(|i| t.i((.., i)))
                    .collect::<candle_core::Result<Vec<_>>>()?;
                Some(branches)
            }
            None => None,
        };

        trace!(
            "from_flat_arrays: continuous {:?}, {} discrete branches",
            continuous.as_ref().map(|t| t.dims().to_vec()),
            discrete.as_ref().map_or(0, |d| d.len())
        );

        Ok(Self {
            continuous,
            discrete,
        })
    }

    /// Returns the actions as host arrays to be sent to the environment.
    ///
    /// With `clip`, continuous actions are clamped to `[-3, 3]` and scaled by
    /// `1/3`.
    /// Absent components become zero-width arrays.
    pub fn to_action_tuple(&self, clip: bool) -> Result<ActionTuple> {
        let n = self.batch_size();

        let continuous = match &self.continuous {
            Some(t) => {
                let t = t.to_dtype(DType::F32)?;
                let t = match clip {
                    true => (t.clamp(-3f32, 3f32)? / 3.0)?,
                    false => t,
                };
                tensor_to_arrayd::<f32>(t, false)?
            }
            None => ArrayD::zeros(IxDyn(&[n, 0])),
        };

        let discrete = match &self.discrete {
            Some(_) => {
                let t = self.stacked_discrete()?.to_dtype(DType::I64)?;
                let a = tensor_to_arrayd::<i64>(t, false)?;
                let v = a
                    .iter()
                    .map(|&x| i32::try_from(x))
                    .collect::<Result<Vec<_>, _>>()?;
                ArrayD::from_shape_vec(a.raw_dim(), v)?
            }
            None => ArrayD::zeros(IxDyn(&[n, 0])),
        };

        Ok(ActionTuple::new(continuous, discrete)?)
    }

    /// Returns continuous actions concatenated with one-hot encoded discrete
    /// actions, `[batch, spec.total_size()]` of `F32`.
    pub fn flatten(&self, spec: &ActionSpec) -> Result<Tensor> {
        let mut parts = vec![];

        if spec.continuous_size > 0 {
            let continuous = self
                .continuous
                .as_ref()
                .ok_or(MlagentsError::MissingField("continuous_action"))?;
            parts.push(continuous.to_dtype(DType::F32)?);
        }

        if spec.discrete_size() > 0 {
            let discrete = self
                .discrete
                .as_ref()
                .ok_or(MlagentsError::MissingField("discrete_action"))?;
            if discrete.len() != spec.discrete_size() {
                return Err(MlagentsError::ShapeMismatch {
                    key: BufferKey::DiscreteAction.to_string(),
                    expected: format!("{} branches", spec.discrete_size()),
                    actual: vec![discrete.len()],
                }
                .into());
            }
            for (t, &n) in discrete.iter().zip(spec.discrete_branches.iter()) {
                let t = t.flatten_all()?.to_dtype(DType::I64)?;
                parts.push(one_hot(t, n, 1f32, 0f32)?);
            }
        }

        match parts.is_empty() {
            true => {
                let device = self
                    .continuous
                    .as_ref()
                    .map_or(Device::Cpu, |t| t.device().clone());
                Ok(Tensor::zeros((self.batch_size(), 0), DType::F32, &device)?)
            }
            false => Ok(Tensor::cat(&parts, 1)?),
        }
    }
}

impl Act for AgentAction {
    fn len(&self) -> usize {
        self.batch_size()
    }
}
