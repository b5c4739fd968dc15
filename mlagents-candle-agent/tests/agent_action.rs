use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use mlagents_candle_agent::AgentAction;
use mlagents_core::{error::MlagentsError, Act, ActionSpec, ArrayDict, BufferArray, BufferKey};
use ndarray::array;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn branches(values: &[&[i64]]) -> Result<Vec<Tensor>> {
    Ok(values
        .iter()
        .map(|v| Tensor::new(*v, &Device::Cpu))
        .collect::<candle_core::Result<Vec<_>>>()?)
}

fn branch_values(action: &AgentAction) -> Result<Vec<Vec<i64>>> {
    Ok(action
        .discrete()
        .unwrap()
        .iter()
        .map(|t| t.to_vec1::<i64>())
        .collect::<candle_core::Result<Vec<_>>>()?)
}

#[test]
fn test_concrete_continuous() -> Result<()> {
    init();
    let continuous = Tensor::new(&[[1.0f32, 2.0]], &Device::Cpu)?;
    let action = AgentAction::new(Some(continuous), None);

    let dict = action.to_flat_arrays()?;
    assert_eq!(dict.len(), 1);
    assert_eq!(
        dict.get("continuous_action"),
        Some(&BufferArray::Float(array![[1.0f32, 2.0]].into_dyn()))
    );

    let action = AgentAction::from_flat_arrays(&dict)?;
    let continuous = action.continuous().unwrap();
    assert_eq!(continuous.dtype(), DType::F32);
    assert_eq!(continuous.to_vec2::<f32>()?, vec![vec![1.0, 2.0]]);
    assert!(action.discrete().is_none());
    Ok(())
}

#[test]
fn test_continuous_only() -> Result<()> {
    init();
    let values = vec![vec![0.25f32, -1.5, 3.0], vec![7.125, 0.0, -0.5]];
    let continuous = Tensor::new(&[[0.25f32, -1.5, 3.0], [7.125, 0.0, -0.5]], &Device::Cpu)?;
    let action = AgentAction::new(Some(continuous), None);

    let restored = AgentAction::from_flat_arrays(&action.to_flat_arrays()?)?;
    assert_eq!(restored.continuous().unwrap().to_vec2::<f32>()?, values);
    assert!(restored.discrete().is_none());
    assert_eq!(restored.len(), 2);
    Ok(())
}

#[test]
fn test_discrete_only() -> Result<()> {
    init();
    let values: &[&[i64]] = &[&[0, 1, 2, 1], &[4, 4, 0, 3]];
    let action = AgentAction::new(None, Some(branches(values)?));

    let dict = action.to_flat_arrays()?;
    assert!(!dict.contains_key(BufferKey::ContinuousAction));
    assert_eq!(
        dict.get(BufferKey::DiscreteAction),
        Some(&BufferArray::Int(
            array![[0i64, 4], [1, 4], [2, 0], [1, 3]].into_dyn()
        ))
    );

    let restored = AgentAction::from_flat_arrays(&dict)?;
    assert!(restored.continuous().is_none());
    assert_eq!(restored.num_discrete_branches(), 2);
    for t in restored.discrete().unwrap() {
        assert_eq!(t.dims(), &[4]);
        assert_eq!(t.dtype(), DType::I64);
    }
    assert_eq!(branch_values(&restored)?, vec![vec![0, 1, 2, 1], vec![4, 4, 0, 3]]);
    Ok(())
}

#[test]
fn test_discrete_shape() -> Result<()> {
    init();
    let values: &[&[i64]] = &[&[0, 1, 2, 3, 4], &[1, 1, 1, 1, 1], &[2, 0, 2, 0, 2]];
    let action = AgentAction::new(None, Some(branches(values)?));

    let dict = action.to_flat_arrays()?;
    assert_eq!(dict.get("discrete_action").unwrap().shape(), &[5, 3]);
    Ok(())
}

#[test]
fn test_mixed() -> Result<()> {
    init();
    let continuous = Tensor::new(
        &[[0.1f32, 0.2], [0.3, 0.4], [0.5, 0.6], [0.7, 0.8]],
        &Device::Cpu,
    )?;
    let values: &[&[i64]] = &[&[0, 1, 0, 1], &[2, 2, 1, 0], &[3, 0, 0, 1]];
    let action = AgentAction::new(Some(continuous.clone()), Some(branches(values)?));

    let dict = action.to_flat_arrays()?;
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(BufferKey::ContinuousAction).unwrap().shape(), &[4, 2]);
    assert!(dict.get(BufferKey::ContinuousAction).unwrap().is_float());
    assert_eq!(dict.get(BufferKey::DiscreteAction).unwrap().shape(), &[4, 3]);
    assert!(!dict.get(BufferKey::DiscreteAction).unwrap().is_float());

    let restored = AgentAction::from_flat_arrays(&dict)?;
    assert_eq!(
        restored.continuous().unwrap().to_vec2::<f32>()?,
        continuous.to_vec2::<f32>()?
    );
    assert_eq!(
        branch_values(&restored)?,
        vec![vec![0, 1, 0, 1], vec![2, 2, 1, 0], vec![3, 0, 0, 1]]
    );
    Ok(())
}

#[test]
fn test_empty() -> Result<()> {
    init();
    let action = AgentAction::default();
    assert!(action.to_flat_arrays()?.is_empty());

    let restored = AgentAction::from_flat_arrays(&ArrayDict::new())?;
    assert!(restored.continuous().is_none());
    assert!(restored.discrete().is_none());
    assert_eq!(restored.batch_size(), 0);
    Ok(())
}

#[test]
fn test_other_keys_are_ignored() -> Result<()> {
    init();
    let mut dict = ArrayDict::new();
    dict.insert("environment_rewards", array![1.0f32, 0.0].into_dyn());
    dict.insert(BufferKey::ContinuousAction, array![[2i64], [3]].into_dyn());

    let action = AgentAction::from_flat_arrays(&dict)?;
    let continuous = action.continuous().unwrap();
    assert_eq!(continuous.dtype(), DType::F32);
    assert_eq!(continuous.to_vec2::<f32>()?, vec![vec![2.0], vec![3.0]]);
    assert!(action.discrete().is_none());
    Ok(())
}

#[test]
fn test_malformed_discrete() {
    init();
    let cases = vec![
        array![1i64, 2, 3].into_dyn(),
        ndarray::ArrayD::<i64>::zeros(ndarray::IxDyn(&[4, 0])),
        ndarray::ArrayD::<i64>::zeros(ndarray::IxDyn(&[2, 1, 3])),
    ];

    for a in cases {
        let shape = a.shape().to_vec();
        let mut dict = ArrayDict::new();
        dict.insert(BufferKey::DiscreteAction, a);

        let err = AgentAction::from_flat_arrays(&dict).unwrap_err();
        match err.downcast_ref::<MlagentsError>() {
            Some(MlagentsError::ShapeMismatch { key, actual, .. }) => {
                assert_eq!(key, "discrete_action");
                assert_eq!(actual, &shape);
            }
            e => panic!("unexpected error: {:?}", e),
        }
    }
}

#[test]
fn test_to_action_tuple() -> Result<()> {
    init();
    let continuous = Tensor::new(&[[-4.5f32, 1.5], [0.0, 6.0]], &Device::Cpu)?;
    let values: &[&[i64]] = &[&[1, 0], &[2, 3]];
    let action = AgentAction::new(Some(continuous), Some(branches(values)?));

    let clipped = action.to_action_tuple(true)?;
    assert_eq!(clipped.continuous(), &array![[-1.0f32, 0.5], [0.0, 1.0]].into_dyn());
    assert_eq!(clipped.discrete(), &array![[1, 2], [0, 3]].into_dyn());

    let raw = action.to_action_tuple(false)?;
    assert_eq!(raw.continuous(), &array![[-4.5f32, 1.5], [0.0, 6.0]].into_dyn());
    assert_eq!(raw.n_agents(), 2);
    Ok(())
}

#[test]
fn test_to_action_tuple_single_component() -> Result<()> {
    init();
    let action = AgentAction::new(None, Some(branches(&[&[1, 1, 0]])?));
    let tuple = action.to_action_tuple(false)?;
    assert_eq!(tuple.continuous().shape(), &[3, 0]);
    assert_eq!(tuple.discrete(), &array![[1], [1], [0]].into_dyn());
    Ok(())
}

#[test]
fn test_flatten() -> Result<()> {
    init();
    let continuous = Tensor::new(&[[0.5f32], [-0.5]], &Device::Cpu)?;
    let values: &[&[i64]] = &[&[2, 0], &[1, 1]];
    let action = AgentAction::new(Some(continuous), Some(branches(values)?));
    let spec = ActionSpec::new(1, vec![3, 2]);

    let t = action.flatten(&spec)?;
    assert_eq!(t.dims(), &[2, spec.total_size()]);
    assert_eq!(
        t.to_vec2::<f32>()?,
        vec![
            vec![0.5, 0.0, 0.0, 1.0, 0.0, 1.0],
            vec![-0.5, 1.0, 0.0, 0.0, 0.0, 1.0],
        ]
    );
    Ok(())
}

#[test]
fn test_flatten_missing_component() {
    init();
    let action = AgentAction::new(None, None);
    let err = action.flatten(&ActionSpec::continuous(2)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<MlagentsError>(),
        Some(&MlagentsError::MissingField("continuous_action"))
    );
}

#[test]
fn test_random_action_to_agent_action() -> Result<()> {
    init();
    let spec = ActionSpec::new(2, vec![3, 4]);
    let tuple = spec.random_action(8, 0)?;

    let mut dict = ArrayDict::new();
    dict.insert(BufferKey::ContinuousAction, tuple.continuous().clone());
    dict.insert(BufferKey::DiscreteAction, tuple.discrete().mapv(|x| x as i64));

    let action = AgentAction::from_flat_arrays(&dict)?;
    assert_eq!(action.len(), 8);
    assert_eq!(action.to_action_tuple(false)?, tuple);
    assert_eq!(action.flatten(&spec)?.dims(), &[8, 9]);
    Ok(())
}
