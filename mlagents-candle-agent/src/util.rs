//! Conversions between [`Tensor`] and host arrays.
use anyhow::{bail, Result};
use candle_core::{DType, Device, Tensor, WithDType};
use mlagents_core::BufferArray;
use ndarray::ArrayD;
use num_traits::AsPrimitive;
use std::convert::TryFrom;

/// Converts [`ndarray::ArrayD`] to [`Tensor`], keeping the shape of the array.
pub fn arrayd_to_tensor<T1, T2>(a: ArrayD<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let shape = a.shape().to_vec();
    let v = a.iter().map(|e| e.as_()).collect::<Vec<_>>();
    let t: Tensor = TryFrom::<Vec<T2>>::try_from(v)?;
    let t = t.reshape(shape)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

/// Converts [`Tensor`] to [`ndarray::ArrayD`].
///
/// The tensor is detached before its values are copied to the host.
pub fn tensor_to_arrayd<T>(t: Tensor, delete_batch_dim: bool) -> Result<ArrayD<T>>
where
    T: WithDType,
{
    let shape = match delete_batch_dim {
        false => t.dims()[..].to_vec(),
        true => t.dims()[1..].to_vec(),
    };
    let v: Vec<T> = t.detach().flatten_all()?.to_vec1()?;

    Ok(ndarray::Array1::<T>::from(v).into_shape(ndarray::IxDyn(&shape))?)
}

/// Converts an array of a flat buffer to a [`Tensor`] on `device`.
///
/// The element type of the tensor is `F32` unless `dtype` overrides it with
/// `F32` or `I64`.
pub fn buffer_array_to_tensor(
    a: &BufferArray,
    dtype: Option<DType>,
    device: &Device,
) -> Result<Tensor> {
    let t = match dtype.unwrap_or(DType::F32) {
        DType::F32 => arrayd_to_tensor::<f32, f32>(a.to_f32(), false)?,
        DType::I64 => arrayd_to_tensor::<i64, i64>(a.to_i64(), false)?,
        dtype => bail!("Unsupported dtype for buffer array: {:?}", dtype),
    };
    Ok(t.to_device(device)?)
}
