//! Conversions between `image` buffers and kornia tensors.

use image::{GrayImage, RgbImage};
use kornia::image::{Image, ImageSize, allocator::CpuAllocator};

use crate::error::InternalComputationError;

pub(crate) type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

fn size_of(width: u32, height: u32) -> ImageSize {
    ImageSize {
        width: width as usize,
        height: height as usize,
    }
}

pub(crate) fn rgb_to_kornia(img: &RgbImage) -> Result<CpuImage<u8, 3>, InternalComputationError> {
    let (width, height) = img.dimensions();
    Ok(CpuImage::<u8, 3>::new(
        size_of(width, height),
        img.as_raw().clone(),
        CpuAllocator,
    )?)
}

pub(crate) fn gray_to_kornia(img: &GrayImage) -> Result<CpuImage<u8, 1>, InternalComputationError> {
    let (width, height) = img.dimensions();
    Ok(CpuImage::<u8, 1>::new(
        size_of(width, height),
        img.as_raw().clone(),
        CpuAllocator,
    )?)
}

pub(crate) fn gray_like(size: ImageSize) -> Result<CpuImage<u8, 1>, InternalComputationError> {
    Ok(CpuImage::<u8, 1>::from_size_val(size, 0u8, CpuAllocator)?)
}

pub(crate) fn gray_from_kornia(img: &CpuImage<u8, 1>) -> Result<GrayImage, InternalComputationError> {
    let size = img.size();
    let (width, height) = (size.width as u32, size.height as u32);
    let data = img.as_slice().to_vec();
    let len = data.len();
    GrayImage::from_raw(width, height, data).ok_or(InternalComputationError::BufferShape {
        width,
        height,
        len,
    })
}
