//! # Convolution Shape Utilities
//!
//! Output-size prediction for convolution layers.

use burn::nn::PaddingConfig2d;

/// Predict the output size of a 1D convolution operation.
///
/// ```text
/// out_size = floor( ((in_size + 2*padding - dilation*(kernel_size-1) - 1) / stride) + 1 )
/// ```
///
/// # Reference
///
/// - [conv_arithmetic diagram](https://github.com/vdumoulin/conv_arithmetic/blob/master/README.md)
///   visual explanations of these convolution parameters.
/// - [pytorch conv1d](https://docs.pytorch.org/docs/stable/generated/torch.nn.Conv1d.html)
///
/// # Arguments
///
/// - `input_size`: The input dimension size, must be > 0.
/// - `kernel_size`: The kernel size, must be > 0.
/// - `stride`: The stride of the convolution, must be > 0.
/// - `padding`: The padding of the convolution, added evenly to both sides of the input.
/// - `dilation`: The dilation of the convolution, must be > 0.
///
/// # Returns
///
/// An `Option<usize>` representing the output size; or `None` for <= 0.
pub fn maybe_conv1d_output_size(
    input_size: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> Option<usize> {
    assert!(input_size > 0);
    assert!(kernel_size > 0);
    assert!(stride > 0);
    assert!(dilation > 0);

    let effective_size = input_size + 2 * padding;
    let pos = effective_size + stride;
    let kernel_width = 1 + dilation * (kernel_size - 1);

    if pos < kernel_width {
        return None;
    }
    let x = (pos - kernel_width) / stride;
    if x < 1 { None } else { Some(x) }
}

/// Predict the output size of a 1D convolution operation.
///
/// This is the ``panic``-ing variant of [`maybe_conv1d_output_size`].
///
/// # Panics
///
/// If the output size would be <= 0.
pub fn expect_conv1d_output_size(
    input_size: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    dilation: usize,
) -> usize {
    match maybe_conv1d_output_size(input_size, kernel_size, stride, padding, dilation) {
        Some(x) => x,
        None => panic!(
            "No legal output size for conv1d with:\n input_size:{input_size}\n kernel_size:{kernel_size}\n stride:{stride}\n dilation:{dilation}\n padding:{padding}",
        ),
    }
}

/// Resolve a [`PaddingConfig2d`] to explicit per-axis padding.
///
/// ``Same`` resolves to the padding which preserves the input resolution
/// at stride 1; ``Valid`` resolves to zero.
///
/// # Arguments
///
/// - `padding`: the padding config.
/// - `kernel_size`: ``[kernel_height, kernel_width]``; each must be odd for ``Same``.
///
/// # Returns
///
/// ``[padding_height, padding_width]``
pub fn resolve_padding_2d(
    padding: &PaddingConfig2d,
    kernel_size: [usize; 2],
) -> [usize; 2] {
    match padding {
        PaddingConfig2d::Same => [(kernel_size[0] - 1) / 2, (kernel_size[1] - 1) / 2],
        PaddingConfig2d::Valid => [0, 0],
        PaddingConfig2d::Explicit(h, w) => [*h, *w],
    }
}

/// Predict the spatial output shape of a [`burn::nn::conv::Conv2d`] layer.
///
/// ``Same`` padding produces ``ceil(in / stride)`` per axis; ``Valid`` and
/// ``Explicit`` padding follow the [`maybe_conv1d_output_size`] formula.
///
/// # Arguments
///
/// - `input_resolution`: ``[in_height, in_width]``.
/// - `kernel_size`: ``[kernel_height, kernel_width]``.
/// - `stride`: ``[height_stride, width_stride]``.
/// - `padding`: the layer's padding config.
/// - `dilation`: ``[height_dilation, width_dilation]``.
///
/// # Returns
///
/// ``[out_height, out_width]``
///
/// # Panics
///
/// If either output size would be <= 0.
pub fn expect_conv2d_output_size(
    input_resolution: [usize; 2],
    kernel_size: [usize; 2],
    stride: [usize; 2],
    padding: &PaddingConfig2d,
    dilation: [usize; 2],
) -> [usize; 2] {
    if matches!(padding, PaddingConfig2d::Same) {
        return [
            input_resolution[0].div_ceil(stride[0]),
            input_resolution[1].div_ceil(stride[1]),
        ];
    }

    let padding = resolve_padding_2d(padding, kernel_size);
    [
        expect_conv1d_output_size(
            input_resolution[0],
            kernel_size[0],
            stride[0],
            padding[0],
            dilation[0],
        ),
        expect_conv1d_output_size(
            input_resolution[1],
            kernel_size[1],
            stride[1],
            padding[1],
            dilation[1],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv1d_output_size() {
        pub fn conv1d_output_size_reference(
            input_size: usize,
            kernel_size: usize,
            stride: usize,
            padding: usize,
            dilation: usize,
        ) -> Option<usize> {
            let input_size = input_size as f64;
            let kernel_size = kernel_size as f64;
            let stride = stride as f64;
            let dilation = dilation as f64;
            let padding = padding as f64;

            let effective_size = input_size + 2.0 * padding;
            let kernel_width = 1.0 + dilation * (kernel_size - 1.0);

            let x = (((effective_size - kernel_width) / stride) + 1.0).floor();
            if x < 1.0 { None } else { Some(x as usize) }
        }

        for input_size in 1..10 {
            for stride in 1..3 {
                for kernel_size in 1..4 {
                    for dilation in 1..3 {
                        for padding in 0..4 {
                            assert_eq!(
                                maybe_conv1d_output_size(
                                    input_size,
                                    kernel_size,
                                    stride,
                                    padding,
                                    dilation,
                                ),
                                conv1d_output_size_reference(
                                    input_size,
                                    kernel_size,
                                    stride,
                                    padding,
                                    dilation,
                                )
                            )
                        }
                    }
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "No legal output size")]
    fn test_expect_conv1d_output_size_panic() {
        expect_conv1d_output_size(1, 5, 1, 0, 1);
    }

    #[test]
    fn test_resolve_padding_2d() {
        assert_eq!(resolve_padding_2d(&PaddingConfig2d::Same, [3, 5]), [1, 2]);
        assert_eq!(resolve_padding_2d(&PaddingConfig2d::Valid, [3, 3]), [0, 0]);
        assert_eq!(
            resolve_padding_2d(&PaddingConfig2d::Explicit(2, 3), [3, 3]),
            [2, 3]
        );
    }

    #[test]
    fn test_expect_conv2d_output_size() {
        // 3x3/stride-1/padding-1 preserves resolution.
        assert_eq!(
            expect_conv2d_output_size(
                [64, 64],
                [3, 3],
                [1, 1],
                &PaddingConfig2d::Explicit(1, 1),
                [1, 1],
            ),
            [64, 64]
        );

        // 5x5/stride-1/no padding shrinks by 4.
        assert_eq!(
            expect_conv2d_output_size([28, 28], [5, 5], [1, 1], &PaddingConfig2d::Valid, [1, 1]),
            [24, 24]
        );

        // Same padding tracks the stride.
        assert_eq!(
            expect_conv2d_output_size([7, 8], [3, 3], [2, 2], &PaddingConfig2d::Same, [1, 1]),
            [4, 4]
        );
    }
}
