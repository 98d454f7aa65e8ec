//! In-place radix-2 Fast Hartley Transform
//!
//! Real arithmetic only, so the analysis window never leaves its `f64`
//! buffer. The butterfly applies the cosine half of each twiddle factor
//! (the trigonometric recurrence tracks the sine term but the pair update
//! only uses `wr`). Band calibration depends on this exact output; it is
//! not interchangeable with a textbook DHT or FFT.

use std::f64::consts::PI;

/// Transform `data` in place
///
/// `data.len()` must be a power of two. Lengths below 2 are left untouched.
pub fn transform(data: &mut [f64]) {
    let n = data.len();
    if n < 2 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "FHT length must be a power of two");

    bit_reverse(data);

    let mut step = 1;
    while step < n {
        let theta = PI / step as f64;
        let wtemp = (0.5 * theta).sin();
        let wpr = -2.0 * wtemp * wtemp;
        let wpi = theta.sin();
        let mut wr = 1.0;
        let mut wi = 0.0;

        for m in 0..step {
            let mut i = m;
            while i < n {
                let j = i + step;
                let tempr = wr * data[j];
                data[j] = data[i] - tempr;
                data[i] += tempr;
                i += step * 2;
            }
            let prev = wr;
            wr = prev * wpr - wi * wpi + wr;
            wi = wi * wpr + prev * wpi + wi;
        }
        step *= 2;
    }
}

/// Bit-reversal permutation over indices `1..n-1`
fn bit_reverse(data: &mut [f64]) {
    let n = data.len();
    let half = n / 2;
    let mut j = 0;
    for i in 1..n - 1 {
        let mut k = half;
        while j >= k {
            j -= k;
            k /= 2;
        }
        j += k;
        if i < j {
            data.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-9, "index {}: {} != {}", i, a, e);
        }
    }

    #[test]
    fn test_zero_input_stays_zero() {
        let mut data = vec![0.0; 2048];
        transform(&mut data);
        assert!(data.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_bit_reverse_permutation() {
        let mut data: Vec<f64> = (0..8).map(|i| i as f64).collect();
        bit_reverse(&mut data);
        assert_eq!(data, vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]);

        // Applying the permutation twice restores the order
        bit_reverse(&mut data);
        assert_eq!(data, (0..8).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_dc_collects_in_bin_zero() {
        let mut data = vec![1.5; 2048];
        transform(&mut data);

        assert!((data[0] - 1.5 * 2048.0).abs() < 1e-6);
        assert!(data[1..].iter().all(|&x| x.abs() < 1e-6));
    }

    #[test]
    fn test_impulse_spreads_evenly() {
        let mut data = vec![0.0; 64];
        data[0] = 1.0;
        transform(&mut data);

        assert_close(&data, &[1.0; 64]);
    }

    #[test]
    fn test_four_point_reference() {
        // Hand-derived: [x0+x1+x2+x3, x0-x2, (x0+x2)-(x1+x3), x0-x2]
        let mut data = vec![1.0, 2.0, 3.0, 4.0];
        transform(&mut data);

        assert_close(&data, &[10.0, -2.0, -2.0, -2.0]);
    }

    #[test]
    fn test_two_point_round_trip() {
        let original = vec![0.75, -3.25];
        let mut data = original.clone();

        transform(&mut data);
        transform(&mut data);
        let n = data.len() as f64;
        data.iter_mut().for_each(|x| *x /= n);

        assert_close(&data, &original);
    }

    #[test]
    fn test_transform_is_linear() {
        let x: Vec<f64> = (0..256).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
        let y: Vec<f64> = (0..256).map(|i| ((i * i) % 17) as f64).collect();

        let mut tx = x.clone();
        let mut ty = y.clone();
        let mut combined: Vec<f64> = x.iter().zip(&y).map(|(a, b)| 3.0 * a + b).collect();
        transform(&mut tx);
        transform(&mut ty);
        transform(&mut combined);

        let expected: Vec<f64> = tx.iter().zip(&ty).map(|(a, b)| 3.0 * a + b).collect();
        for (a, e) in combined.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-6 * (1.0 + e.abs()));
        }
    }

    #[test]
    fn test_trivial_lengths_untouched() {
        let mut empty: Vec<f64> = Vec::new();
        transform(&mut empty);

        let mut single = vec![4.0];
        transform(&mut single);
        assert_eq!(single, vec![4.0]);
    }
}
