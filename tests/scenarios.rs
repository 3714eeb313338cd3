//! End-to-end scenarios (spec §8), each with literal inputs and an expected
//! property, run against the public API rather than internals.

use approx::assert_abs_diff_eq;
use std::sync::Arc;
use std::thread;
use vectorwave::{
    Boundary, FilterCache, NoiseEstimator, RingBuffer, StreamingDenoiser, StreamingTransform,
    ThresholdMethod, ThresholdRule, WaveletCatalog, decompose, reconstruct, reconstruct_band,
};

#[test]
fn shift_invariance_on_haar() {
    let wavelet = WaveletCatalog::global().get::<f64>("haar").unwrap();
    let cache = FilterCache::new();
    let x = vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let n = x.len();
    let shift = 3usize;
    let shifted: Vec<f64> = (0..n).map(|i| x[(i + n - shift) % n]).collect();

    let d_x = decompose(&x, &wavelet, 1, Boundary::Periodic, &cache).unwrap();
    let d_shifted = decompose(&shifted, &wavelet, 1, Boundary::Periodic, &cache).unwrap();

    for i in 0..n {
        let expected = d_x.smooth[(i + n - shift) % n];
        assert_abs_diff_eq!(d_shifted.smooth[i], expected, epsilon = 1e-12);
        let expected_detail = d_x.details[0][(i + n - shift) % n];
        assert_abs_diff_eq!(d_shifted.details[0][i], expected_detail, epsilon = 1e-12);
    }
}

#[test]
fn perfect_reconstruction_on_arbitrary_length() {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let cache = FilterCache::new();
    let x: Vec<f64> = (0..777)
        .map(|i| {
            let t = i as f64;
            (2.0 * std::f64::consts::PI * t / 50.0).sin() + 0.3 * (2.0 * std::f64::consts::PI * t / 11.0).sin()
        })
        .collect();

    let decomposition = decompose(&x, &wavelet, 1, Boundary::Periodic, &cache).unwrap();
    let recon = reconstruct(&decomposition, &wavelet, Boundary::Periodic, &cache).unwrap();

    let max_diff = x.iter().zip(recon.iter()).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
    assert!(max_diff < 1e-10, "max diff {max_diff} too large");
}

#[test]
fn multi_level_bandpass_keeps_level_2_energy() {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let cache = FilterCache::new();
    let x: Vec<f64> = (0..777)
        .map(|i| {
            let t = i as f64;
            (2.0 * std::f64::consts::PI * t / 50.0).sin() + 0.3 * (2.0 * std::f64::consts::PI * t / 11.0).sin()
        })
        .collect();

    let decomposition = decompose(&x, &wavelet, 4, Boundary::Periodic, &cache).unwrap();
    let bandpass = reconstruct_band(&decomposition, &wavelet, Boundary::Periodic, &cache, &[2], false).unwrap();

    let level2_energy: f64 = decomposition.details[1].iter().map(|v| v * v).sum();
    let bandpass_energy: f64 = bandpass.iter().map(|v| v * v).sum();
    let ratio = (bandpass_energy - level2_energy).abs() / level2_energy;
    assert!(ratio < 0.05, "bandpass energy drifted {ratio} from level-2 detail energy");
}

#[test]
fn ring_buffer_spsc_preserves_ordering_under_overlap() {
    let ring: Arc<RingBuffer<i64>> = Arc::new(RingBuffer::with_capacity(1024).unwrap());
    let total = 100_000i64;
    let burst = 37usize;

    let producer_ring = ring.clone();
    let producer = thread::spawn(move || {
        let mut sent = 0i64;
        while sent < total {
            let remaining = (total - sent) as usize;
            let n = burst.min(remaining);
            let chunk: Vec<i64> = (sent..sent + n as i64).collect();
            let mut offset = 0;
            while offset < chunk.len() {
                let written = producer_ring.write(&chunk[offset..]);
                offset += written;
                if written == 0 {
                    thread::yield_now();
                }
            }
            sent += n as i64;
        }
    });

    let block = 200usize;
    let hop = 150usize;
    let mut last_seen = -1i64;
    let mut consumed = 0i64;
    while consumed < total {
        if ring.len() >= block || (producer.is_finished() && ring.len() > 0) {
            let take = block.min(ring.len());
            if take == 0 {
                break;
            }
            let view = ring.window_direct(take).unwrap();
            for &tag in view.iter() {
                assert!(tag > last_seen, "tag {tag} out of order after {last_seen}");
                last_seen = tag;
            }
            let advance = hop.min(take);
            ring.advance_window(advance).unwrap();
            consumed += advance as i64;
        } else {
            thread::yield_now();
        }
    }
    producer.join().unwrap();
    ring.cleanup_thread();
    assert!(ring.window_direct(1).is_ok() || ring.is_empty());
}

#[test]
fn streaming_denoiser_converges_on_pure_gaussian_like_noise() {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let denoiser = StreamingDenoiser::new(
        wavelet,
        2,
        Boundary::Periodic,
        333,
        0.5,
        4,
        1000,
        NoiseEstimator::Mad,
        ThresholdMethod::Universal,
        ThresholdRule::Soft,
    )
    .unwrap();

    let sigma = 0.5_f64;
    // Deterministic pseudo-Gaussian noise (Box-Muller over a hash-like LCG),
    // avoids pulling in a RNG dependency purely for test data.
    let mut state: u64 = 0x2545F4914F6CDD1D;
    let mut next_uniform = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let samples: Vec<f64> = (0..100_000)
        .map(|_| {
            let u1 = next_uniform().max(1e-12);
            let u2 = next_uniform();
            sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
        })
        .collect();

    let mut outputs = Vec::new();
    let chunk = 333;
    for window in samples.chunks(chunk) {
        denoiser.push(window).unwrap();
        while let Some(out) = denoiser.try_process_block().unwrap() {
            outputs.extend(out);
        }
    }
    if let Some(tail) = denoiser.close().unwrap() {
        outputs.extend(tail);
    }

    let sigma_hat = denoiser.current_sigma();
    let rel_err = (sigma_hat - sigma).abs() / sigma;
    assert!(rel_err < 0.2, "sigma_hat {sigma_hat} too far from {sigma} (rel err {rel_err})");

    let mean_abs_output: f64 = outputs.iter().map(|x| x.abs()).sum::<f64>() / outputs.len() as f64;
    assert!(mean_abs_output < 0.5 * sigma, "denoised mean |output| {mean_abs_output} not suppressed below sigma");
}

#[test]
fn close_idempotency_and_flush_correctness() {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let transform = Arc::new(StreamingTransform::new(wavelet, 1, Boundary::Periodic, 333, 0.0, 4).unwrap());
    let samples: Vec<f64> = (0..500).map(|i| i as f64 * 0.01).collect();
    transform.push(&samples).unwrap();
    assert!(transform.try_process_block().unwrap().is_some());

    let t1 = transform.clone();
    let t2 = transform.clone();
    let h1 = thread::spawn(move || t1.close());
    let h2 = thread::spawn(move || t2.close());
    let r1 = h1.join().unwrap().unwrap();
    let r2 = h2.join().unwrap().unwrap();

    let results: Vec<_> = [r1, r2].into_iter().flatten().collect();
    assert_eq!(results.len(), 1, "exactly one of the two concurrent close() calls must run flush");
    assert_eq!(results[0].smooth.len(), 333);
    assert!(transform.is_closed());
}
