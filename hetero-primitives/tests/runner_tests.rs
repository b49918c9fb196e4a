//! End-to-end runs of the shipped kernels on whatever OpenCL device the
//! machine has. Every test returns early when no platform is installed.
#![cfg(feature = "opencl")]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hetero_primitives::source::{
    MATRIX_MULTIPLY_ENTRY, MATRIX_MULTIPLY_FILE, VECTOR_ADD_ENTRY, VECTOR_ADD_FILE,
};
use hetero_primitives::{
    verify_exact, verify_within, BufferIntent, Clock, ComputeError, DeviceKind, DeviceRunner,
    Dispatch, HandleKind, KernelSource, WorkPartition, MATMUL_TOLERANCE,
};

fn kernel_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../kernels")
}

fn open_runner() -> Option<DeviceRunner> {
    match DeviceRunner::open(Clock::calibrate(), DeviceKind::Gpu, Some(DeviceKind::Cpu)) {
        Ok(runner) => Some(runner),
        Err(e @ (ComputeError::NoPlatform { .. } | ComputeError::NoDevice { .. })) => {
            eprintln!("skipping: {e}");
            None
        }
        Err(e) => panic!("runner setup failed: {e}"),
    }
}

fn matrices(n: usize, m: usize, k: usize) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut next = || rng.gen_range(0u32..100) as f32 / 10.0;
    let a = (0..n * m).map(|_| next()).collect();
    let b = (0..m * k).map(|_| next()).collect();
    (a, b)
}

fn host_matmul(a: &[f32], b: &[f32], n: usize, m: usize, k: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; n * k];
    for i in 0..n {
        for j in 0..k {
            let mut sum = 0.0f32;
            for l in 0..m {
                sum += a[i * m + l] * b[l * k + j];
            }
            c[i * k + j] = sum;
        }
    }
    c
}

fn run_vector_add(runner: &mut DeviceRunner, n: usize) -> Vec<f32> {
    let a: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let b: Vec<f32> = (0..n).map(|i| 2.0 * i as f32).collect();
    let mut c = vec![0.0f32; n];

    let source = KernelSource::load_from(kernel_dir(), VECTOR_ADD_FILE).unwrap();
    runner.build_program(&source).unwrap();
    let a_id = runner.upload(&a, BufferIntent::ReadOnlyInput).unwrap();
    let b_id = runner.upload(&b, BufferIntent::ReadOnlyInput).unwrap();
    let c_id = runner.upload(&c, BufferIntent::WriteOnlyOutput).unwrap();

    let partition = WorkPartition::linear(n).unwrap();
    let launch = Dispatch::new(VECTOR_ADD_ENTRY, &partition, c_id)
        .arg(a_id)
        .arg(b_id)
        .arg(c_id);
    let kernel_ms = runner.dispatch(&launch).unwrap();
    let read_ms = runner.download(c_id, &mut c).unwrap();
    assert!(kernel_ms >= 0.0 && read_ms >= 0.0);

    let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    let v = verify_exact(&c, &expected);
    assert!(v.passed(), "vector add mismatches: {:?}", v.mismatches);
    c
}

fn run_matmul(runner: &mut DeviceRunner, n: usize, m: usize, k: usize) -> Vec<f32> {
    let (a, b) = matrices(n, m, k);
    let mut c = vec![0.0f32; n * k];

    let source = KernelSource::load_from(kernel_dir(), MATRIX_MULTIPLY_FILE).unwrap();
    runner.build_program(&source).unwrap();
    let a_id = runner.upload(&a, BufferIntent::ReadOnlyInput).unwrap();
    let b_id = runner.upload(&b, BufferIntent::ReadOnlyInput).unwrap();
    let c_id = runner.upload(&c, BufferIntent::WriteOnlyOutput).unwrap();

    let local = 16.min(runner.info().max_work_group_size);
    let local = if local * local > runner.info().max_work_group_size { 1 } else { local };
    let partition = WorkPartition::grid([n, k], [local, local]).unwrap();
    let launch = Dispatch::new(MATRIX_MULTIPLY_ENTRY, &partition, c_id)
        .arg(a_id)
        .arg(b_id)
        .arg(c_id)
        .arg(n as i32)
        .arg(m as i32)
        .arg(k as i32);
    runner.dispatch(&launch).unwrap();
    runner.download(c_id, &mut c).unwrap();

    let expected = host_matmul(&a, &b, n, m, k);
    let v = verify_within(&c, &expected, MATMUL_TOLERANCE);
    assert!(
        v.passed(),
        "matmul {n}x{m}x{k}: {} errors, max diff {}",
        v.errors,
        v.max_abs_diff
    );
    c
}

#[test]
fn test_vector_add_exact() {
    let Some(mut runner) = open_runner() else { return };
    run_vector_add(&mut runner, 1 << 16);
}

#[test]
fn test_matmul_within_tolerance() {
    let Some(mut runner) = open_runner() else { return };
    run_matmul(&mut runner, 128, 128, 128);
}

#[test]
fn test_matmul_padded_extent() {
    let Some(mut runner) = open_runner() else { return };
    // 100 is not a multiple of 16; the padded work-items must not write.
    run_matmul(&mut runner, 100, 60, 100);
}

#[test]
fn test_two_cycles_reproduce_results() {
    let Some(mut first) = open_runner() else { return };
    let c1 = run_matmul(&mut first, 64, 64, 64);
    first.release_all();

    let Some(mut second) = open_runner() else { return };
    let c2 = run_matmul(&mut second, 64, 64, 64);
    second.release_all();

    assert_eq!(c1, c2);
}

#[test]
fn test_release_order_is_reverse_acquisition() {
    let Some(mut runner) = open_runner() else { return };
    run_vector_add(&mut runner, 1024);

    let released = runner.release_all();
    assert_eq!(
        released,
        vec![
            HandleKind::Kernel(VECTOR_ADD_ENTRY.to_string()),
            HandleKind::Buffer(2),
            HandleKind::Buffer(1),
            HandleKind::Buffer(0),
            HandleKind::Program,
            HandleKind::Queue,
            HandleKind::Context,
        ]
    );
}

#[test]
fn test_host_len_must_match_partition() {
    let Some(mut runner) = open_runner() else { return };
    let source = KernelSource::load_from(kernel_dir(), VECTOR_ADD_FILE).unwrap();
    runner.build_program(&source).unwrap();

    let a = vec![1.0f32; 64];
    let c = vec![0.0f32; 64];
    let a_id = runner.upload(&a, BufferIntent::ReadOnlyInput).unwrap();
    let c_id = runner.upload(&c, BufferIntent::WriteOnlyOutput).unwrap();

    let partition = WorkPartition::linear(128).unwrap();
    let launch = Dispatch::new(VECTOR_ADD_ENTRY, &partition, c_id)
        .arg(a_id)
        .arg(a_id)
        .arg(c_id);
    let err = runner.dispatch(&launch).unwrap_err();
    assert!(matches!(
        err,
        ComputeError::ExtentMismatch {
            host: 64,
            partition: 128
        }
    ));
}

#[test]
fn test_build_failure_carries_log() {
    let Some(mut runner) = open_runner() else { return };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.cl");
    std::fs::write(&path, "__kernel void broken(__global float* x) { x[0] = y; }\n").unwrap();

    let source = KernelSource::load(&path).unwrap();
    match runner.build_program(&source) {
        Err(ComputeError::Build { status, log }) => {
            assert_ne!(status, 0);
            assert!(!log.trim().is_empty(), "compiler log should not be empty");
        }
        other => panic!("expected build failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_dispatch_without_program() {
    let Some(mut runner) = open_runner() else { return };
    let c = vec![0.0f32; 8];
    let c_id = runner.upload(&c, BufferIntent::WriteOnlyOutput).unwrap();
    let partition = WorkPartition::linear(8).unwrap();
    let launch = Dispatch::new(VECTOR_ADD_ENTRY, &partition, c_id).arg(c_id);
    assert!(matches!(
        runner.dispatch(&launch),
        Err(ComputeError::NoProgram)
    ));
}
