extern crate simple_ocl;

use simple_ocl::{Arg, Error, NdRange, Session};

const SQUARE: &str = r#"
__kernel void square(__global float *input, __global float *output, const unsigned int count) {
    int i = get_global_id(0);
    if (i < count)
        output[i] = input[i] * input[i];
}
"#;

const PARITY: &str = r#"
__kernel void parity(__global int *values, __global uchar *even, const int count) {
    int i = get_global_id(0);
    if (i < count) {
        even[i] = values[i] % 2 == 0;
        values[i] *= 2;
    }
}
"#;

/// Open a session on any available device, or `None` if this machine has no
/// usable OpenCL runtime.
fn session() -> Option<Session> {
    for init in &[Session::init_gpu, Session::init_cpu] {
        match init() {
            Ok(session) => return Some(session),
            Err(Error::LibraryUnavailable(e)) => {
                eprintln!("OpenCL not available, skipping: {}", e);
                return None;
            }
            Err(e @ Error::NoDevice { .. }) | Err(e @ Error::ApiError(_)) => {
                eprintln!("{}", e);
            }
            Err(e) => panic!("unexpected error initializing OpenCL: {:?}", e),
        }
    }

    eprintln!("No usable OpenCL device, skipping");
    None
}

#[test]
fn square_floats() {
    let mut session = match session() {
        Some(s) => s,
        None => return,
    };

    let count = 1000;
    let mut data: Vec<f32> = (0..count).map(|i| i as f32 / 10.0).collect();
    let mut results = vec![0.0f32; count];

    let mut kernel = session
        .setup_kernel(
            SQUARE,
            "square",
            vec![
                Arg::FloatArr(&mut data),
                Arg::FloatArr(&mut results),
                Arg::IntConst(count as i32),
            ],
        )
        .unwrap();
    assert_eq!(kernel.num_args(), 3);
    assert_eq!(kernel.kernel().function_name().unwrap(), "square");

    session
        .run_kernel(&mut kernel, &NdRange::new(vec![1024]))
        .unwrap();
    kernel.release().unwrap();

    for (d, r) in data.iter().zip(&results) {
        assert_eq!(*r, d * d);
    }

    let timings = session.timings();
    assert_eq!(timings.kernel.count(), 1);
    assert_eq!(timings.host_to_device.count(), 2);
    assert_eq!(timings.device_to_host.count(), 2);

    session.free_device().unwrap();
}

#[test]
fn ints_and_bools() {
    let mut session = match session() {
        Some(s) => s,
        None => return,
    };

    let mut values = vec![1, 2, 3, 4, 5];
    let mut even = vec![true, false, true, false, true];

    let mut kernel = session
        .setup_kernel(
            PARITY,
            "parity",
            vec![
                Arg::IntArr(&mut values),
                Arg::BoolArr(&mut even),
                Arg::IntConst(5),
            ],
        )
        .unwrap();
    session
        .run_kernel(&mut kernel, &NdRange::from(5))
        .unwrap();
    drop(kernel);

    assert_eq!(values, [2, 4, 6, 8, 10]);
    assert_eq!(even, [false, true, false, true, false]);

    session.free_device().unwrap();
}

#[test]
fn wrong_argument_count() {
    let mut session = match session() {
        Some(s) => s,
        None => return,
    };

    let mut data = vec![0.0f32; 4];
    match session.setup_kernel(SQUARE, "square", vec![Arg::FloatArr(&mut data)]) {
        Err(Error::ArgCountMismatch {
            expected: 3,
            actual: 1,
            ..
        }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn build_failure_reports_log() {
    let mut session = match session() {
        Some(s) => s,
        None => return,
    };

    let result = session.setup_kernel(
        "__kernel void broken( { }",
        "broken",
        Vec::<Arg>::new(),
    );
    match result {
        Err(Error::BuildFailed { .. }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn unknown_kernel_name() {
    let session = match session() {
        Some(s) => s,
        None => return,
    };

    match session.create_kernel(SQUARE, "cube") {
        Err(Error::ApiError(e)) => assert_eq!(e.context(), "clCreateKernel"),
        other => panic!("unexpected result {:?}", other),
    }
}
