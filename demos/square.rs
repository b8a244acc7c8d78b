extern crate simple_ocl;

use simple_ocl::util::{read_source, time_str};
use simple_ocl::{Arg, NdRange, Session};
use std::time::Instant;

const DATA_SIZE: usize = 10_240_000;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

pub fn main() -> simple_ocl::Result<()> {
    let source = read_source(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/square.cl"))?;
    let local = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(32);

    println!("work group size: {}", local);

    let start = Instant::now();

    // cheap deterministic values in [0, 1)
    let mut data: Vec<f32> = (0..DATA_SIZE)
        .map(|i| (i % 10_007) as f32 / 10_007.0)
        .collect();
    let mut results = vec![0.0f32; DATA_SIZE];

    let mut session = Session::init_gpu_verbose()?;
    let mut kernel = session.setup_kernel(
        &source,
        "square",
        vec![
            Arg::FloatArr(&mut data),
            Arg::FloatArr(&mut results),
            Arg::IntConst(DATA_SIZE as i32),
        ],
    )?;

    session.run_kernel(&mut kernel, &NdRange::new(vec![DATA_SIZE]).local(vec![local]))?;
    let wall = elapsed_ms(start);

    session.print_kernel_time();
    session.print_transfer_times();
    println!("wall time spent: {}", time_str(wall));

    kernel.release()?;
    session.free_device()?;

    let correct = data
        .iter()
        .zip(&results)
        .filter(|&(d, r)| *r == d * d)
        .count();
    println!(
        "Computed {}/{} {:.0}% correct values",
        correct,
        DATA_SIZE,
        correct as f64 / DATA_SIZE as f64 * 100.0
    );

    let start = Instant::now();
    for (r, d) in results.iter_mut().zip(&data) {
        *r = d * d;
    }
    println!("kernel equivalent on host: {}", time_str(elapsed_ms(start)));

    Ok(())
}
