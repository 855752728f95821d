use flashdeconv::system::f64::{mz, s};
use flashdeconv::{Engine, Parameters, Peak, ScanLinker, Spectrum};

use iai_callgrind::{library_benchmark, library_benchmark_group, main};

const DELTA_ISO: f64 = 1.00235;
const PROTON_MASS: f64 = 1.007_276_466_8;

fn synthetic_envelope(mass: f64, charge: i32, n: usize, base_intensity: f64) -> Vec<Peak> {
    let z = f64::from(charge);
    (0..n)
        .map(|i| {
            let m = (mass + i as f64 * DELTA_ISO) / z + PROTON_MASS;
            let intensity = base_intensity * 0.85f64.powi(i as i32).max(0.05);
            Peak { mz: mz(m), intensity }
        })
        .collect()
}

fn multi_isotope_spectrum() -> Spectrum {
    let mut peaks = Vec::new();
    for (mass, charge) in [(10_000.0, 10), (25_000.0, 22), (45_000.0, 30)] {
        peaks.extend(synthetic_envelope(mass, charge, 10, 1e5));
    }
    peaks.sort_by(|a, b| a.mz.value.total_cmp(&b.mz.value));
    Spectrum {
        retention_time: s(12.0),
        ms_level: 1,
        peaks,
    }
}

#[library_benchmark]
#[bench::multi_isotope(multi_isotope_spectrum())]
pub fn deconvolute(spectrum: Spectrum) {
    let engine = Engine::new(Parameters::default()).unwrap();
    let mut linker = ScanLinker::new(engine.parameters().overlapped_ms1_count);
    engine.deconvolute(&spectrum, &mut linker);
}

library_benchmark_group!(name = deconvolution; benchmarks = deconvolute);

main!(library_benchmark_groups = deconvolution);
