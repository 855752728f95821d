//! Top-down mass-spectrometry spectrum deconvolution.
//!
//! Given a centroided spectrum (retention time, MS level, `(mz, intensity)` peaks), [`Engine`]
//! identifies candidate **peak groups** — sets of peaks that together witness one neutral
//! (monoisotopic) proteoform mass carried across a range of charge states and isotopologues. The
//! kernel transforms peaks into a log-m/z bin representation, votes mass bins into existence via a
//! bank of additive charge filters, rejects harmonic artifacts (peaks that mimic a half- or
//! third-charge pattern of a real mass), reconstructs isotope envelopes, scores them against a
//! precomputed averagine isotope-distribution table, and stitches consecutive MS1 scans together
//! via a scan-linker.
//!
//! Raw-file parsing, cross-scan feature tracing, and result serialisation are deliberately out of
//! scope — this crate is the per-spectrum numerical core, not a CLI or file-format library.
//!
//! ```
//! use flashdeconv::{Engine, Parameters, ScanLinker, Spectrum, Peak};
//! use flashdeconv::system::f64::{mz, s};
//!
//! let engine = Engine::new(Parameters::default()).unwrap();
//! let mut linker = ScanLinker::new(engine.parameters().overlapped_ms1_count);
//! let spectrum = Spectrum {
//!     retention_time: s(12.3),
//!     ms_level: 1,
//!     peaks: vec![Peak { mz: mz(500.0), intensity: 1e4 }],
//! };
//! let groups = engine.deconvolute(&spectrum, &mut linker);
//! assert!(groups.is_empty());
//! ```

mod averagine;
mod bins;
mod bitset;
mod engine;
mod error;
mod filters;
mod log_mz;
mod mass_bins;
mod mz_bins;
mod params;
mod peak_group;
mod scan_linker;
mod scoring;
mod spectrum;
pub mod system;
mod tolerance;

pub use engine::Engine;
pub use error::ConfigError;
pub use params::Parameters;
pub use scan_linker::ScanLinker;
pub use spectrum::{DeconvolutionStats, Peak, PeakGroup, ScoredPeak, Spectrum};
pub use tolerance::Tolerance;
