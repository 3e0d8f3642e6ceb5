pub mod fir;
pub mod lowpass;

pub use fir::FirFilter;
pub use lowpass::design_lowpass;
