mod sweep;

pub use sweep::SweepScheduler;
