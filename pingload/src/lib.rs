#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod driver;
pub mod sampler;
pub mod suite;

pub use driver::{run_batch, run_progressive, run_sequential};
pub use sampler::{ProbeOutcome, Sampler};

#[doc(hidden)]
pub use pingload_core as core;

pub mod prelude {
    pub use crate::driver::{run_batch, run_progressive, run_sequential};
    pub use crate::sampler::{ProbeOutcome, Sampler};
    pub use crate::suite::*;

    pub use pingload_core::{
        Batch, HarnessConfig, InstanceDistribution, LatencyStats, LoadLevelResult, Sample,
        SampleError, Summary, TargetConfig,
    };
}
