//! `From` implementations bridging `sonar_config` types to `sonar_core` types.

use crate::config::{Averaging, SamplerCfg};

impl From<sonar_config::Averaging> for Averaging {
    fn from(a: sonar_config::Averaging) -> Self {
        match a {
            sonar_config::Averaging::Fixed => Averaging::FixedCount,
            sonar_config::Averaging::Valid => Averaging::ValidCount,
        }
    }
}

impl From<&sonar_config::Sampler> for SamplerCfg {
    fn from(c: &sonar_config::Sampler) -> Self {
        Self {
            averaging: c.averaging.into(),
            ..SamplerCfg::default()
        }
    }
}
