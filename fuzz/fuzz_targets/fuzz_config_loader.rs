#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate must reject bad input with an error, never a panic.
    if let Ok(cfg) = sonar_config::load_toml(data)
        && cfg.validate().is_ok()
    {
        let sampler: sonar_core::SamplerCfg = (&cfg.sampler).into();
        assert!(sampler.samples > 0);
    }
});
