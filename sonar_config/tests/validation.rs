use rstest::rstest;
use sonar_config::{Averaging, load_toml};

#[test]
fn accepts_full_config() {
    let toml = r#"
[pins]
trigger = 23
echo = 24
alert = 25

[sampler]
averaging = "valid"

[logging]
file = "sonar.log"
level = "debug"
rotation = "daily"

[simulation]
distances_cm = [20.0, 5.0, 0.0, 9.0]
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.sampler.averaging, Averaging::Valid);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[rstest]
#[case("[pins]\ntrigger = 5\necho = 5\nalert = 17\n", "pins must be distinct")]
#[case("[pins]\nalert = 18\n", "pins must be distinct")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
#[case("[logging]\nlevel = \"info,[=\"\n", "logging.level")]
#[case("[logging]\nlevel = \"loud\"\n", "logging.level")]
#[case("[simulation]\ndistances_cm = []\n", "must not be empty")]
#[case("[simulation]\ndistances_cm = [5.0, -1.0]\n", "finite and >= 0")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error '{err}' should mention '{needle}'"
    );
}

#[test]
fn rejects_unknown_averaging_mode() {
    let err = load_toml("[sampler]\naveraging = \"median\"\n").expect_err("unknown variant");
    assert!(format!("{err}").contains("median"));
}
