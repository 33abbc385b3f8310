use deploy_artifacts::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../deploy-artifacts.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.deploy.program, "sf");
    assert!(cfg.deploy.args.iter().any(|a| a == "{alias}"));
    assert!(!cfg.paths.out_dir.is_empty());
}

#[test]
fn missing_sections_use_defaults() {
    let cfg: Config = toml::from_str("[paths]\nout_dir = \"build/out\"\n").expect("parse TOML");
    assert_eq!(cfg.paths.out_dir, "build/out");
    assert_eq!(cfg.deploy.program, "sf");
    assert_eq!(cfg.logging.level, "info");
    assert!(cfg.global.print_summary);
}
