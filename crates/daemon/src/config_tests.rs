// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = r#"
debug = true

[paths]
spool_dir = 'w:\spool'
pdf_dir = 'h:\ibest'
ghost_pcl = 'h:\ghostpcl\gpcl6win32.exe'

[printing]
print_via_pdf_pattern = "umgeleitet"
scaled_width = 210

[devices.lpt1]
pos = 1
device = "LPT1"
file = "lpt-1.txt"
name = "Rechnungen"
timeout = "500ms"
target = "PDF"
print_via_pdf = true

[devices.lpt2]
pos = 2
device = "LPT2"
file = "lpt-2.txt"
name = "Listen"

[devices.lpt2.job_configs]
laser = "duplex"

[printers.laser]
name = "Laser"
default_job = "duplex"

[printers.laser.jobs.duplex]
pos = 1
name = "duplex"
description = "Beidseitig"
paper_tray_pjl_code = "TRAY2"
color = false
"#;

#[test]
fn parses_a_full_config() {
    let config: Config = toml::from_str(SAMPLE).unwrap();
    assert!(config.debug);
    assert_eq!(config.paths.spool_dir, PathBuf::from(r"w:\spool"));
    // Unset paths keep their defaults.
    assert_eq!(config.paths.ghost_script, PathBuf::from("gswin32c.exe"));
    assert_eq!(config.printing.scaled_width, 210);
    assert_eq!(config.printing.scaled_height, 297);

    let lpt1 = &config.devices["lpt1"];
    assert_eq!(lpt1.device, "LPT1");
    assert_eq!(lpt1.target, "PDF");
    assert!(lpt1.print_via_pdf);
    assert_eq!(config.device_timeout(lpt1).unwrap(), Duration::from_millis(500));

    let lpt2 = &config.devices["lpt2"];
    assert_eq!(lpt2.job_configs["laser"], "duplex");
    assert_eq!(config.device_timeout(lpt2).unwrap(), Duration::from_secs(1));

    let printer = &config.printers["laser"];
    assert_eq!(printer.default_job, "duplex");
    assert_eq!(printer.jobs["duplex"].paper_tray_pjl_code, "TRAY2");
}

#[test]
fn empty_config_is_all_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert!(!config.debug);
    assert!(config.devices.is_empty());
    assert_eq!(config.printing.print_via_pdf_pattern, "umgeleitet");
    assert_eq!(config.paths.spool_dir, PathBuf::from(r"w:\"));
}

#[test]
fn devices_are_ordered_by_pos() {
    let config: Config = toml::from_str(SAMPLE).unwrap();
    let order: Vec<&str> = config
        .devices_in_order()
        .iter()
        .map(|d| d.device.as_str())
        .collect();
    assert_eq!(order, vec!["LPT1", "LPT2"]);
}

#[test]
fn handler_config_compiles_the_pattern() {
    let config: Config = toml::from_str(SAMPLE).unwrap();
    let handler = config.handler_config().unwrap();
    assert!(handler.print_via_pdf_pattern.unwrap().is_match("Laser (umgeleitet)"));
    assert!(handler.scale_lists);

    let mut config = config;
    config.printing.print_via_pdf_pattern.clear();
    assert!(config.handler_config().unwrap().print_via_pdf_pattern.is_none());

    config.printing.print_via_pdf_pattern = "[".to_string();
    assert!(matches!(
        config.handler_config(),
        Err(ConfigError::Pattern(_))
    ));
}

#[test]
fn load_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn load_reads_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spoolmon.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    let config = Config::load(&path).unwrap();
    assert_eq!(config.devices.len(), 2);
}

#[test]
fn duration_parsing() {
    assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
    assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("abc").is_err());
    assert!(parse_duration("5x").is_err());
}

#[test]
fn bad_timeout_is_reported_with_the_device() {
    let mut config: Config = toml::from_str(SAMPLE).unwrap();
    config.devices.get_mut("lpt1").unwrap().timeout = "soon".to_string();
    let lpt1 = &config.devices["lpt1"];
    assert!(matches!(
        config.device_timeout(lpt1),
        Err(ConfigError::Timeout { .. })
    ));
}
