use super::*;

#[test]
fn parses_scan_with_defaults() {
    let cli = Cli::try_parse_from(["clipstat", "scan", "https://www.tiktok.com/@maker"])
        .expect("expected valid cli args");

    let Commands::Scan {
        source,
        deep,
        deep_limit,
        format,
        top,
    } = cli.command
    else {
        panic!("expected scan command");
    };
    assert_eq!(source.url, "https://www.tiktok.com/@maker");
    assert!(source.html.is_none());
    assert!(!deep);
    assert_eq!(deep_limit, None);
    assert_eq!(format, OutputFormat::Table);
    assert_eq!(top, 10);
}

#[test]
fn parses_deep_csv_scan_from_saved_html() {
    let cli = Cli::try_parse_from([
        "clipstat",
        "scan",
        "https://www.tiktok.com/@maker",
        "--html",
        "page.html",
        "--deep",
        "--deep-limit",
        "5",
        "--format",
        "csv",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Scan {
            deep: true,
            deep_limit: Some(5),
            format: OutputFormat::Csv,
            ..
        }
    ));
}

#[test]
fn parses_compare_paths() {
    let cli = Cli::try_parse_from(["clipstat", "compare", "old.json", "new.json", "--json"])
        .expect("expected valid cli args");

    let Commands::Compare { a, b, json } = cli.command else {
        panic!("expected compare command");
    };
    assert_eq!(a, PathBuf::from("old.json"));
    assert_eq!(b, PathBuf::from("new.json"));
    assert!(json);
}

#[test]
fn parses_license_subcommands() {
    let cli = Cli::try_parse_from(["clipstat", "license", "set", "tok_123"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::License {
            command: LicenseCommands::Set { ref token }
        } if token == "tok_123"
    ));

    let cli = Cli::try_parse_from(["clipstat", "license", "status", "--refresh"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::License {
            command: LicenseCommands::Status { refresh: true }
        }
    ));
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["clipstat"]).is_err());
}

#[test]
fn unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["clipstat", "scan", "u", "--format", "xml"]).is_err());
}
