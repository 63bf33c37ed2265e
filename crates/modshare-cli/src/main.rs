use clap::{value_parser, Arg, ArgAction, Command};
use modshare_cli::{generate_ids, load_config, publish_manifest, validate_manifest};
use modshare_client::MemoryBackend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn manifest_arg() -> Arg {
    Arg::new("manifest")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Draft manifest (TOML)")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("modshare")
        .version(modshare_cli::VERSION)
        .about("Mod draft validation and share links")
        .subcommand_required(true)
        .subcommand(
            Command::new("id")
                .about("Generate unlisted share tokens")
                .arg(
                    Arg::new("count")
                        .long("count")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Number of tokens"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a draft manifest against the creation form rules")
                .arg(manifest_arg())
                .arg(
                    Arg::new("bedrock")
                        .long("bedrock")
                        .action(ArgAction::SetTrue)
                        .help("Also require Bedrock pack files"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("publish")
                .about("Publish a draft manifest to an in-memory backend")
                .arg(manifest_arg())
                .arg(
                    Arg::new("origin")
                        .long("origin")
                        .help("Origin used for share links"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Client configuration file (TOML)"),
                )
                .arg(json_flag()),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("id", args)) => {
            let count = args.get_one::<usize>("count").copied().unwrap_or(1);
            for id in generate_ids(count) {
                println!("{id}");
            }
        }
        Some(("validate", args)) => {
            let Some(path) = args.get_one::<PathBuf>("manifest") else {
                anyhow::bail!("missing manifest path");
            };
            let report = validate_manifest(path, args.get_flag("bedrock"))?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
            std::process::exit(if report.passed() { 0 } else { 1 });
        }
        Some(("publish", args)) => {
            let Some(path) = args.get_one::<PathBuf>("manifest") else {
                anyhow::bail!("missing manifest path");
            };
            let config = load_config(
                args.get_one::<PathBuf>("config").map(PathBuf::as_path),
                args.get_one::<String>("origin").map(String::as_str),
            )?;

            let backend = MemoryBackend::new();
            let report = publish_manifest(path, &backend, &config).await?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Published {} ({} files)", report.mod_id, report.files);
                println!("Share link: {}", report.share_url);
            }
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
