use anyhow::Context;
use clap::Parser;
use extlib::config::{cli::parse_u32, Command, Generator};
use extlib::core::rand::{Rand16, Rand16Fast, Rand32, Random16};
use extlib::utils::error::ErrorSeverity;
use extlib::utils::{logger, validation::Validate};
use extlib::{io, net, plog, print, pwarn, CliConfig, ExtConfig};
use std::fs::File;
use std::path::Path;

fn load_config(path: Option<&str>) -> anyhow::Result<ExtConfig> {
    let config = match path {
        Some(path) => ExtConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => ExtConfig::default(),
    };
    config.validate().context("invalid configuration file")?;
    Ok(config)
}

fn show_record(record: &[u8], hex: bool) -> String {
    if hex {
        record.iter().map(|b| format!("{:02x}", b)).collect()
    } else {
        String::from_utf8_lossy(record).into_owned()
    }
}

async fn run(cli: &CliConfig, config: &ExtConfig) -> extlib::Result<()> {
    match &cli.command {
        Command::Sort {
            path,
            size,
            block_size,
        } => {
            let block_size = block_size.unwrap_or_else(|| config.sort_block_size());
            io::filesort(path, *size, block_size.max(*size), |a, b| a.cmp(b))?;
            plog!("Sorted {} ({}-byte records)", path, size);
        }
        Command::Search {
            path, size, hex, ..
        } => {
            let key = cli.search_key()?;
            let mut file = File::open(path)?;
            match io::fbsearch(&mut file, &key, *size)? {
                Some(record) => print::print(&format!("{}\n", show_record(&record, *hex))),
                None => {
                    pwarn!("Key not found in {}", path);
                }
            }
        }
        Command::Get {
            url,
            output,
            timeout,
        } => {
            let timeout = timeout
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| config.http_timeout());
            let saved = net::http_get(url, output.as_deref().map(Path::new), timeout).await?;
            plog!("Saved {} to {}", url, saved.display());
        }
        Command::Cores { json: true } => {
            let json = serde_json::to_string_pretty(io::cpu::CpuInfo::get())?;
            print::print(&format!("{}\n", json));
        }
        Command::Cores { json: false } => {
            let physical = io::cpu_physical_cores()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            print::print(&format!(
                "logical cores: {}\nphysical cores: {}\nhyper-threading: {}\nvendor: {}\nbrand: {}\n",
                io::cpu_cores(),
                physical,
                io::cpu_hyper_threads(),
                io::cpu_vendor().unwrap_or_default(),
                io::cpu_brand().unwrap_or_default(),
            ));
        }
        Command::Connect {
            host,
            port,
            timeout,
        } => {
            let timeout = timeout
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| config.socket_timeout());
            let socket = net::connect_addr(host, *port, timeout)?;
            print::print(&format!(
                "connected to {}:{} from {}\n",
                socket.peer_ip()?,
                port,
                socket.local_ip()?
            ));
            socket.close()?;
        }
        Command::Hostip => {
            print::print(&format!("{}\n", net::host_ip()?));
        }
        Command::Rand {
            generator,
            count,
            seed,
        } => {
            let values: Vec<u32> = match generator {
                Generator::Fast => {
                    let mut rng = seed.map(|s| Rand16Fast::new(s as u32)).unwrap_or_default();
                    (0..*count).map(|_| rng.next16()).collect()
                }
                Generator::Kiss => {
                    let mut rng = seed
                        .map(|s| Rand16::new(s as u32, (s >> 32) as u32, 0))
                        .unwrap_or_default();
                    (0..*count).map(|_| rng.next16()).collect()
                }
                Generator::Xoshiro => {
                    let mut rng = seed.map(Rand32::from_seed).unwrap_or_default();
                    (0..*count).map(|_| rng.next32()).collect()
                }
            };
            for value in values {
                print::print(&format!("{}\n", value));
            }
        }
        Command::Ntoa { value } => {
            print::print(&format!("{}\n", net::ntoa_u32(parse_u32("value", value)?)));
        }
        Command::Aton { host } => {
            let ip = net::aton(host)?;
            print::print(&format!(
                "{} (0x{:08x})\n",
                ip,
                u32::from_le_bytes(ip.octets())
            ));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting extlib CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };
    config.apply_print(print::global())?;

    let result = run(&cli, &config).await;
    print::close_output();

    if let Err(e) = result {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
