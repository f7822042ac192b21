// This file is part of the product TermLock.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.


use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use termlock::app_state::AppState;
use termlock::bootstrap::{self, BootstrapResult};
use termlock::catalog::Catalog;
use termlock::config::ValidatedConfig;
use termlock::iam::{FileUserDirectory, UserDirectory, ViewerMiddlewareFactory, ViewerResolver};
use termlock::runtime_paths::RuntimePaths;
use termlock::{ADMIN_PATH, admin, public};

const HELP_TEXT: &str = "Usage: termlock [-C <root>]\n\n\
  -C <root>   runtime directory holding config.yaml, catalog.yaml and users.yaml (default: .)\n\
  -h, --help  show this help\n";

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    Serve,
    Help,
}

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.mode == RunMode::Help {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;

    init_logging(&validated_config)?;
    log_startup_info(&validated_config, &runtime_paths);

    let catalog = Catalog::load(&runtime_paths.catalog_file).map_err(|error| {
        eprintln!("❌ Failed to load catalog: {}", error);
        std::io::Error::other(error.to_string())
    })?;
    info!(
        "✅ Catalog loaded: {} terms, {} items",
        catalog.term_ids().len(),
        catalog.items().len()
    );

    let users: Arc<dyn UserDirectory> = Arc::new(
        FileUserDirectory::load(runtime_paths.users_file.clone()).map_err(|error| {
            eprintln!("❌ Failed to load user directory: {}", error);
            std::io::Error::other(error.to_string())
        })?,
    );

    let viewer_resolver = Arc::new(ViewerResolver::from_config(users.clone(), &validated_config));

    let app_state = Arc::new(
        AppState::new(&validated_config, runtime_paths, catalog, users).map_err(|error| {
            eprintln!("❌ Failed to open restriction store: {}", error);
            std::io::Error::other(error.to_string())
        })?,
    );
    info!(
        "✅ Restriction store ready with {} term records",
        app_state.store.records().len()
    );

    let workers = validated_config.server.workers;
    let bind_address = (validated_config.server.host.clone(), validated_config.server.port);

    HttpServer::new(move || {
        let bypass = app_state.bypass.clone();
        App::new()
            .app_data(web::Data::from(validated_config.clone()))
            .app_data(web::Data::from(app_state.clone()))
            .app_data(web::Data::from(viewer_resolver.clone()))
            .wrap(ViewerMiddlewareFactory)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .configure(move |cfg| admin::configure(cfg, ADMIN_PATH, bypass))
            .configure(public::configure)
            .default_service(web::route().to(public::handlers::not_found))
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await
}

fn init_logging(config: &ValidatedConfig) -> std::io::Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .map_err(|error| {
            eprintln!("❌ Failed to initialize logger: {}", error);
            std::io::Error::other(error.to_string())
        })
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {}", config.app.name);
    info!("Runtime root: {}", runtime_paths.root.display());
    info!(
        "Listening on {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );
    let taxonomies: Vec<&str> = config
        .restrictions
        .taxonomies()
        .iter()
        .map(|taxonomy| taxonomy.slug.as_str())
        .collect();
    info!(
        "Managed taxonomies: {}; content types: {}",
        taxonomies.join(", "),
        config.restrictions.content_types().join(", ")
    );
    info!(
        "Bypass roles: {}; identity header: {}",
        config.restrictions.bypass_roles().join(", "),
        config.identity.user_header
    );
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if is_help_flag(&arg) {
            return Ok(ParsedArgs {
                runtime_root,
                mode: RunMode::Help,
            });
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unexpected argument '{}'", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        mode: RunMode::Serve,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
