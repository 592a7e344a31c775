use std::path::PathBuf;
use std::sync::Arc;

use runimagej_core::catalog::{ImageJServerCatalog, SharedOperationCatalog, StaticOperationCatalog};
use runimagej_core::default_app_root_from_manifest_dir;
use runimagej_core::module::RunImageJModule;
use runimagej_core::resolver::{friendly_operation_names, resolve_operation_by_name};
use runimagej_core::settings_layer::{
    env_settings_overlay, load_app_settings, merge_settings_overlays, BridgeSettings,
    BridgeSettingsOverlay,
};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli_args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = cli_args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };
    let rest = cli_args.get(1..).unwrap_or_default();
    if rest.iter().any(|arg| matches!(arg.as_str(), "-h" | "--help")) {
        print_usage();
        return Ok(());
    }

    match command {
        "list-operations" => run_list_operations_cli(rest),
        "describe-controls" => run_describe_controls_cli(rest),
        "module-settings" => run_module_settings_cli(rest),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        unknown => Err(std::io::Error::other(format!(
            "Unknown command: {unknown}\n\nUse --help for usage."
        ))
        .into()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CatalogCliArgs {
    server_url: Option<String>,
    catalog_file: Option<PathBuf>,
    settings_path: Option<String>,
    operation: Option<String>,
}

fn parse_catalog_cli_args(args: &[String]) -> Result<CatalogCliArgs, Box<dyn std::error::Error>> {
    let mut parsed = CatalogCliArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let needs_value = |idx: usize| -> Result<String, Box<dyn std::error::Error>> {
            let Some(value) = args.get(idx + 1) else {
                return Err(std::io::Error::other(format!("Missing value for {flag}")).into());
            };
            Ok(value.clone())
        };

        match flag {
            "--server-url" => {
                parsed.server_url = Some(needs_value(i)?);
                i += 2;
            }
            "--catalog-file" => {
                parsed.catalog_file = Some(PathBuf::from(needs_value(i)?));
                i += 2;
            }
            "--settings" => {
                parsed.settings_path = Some(needs_value(i)?);
                i += 2;
            }
            "--operation" => {
                parsed.operation = Some(needs_value(i)?);
                i += 2;
            }
            unknown => {
                return Err(std::io::Error::other(format!(
                    "Unknown argument: {unknown}\n\nUse --help for usage."
                ))
                .into());
            }
        }
    }
    Ok(parsed)
}

fn resolve_cli_settings(args: &CatalogCliArgs) -> Result<BridgeSettings, Box<dyn std::error::Error>> {
    let app_root = default_app_root_from_manifest_dir();
    let app = load_app_settings(app_root.as_path(), args.settings_path.as_deref())?;
    let env = env_settings_overlay()?;
    let overrides = BridgeSettingsOverlay {
        server_url: args
            .server_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        default_operation: args
            .operation
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    };
    Ok(merge_settings_overlays(&app, &env, &overrides))
}

fn open_catalog(
    args: &CatalogCliArgs,
    settings: &BridgeSettings,
) -> Result<SharedOperationCatalog, Box<dyn std::error::Error>> {
    if let Some(path) = args.catalog_file.as_deref() {
        return Ok(Arc::new(StaticOperationCatalog::load(path)?));
    }
    Ok(Arc::new(ImageJServerCatalog::new(settings.server_url.as_str())?))
}

fn run_list_operations_cli(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_catalog_cli_args(args)?;
    let settings = resolve_cli_settings(&parsed)?;
    let catalog = open_catalog(&parsed, &settings)?;
    let names = friendly_operation_names(catalog.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&names)?);
    Ok(())
}

fn run_describe_controls_cli(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_catalog_cli_args(args)?;
    let settings = resolve_cli_settings(&parsed)?;
    let operation = settings
        .default_operation
        .clone()
        .ok_or_else(|| std::io::Error::other("Missing required --operation"))?;
    let catalog = open_catalog(&parsed, &settings)?;
    let (handle, controls) = resolve_operation_by_name(catalog.as_ref(), operation.as_str())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "operation": handle.id(),
            "controls": controls
        }))?
    );
    Ok(())
}

fn run_module_settings_cli(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_catalog_cli_args(args)?;
    let settings = resolve_cli_settings(&parsed)?;
    let catalog = open_catalog(&parsed, &settings)?;
    let module = RunImageJModule::create(catalog, settings.default_operation.as_deref())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "module": module.module_name(),
            "variable_revision_number": module.variable_revision_number(),
            "selected_operation": module.selected_operation(),
            "settings": module.settings()
        }))?
    );
    Ok(())
}

fn print_usage() {
    eprintln!(
        concat!(
            "Usage:\n",
            "  runimagej-core list-operations [--server-url URL] [--catalog-file PATH] [--settings PATH]\n",
            "  runimagej-core describe-controls --operation NAME [--server-url URL] [--catalog-file PATH] [--settings PATH]\n",
            "  runimagej-core module-settings [--operation NAME] [--server-url URL] [--catalog-file PATH] [--settings PATH]\n\n",
            "Defaults:\n",
            "  server URL: RUNIMAGEJ_SERVER_URL, else config/runimagej.settings.toml ",
            "(fallback: config/runimagej.settings.json), else http://localhost:8080\n",
            "  --operation falls back to RUNIMAGEJ_DEFAULT_OPERATION or the settings file\n",
            "  --catalog-file reads operations from a JSON file instead of the server\n"
        )
    );
}
