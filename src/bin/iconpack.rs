//! Command-line front end for the icon-pack engine.
//!
//! Runs the resolver against a packages root laid out for
//! `platform::fs::FsDirectory` and prints JSON on stdout, so the same
//! selection and resolution paths the launcher uses can be inspected and
//! scripted off-device. Override edits are persisted immediately.

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use iconpack::platform::fs::FsDirectory;
use iconpack::ripple::{self, PressPoint, RippleStyle};
use iconpack::{
    DirectoryService, Drawable, IconResolver, JsonFileStore, SdkLevel, Settings,
    SettingsOverrides, split_list,
};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "iconpack")]
#[command(about = "Inspect icon packs and resolve themed icons for installed applications")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Directory holding unpacked packages (or set ICONPACK_PACKAGES_ROOT).
    #[arg(long, global = true)]
    packages_root: Option<PathBuf>,
    /// Icon mappings file (or set ICONPACK_OVERRIDES).
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,
    /// Host API level used to pick the query call shape (or set ICONPACK_SDK_LEVEL).
    #[arg(long, global = true, value_parser = parse_sdk)]
    sdk: Option<SdkLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed icon packs in discovery order.
    Packs,
    /// List the distinct drawable names an icon pack maps to.
    Drawables {
        pack: String,
    },
    /// Resolve icons for applications (all installed packages when none given).
    Resolve {
        /// Icon pack to select (or set ICONPACK_SELECTED_PACK).
        #[arg(long)]
        pack: Option<String>,
        /// Application package names; commas are accepted as separators.
        apps: Vec<String>,
    },
    /// Edit or list per-application icon overrides.
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Print the press ripple instruction for one frame.
    Ripple {
        #[arg(long)]
        elapsed_ms: u64,
        #[arg(long, default_value_t = 0.0)]
        x: f32,
        #[arg(long, default_value_t = 0.0)]
        y: f32,
    },
}

#[derive(Subcommand, Debug)]
enum OverrideAction {
    /// Pin APP to DRAWABLE from icon pack PACK.
    Add {
        pack: String,
        app: String,
        drawable: String,
    },
    /// Drop the override for APP.
    Remove { app: String },
    /// Print every override.
    List,
}

#[derive(Serialize)]
struct PackEntry<'a> {
    package: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct Resolution<'a> {
    app: &'a str,
    drawable: Option<Drawable>,
}

fn parse_sdk(value: &str) -> Result<SdkLevel> {
    SdkLevel::try_from(value)
}

struct Session {
    settings: Settings,
    directory: Rc<FsDirectory>,
    store: JsonFileStore,
    resolver: IconResolver,
}

impl Session {
    fn open(global: GlobalArgs, selected_pack: Option<String>) -> Result<Self> {
        let settings = Settings::resolve(SettingsOverrides {
            packages_root: global.packages_root,
            overrides_path: global.overrides,
            sdk_level: global.sdk,
            selected_pack,
        })?;
        let directory = Rc::new(FsDirectory::new(&settings.packages_root, settings.sdk_level));
        let store = JsonFileStore::new(&settings.overrides_path);
        Ok(Self {
            settings,
            directory,
            store,
            resolver: IconResolver::new(),
        })
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ripple { elapsed_ms, x, y } => {
            let instruction = ripple::frame(
                &RippleStyle::default(),
                Duration::from_millis(elapsed_ms),
                PressPoint { x, y },
            );
            println!("{}", serde_json::to_string(&instruction)?);
        }
        Command::Packs => {
            let mut session = Session::open(cli.global, None)?;
            session.resolver.update_packs(&*session.directory);
            let entries: Vec<PackEntry<'_>> = session
                .resolver
                .catalog()
                .iter()
                .map(|pack| PackEntry {
                    package: &pack.package_name,
                    name: &pack.name,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Drawables { pack } => {
            let mut session = Session::open(cli.global, None)?;
            session.resolver.update_packs(&*session.directory);
            let Some(names) = session.resolver.drawable_names(&pack) else {
                bail!("icon pack '{pack}' is not installed");
            };
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        Command::Resolve { pack, apps } => {
            let mut session = Session::open(cli.global, pack)?;
            session.resolver.restore_mappings_if_empty(&session.store)?;
            let wanted = session.settings.selected_pack.as_deref();
            let directory: Rc<dyn DirectoryService> = session.directory.clone();
            session.resolver.select(Some(directory), wanted);
            if let Some(wanted) = wanted {
                if session.resolver.selected_pack_name().is_none() {
                    warn!("icon pack '{wanted}' is not installed; resolving overrides only");
                }
            }
            let apps: Vec<String> = if apps.is_empty() {
                session.directory.installed_packages()
            } else {
                apps.iter().flat_map(|app| split_list(app)).collect()
            };
            for app in &apps {
                let resolution = Resolution {
                    app,
                    drawable: session.resolver.icon(app),
                };
                println!("{}", serde_json::to_string(&resolution)?);
            }
        }
        Command::Override { action } => {
            let mut session = Session::open(cli.global, None)?;
            session.resolver.restore_mappings_if_empty(&session.store)?;
            match action {
                OverrideAction::Add {
                    pack,
                    app,
                    drawable,
                } => {
                    session.resolver.add_mapping(&pack, &app, Some(&drawable));
                    session.resolver.store_mappings(&session.store)?;
                }
                OverrideAction::Remove { app } => {
                    if !session.resolver.has_mapping(&app) {
                        warn!("no override for '{app}'");
                    }
                    session.resolver.remove_mapping(&app);
                    session.resolver.store_mappings(&session.store)?;
                }
                OverrideAction::List => {
                    println!("{}", serde_json::to_string_pretty(session.resolver.overrides())?);
                }
            }
        }
    }

    Ok(())
}
