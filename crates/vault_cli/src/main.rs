use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vault_core::core_api::{BucketHash, Engine, ExportKind, Item, ItemHash, Session};
use vault_core::loadout::{
    DamageType, LockableBucket, LockedArmor2Mod, LockedArmor2ModMap, LockedConstraint, LockedMap,
    ModPickerCategory, PlugDefinition, is_loadout_builder_item,
};
use vault_core::routes::{Flavor, default_account_route, url_for};
use vault_core::spreadsheet::ImportFile;
use vault_render::{
    DtrRating, ExportOptions, NoRatings, RatingLookup, download_csv_files, render_account_line,
    render_locked_json, render_locked_text,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write one inventory spreadsheet as CSV.
    Export {
        #[arg(value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(long, value_name = "weapons|armor|ghost", value_parser = parse_export_kind)]
        kind: ExportKind,
        #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Add community review columns.
        #[arg(long)]
        reviews: bool,
        /// JSON object of item hash to {"overall_score", "rating_count"}.
        #[arg(long, value_name = "FILE", requires = "reviews")]
        ratings: Option<PathBuf>,
    },
    /// Apply tag/notes spreadsheets to a profile.
    Import {
        #[arg(value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(value_name = "CSV", required = true)]
        csv: Vec<PathBuf>,
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Build a locked set for the loadout builder and print it.
    Lock {
        #[arg(value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(long, value_name = "ID")]
        store: String,
        #[arg(long = "lock-equipped")]
        lock_equipped: bool,
        #[arg(long = "lock-item", value_name = "ID")]
        lock_items: Vec<String>,
        #[arg(long = "exclude-item", value_name = "ID")]
        exclude_items: Vec<String>,
        #[arg(long = "perk", value_name = "SLOT:HASH", value_parser = parse_slot_hash)]
        perks: Vec<(BucketHash, ItemHash)>,
        #[arg(long = "mod", value_name = "SLOT:HASH", value_parser = parse_slot_hash)]
        mods: Vec<(BucketHash, ItemHash)>,
        #[arg(long = "burn", value_name = "SLOT:TYPE", value_parser = parse_slot_burn)]
        burns: Vec<(BucketHash, DamageType)>,
        #[arg(long = "armor2-mod", value_name = "CATEGORY:HASH", value_parser = parse_armor2_mod)]
        armor2_mods: Vec<(ModPickerCategory, ItemHash)>,
        #[arg(long)]
        json: bool,
    },
    /// Print the URL for the active account's landing page or a named state.
    Route {
        #[arg(value_name = "PROFILE.json")]
        profile: PathBuf,
        #[arg(long, value_name = "NAME")]
        state: Option<String>,
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Include developer-only routes.
        #[arg(long)]
        dev: bool,
        #[arg(long)]
        json: bool,
    },
    /// List the accounts in a profile; the active one is starred.
    Accounts {
        #[arg(value_name = "PROFILE.json")]
        profile: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export {
            profile,
            kind,
            out_dir,
            reviews,
            ratings,
        } => run_export(&profile, kind, &out_dir, reviews, ratings.as_deref()),
        Command::Import {
            profile,
            csv,
            output,
            json,
        } => run_import(&profile, &csv, &output, json),
        Command::Lock {
            profile,
            store,
            lock_equipped,
            lock_items,
            exclude_items,
            perks,
            mods,
            burns,
            armor2_mods,
            json,
        } => {
            let session = load_session(&profile);
            let request = LockRequest {
                store,
                lock_equipped,
                lock_items,
                exclude_items,
                perks,
                mods,
                burns,
                armor2_mods,
            };
            run_lock(&session, &request, json);
        }
        Command::Route {
            profile,
            state,
            params,
            dev,
            json,
        } => run_route(&profile, state.as_deref(), params, dev, json),
        Command::Accounts { profile } => {
            let session = load_session(&profile);
            let accounts = session.accounts();
            if accounts.accounts().is_empty() {
                println!("No accounts.");
                return;
            }
            for account in accounts.accounts() {
                println!("{}", render_account_line(account, accounts.is_active(account)));
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_session(path: &Path) -> Session {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    Engine::new().open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing profile: {}", path.display());
        eprintln!("  {}", e);
        process::exit(1);
    })
}

fn run_export(
    profile: &Path,
    kind: ExportKind,
    out_dir: &Path,
    reviews: bool,
    ratings_path: Option<&Path>,
) {
    let session = load_session(profile);
    let ratings = ratings_path.map(load_ratings);
    let ratings: &dyn RatingLookup = match &ratings {
        Some(map) => map,
        None => &NoRatings,
    };
    let options = ExportOptions {
        reviews_enabled: reviews,
    };

    let download = download_csv_files(&session, kind, options, ratings).unwrap_or_else(|e| {
        eprintln!("Error exporting {kind}: {e}");
        process::exit(1);
    });

    let out_path = out_dir.join(&download.filename);
    fs::write(&out_path, download.contents.as_bytes()).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
    println!("{}", out_path.display());
}

fn load_ratings(path: &Path) -> BTreeMap<ItemHash, DtrRating> {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let value: JsonValue = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing ratings file {}: {e}", path.display());
        process::exit(1);
    });
    let Some(entries) = value.as_object() else {
        eprintln!("Ratings file must be a JSON object keyed by item hash");
        process::exit(1);
    };

    let mut ratings = BTreeMap::new();
    for (key, entry) in entries {
        let Ok(hash) = key.parse::<ItemHash>() else {
            eprintln!("Ratings file has a non-numeric item hash '{key}'");
            process::exit(1);
        };
        let overall_score = entry
            .get("overall_score")
            .and_then(JsonValue::as_f64)
            .unwrap_or(0.0);
        let rating_count = entry
            .get("rating_count")
            .and_then(JsonValue::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);
        ratings.insert(
            hash,
            DtrRating {
                overall_score,
                rating_count,
            },
        );
    }
    debug!(count = ratings.len(), "loaded ratings");
    ratings
}

fn run_import(profile: &Path, csv_paths: &[PathBuf], output: &Path, json: bool) {
    let mut session = load_session(profile);
    let files: Vec<ImportFile> = csv_paths
        .iter()
        .map(|path| {
            let contents = fs::read(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ImportFile::new(name, contents)
        })
        .collect();

    let count = session.import_tags_notes(&files).unwrap_or_else(|e| {
        eprintln!("Error importing tags and notes: {e}");
        process::exit(1);
    });
    let Some(count) = count else {
        eprintln!("No active account in {}; nothing imported", profile.display());
        return;
    };

    let bytes = session.to_json_bytes().unwrap_or_else(|e| {
        eprintln!("Error serializing profile: {e}");
        process::exit(1);
    });
    fs::write(output, bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", output.display());
        process::exit(1);
    });
    info!(count, output = %output.display(), "wrote updated profile");

    if json {
        let mut out = JsonMap::new();
        out.insert("count".to_string(), JsonValue::from(count));
        out.insert(
            "output".to_string(),
            JsonValue::String(output.display().to_string()),
        );
        print_json(&JsonValue::Object(out));
        return;
    }
    println!("Imported {count} rows into {}", output.display());
}

struct LockRequest {
    store: String,
    lock_equipped: bool,
    lock_items: Vec<String>,
    exclude_items: Vec<String>,
    perks: Vec<(BucketHash, ItemHash)>,
    mods: Vec<(BucketHash, ItemHash)>,
    burns: Vec<(BucketHash, DamageType)>,
    armor2_mods: Vec<(ModPickerCategory, ItemHash)>,
}

fn run_lock(session: &Session, request: &LockRequest, json: bool) {
    let store = session.store(&request.store).unwrap_or_else(|e| {
        eprintln!("Error selecting store: {e}");
        process::exit(1);
    });

    let mut locked = LockedMap::new();
    if request.lock_equipped {
        locked = locked.lock_equipped(store);
    }
    for id in &request.lock_items {
        let item = lockable_item(session, id);
        if !item.can_be_equipped_by(store) {
            eprintln!("Item {id} cannot be equipped by store {}", store.id);
            process::exit(1);
        }
        locked = locked.add_constraint(LockedConstraint::lock_item(item));
    }
    for id in &request.exclude_items {
        locked = locked.add_constraint(LockedConstraint::exclude_item(lockable_item(session, id)));
    }
    for &(bucket, hash) in &request.perks {
        locked = locked.add_constraint(LockedConstraint::Perk {
            bucket,
            perk: plug_definition(session, hash),
        });
    }
    for &(bucket, hash) in &request.mods {
        locked = locked.add_constraint(LockedConstraint::Mod {
            bucket,
            mod_def: plug_definition(session, hash),
        });
    }
    for &(bucket, damage) in &request.burns {
        locked = locked.add_constraint(LockedConstraint::Burn { bucket, damage });
    }

    let mut armor2_mods = LockedArmor2ModMap::new();
    for &(category, hash) in &request.armor2_mods {
        armor2_mods = armor2_mods.add_mod(LockedArmor2Mod {
            mod_def: plug_definition(session, hash),
            category,
        });
    }

    let flat = locked.flatten();
    if json {
        print_json(&render_locked_json(&flat, &armor2_mods));
        return;
    }
    print!("{}", render_locked_text(&flat, &armor2_mods));
}

fn lockable_item<'a>(session: &'a Session, id: &str) -> &'a Item {
    let Some(item) = session.find_item(id) else {
        eprintln!("No item with id {id}");
        process::exit(1);
    };
    if !is_loadout_builder_item(item) {
        eprintln!("Item {id} ({}) is not a lockable armor slot", item.name);
        process::exit(1);
    }
    item
}

/// Name a plug by finding it among the profile's socket options.
fn plug_definition(session: &Session, hash: ItemHash) -> PlugDefinition {
    let name = session
        .items()
        .filter_map(|item| item.sockets.as_ref())
        .flat_map(|sockets| sockets.sockets.iter())
        .flat_map(|socket| socket.plug_options.iter())
        .find(|plug| plug.hash == hash)
        .map(|plug| plug.name.clone())
        .unwrap_or_default();
    PlugDefinition { hash, name }
}

fn run_route(
    profile: &Path,
    state: Option<&str>,
    extra_params: Vec<(String, String)>,
    dev: bool,
    json: bool,
) {
    let session = load_session(profile);
    let flavor = if dev { Flavor::Dev } else { Flavor::Release };

    let Some(mut target) = default_account_route(session.active_account()) else {
        eprintln!("No active account in {}", profile.display());
        process::exit(1);
    };
    if let Some(state) = state {
        target.state = state.to_string();
    }
    target.params.extend(extra_params);

    let Some(url) = url_for(flavor, &target.state, &target.params) else {
        eprintln!(
            "Cannot build a URL for state '{}': unknown state or missing parameter",
            target.state
        );
        process::exit(1);
    };

    if json {
        let mut out = JsonMap::new();
        out.insert("state".to_string(), JsonValue::String(target.state.clone()));
        out.insert("url".to_string(), JsonValue::String(url));
        print_json(&JsonValue::Object(out));
        return;
    }
    println!("{url}");
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn parse_export_kind(value: &str) -> Result<ExportKind, String> {
    value.parse()
}

fn parse_slot(value: &str) -> Result<BucketHash, String> {
    if let Some(bucket) = LockableBucket::from_name(&value.to_ascii_lowercase()) {
        return Ok(bucket.hash());
    }
    value.parse::<BucketHash>().map_err(|_| {
        format!(
            "invalid slot '{value}', expected one of: helmet, gauntlets, chest, leg, classitem, ghost, or a bucket hash"
        )
    })
}

fn split_pair<'a>(value: &'a str, shape: &str) -> Result<(&'a str, &'a str), String> {
    value
        .split_once(':')
        .ok_or_else(|| format!("invalid value '{value}', expected {shape}"))
}

fn parse_hash(value: &str) -> Result<ItemHash, String> {
    value
        .parse()
        .map_err(|_| format!("invalid hash '{value}', expected an unsigned integer"))
}

fn parse_slot_hash(value: &str) -> Result<(BucketHash, ItemHash), String> {
    let (slot, hash) = split_pair(value, "SLOT:HASH")?;
    Ok((parse_slot(slot)?, parse_hash(hash)?))
}

fn parse_slot_burn(value: &str) -> Result<(BucketHash, DamageType), String> {
    let (slot, damage) = split_pair(value, "SLOT:TYPE")?;
    Ok((parse_slot(slot)?, damage.parse()?))
}

fn parse_armor2_mod(value: &str) -> Result<(ModPickerCategory, ItemHash), String> {
    let (category, hash) = split_pair(value, "CATEGORY:HASH")?;
    let category = ModPickerCategory::from_name(&category.to_ascii_lowercase()).ok_or_else(|| {
        format!(
            "invalid mod category '{category}', expected one of: general, helmet, gauntlets, chest, leg, classitem, seasonal"
        )
    })?;
    Ok((category, parse_hash(hash)?))
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter '{value}', expected KEY=VALUE"))?;
    Ok((key.to_string(), val.to_string()))
}
