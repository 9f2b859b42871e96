//! deskopt CLI: analyse desk photos, inspect rules and manage profiles.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use deskopt::analysis::{AnalysisController, AnalysisEvent, AnalysisRequest, RunOutcome};
use deskopt::calibration::CalibrationSession;
use deskopt::detection::{Detector, MockDetector, SidecarDetector};
use deskopt::models::{Handedness, Role};
use deskopt::{default_data_dir, init_logging, AppState};

const ENABLE_LOGS: bool = true;

use deskopt::log_info;

#[derive(Parser)]
#[command(name = "deskopt")]
#[command(about = "Score desk layouts from a calibrated photo and suggest better placements")]
#[command(version)]
struct Cli {
    /// Directory holding the database and settings.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one photo described by a request file.
    Analyze(AnalyzeArgs),

    /// Print the placement rules for a role.
    Rules {
        /// coder, artist, gamer or admin.
        role: String,
    },

    /// Manage user profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// List the scans recorded for a profile.
    Scans {
        #[arg(long)]
        profile: i64,
    },
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    /// JSON request with the image path and calibration clicks.
    #[arg(long)]
    request: PathBuf,

    /// Use the built-in sample detections instead of a sidecar file.
    #[arg(long)]
    mock: bool,

    /// Read detections from this file instead of `<image>.detections.json`.
    #[arg(long, conflicts_with = "mock")]
    detections: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ProfileCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Role,
        #[arg(long, default_value = "right")]
        handedness: Handedness,
    },
    List,
}

/// Contents of an `analyze --request` file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestFile {
    image: PathBuf,
    profile_id: Option<i64>,
    role: Option<Role>,
    handedness: Option<Handedness>,
    /// Reference object corners: top-left, top-right, bottom-right, bottom-left.
    reference_points: Vec<[f64; 2]>,
    desk_corners: Vec<[f64; 2]>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let state = AppState::open(&cli.data_dir.clone().unwrap_or_else(default_data_dir))?;

    match cli.command {
        Commands::Analyze(args) => analyze(&state, args).await,
        Commands::Rules { role } => print_rules(&state, &role).await,
        Commands::Profile(ProfileCommand::Create {
            name,
            role,
            handedness,
        }) => {
            let profile = state.db.create_profile(&name, role, handedness).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        Commands::Profile(ProfileCommand::List) => {
            for profile in state.db.list_profiles().await? {
                println!(
                    "{:>4}  {:<24} {:<7} {:<5} {}",
                    profile.id,
                    profile.name,
                    profile.role,
                    profile.handedness,
                    profile.created_at.to_rfc3339()
                );
            }
            Ok(())
        }
        Commands::Scans { profile } => {
            for scan in state.db.list_scans_for_profile(profile).await? {
                println!(
                    "{:>4}  {}  scale={}  {}",
                    scan.id,
                    scan.scanned_at.to_rfc3339(),
                    scan.scale.map(|s| format!("{s:.2}")).unwrap_or_else(|| "-".into()),
                    scan.image_path
                );
            }
            Ok(())
        }
    }
}

async fn print_rules(state: &AppState, role: &str) -> Result<()> {
    let rules = state.db.rules_for_role(role).await?;
    if rules.is_empty() {
        println!("no rules for role '{role}'");
    }
    for rule in rules {
        let bound = |value: Option<f64>| value.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".into());
        println!(
            "P{}  {:<12} {:>3}-{:<3} cm  {:>4}°  {}",
            rule.priority,
            rule.category.display_name(),
            bound(rule.min_distance_cm),
            bound(rule.max_distance_cm),
            rule.ideal_angle_degrees,
            rule.advice_text
        );
    }
    Ok(())
}

async fn analyze(state: &AppState, args: AnalyzeArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.request)
        .with_context(|| format!("failed to read request {}", args.request.display()))?;
    let request: RequestFile = serde_json::from_str(&contents).context("invalid request file")?;
    let settings = state.settings.analysis();

    let (role, handedness) = match request.profile_id {
        Some(profile_id) => {
            let Some(profile) = state.db.get_profile(profile_id).await? else {
                bail!("profile {profile_id} not found");
            };
            (profile.role, profile.handedness)
        }
        None => (
            request.role.unwrap_or(Role::Coder),
            request.handedness.unwrap_or_default(),
        ),
    };

    let mut calibration = CalibrationSession::new(settings.calibration.clone());
    for [x, y] in &request.reference_points {
        calibration.add_calibration_point(*x, *y)?;
    }
    let estimate = calibration.compute_scale()?;
    eprintln!("calibrated at {:.2} px/cm", estimate.scale);
    for [x, y] in &request.desk_corners {
        calibration.add_desk_corner(*x, *y)?;
    }

    let detector: Arc<dyn Detector> = if args.mock {
        Arc::new(MockDetector)
    } else if let Some(path) = args.detections {
        Arc::new(SidecarDetector::from_file(path))
    } else {
        Arc::new(SidecarDetector::new())
    };

    let mut controller = AnalysisController::new(detector, state.db.clone());
    let mut events = controller
        .start(
            AnalysisRequest {
                image_path: request.image,
                profile_id: request.profile_id,
                role,
                handedness,
                calibration,
            },
            settings,
        )
        .await?;

    let mut interrupted = false;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(AnalysisEvent::Progress(update)) => {
                    eprintln!("[{:>3}%] {}", update.percent, update.message);
                }
                Some(_) | None => break,
            },
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                log_info!("interrupt received, cancelling analysis");
                controller.cancel();
                interrupted = true;
            }
        }
    }

    match controller.wait().await? {
        Some(RunOutcome::Completed(report)) => {
            let json = serde_json::to_string_pretty(&report)?;
            match args.out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write report {}", path.display()))?,
                None => println!("{json}"),
            }
            eprintln!(
                "score {:.1} ({}), {} recommendations",
                report.result.score,
                report.result.rating.as_str(),
                report.result.recommendations.len()
            );
            Ok(())
        }
        Some(RunOutcome::Failed(failure)) => Err(failure.into()),
        Some(RunOutcome::Cancelled) | None => {
            eprintln!("analysis cancelled");
            Ok(())
        }
    }
}
