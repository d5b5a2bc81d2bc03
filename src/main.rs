use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use plotkit::{
    default_config_path, init_logging, CartesianParams, Config, MachineKind, Pipeline,
    StringPulleyParams, BUILD_DATE, VERSION,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "plotkit", version, about = "Pen plotter toolchain")]
struct Cli {
    /// Config file (TOML or JSON); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the machine kinematics from the config
    #[arg(long, global = true)]
    machine: Option<Machine>,

    /// Mark pen lifts with numbered circles in the preview
    #[arg(long, global = true, default_value_t = false)]
    lift_markers: bool,

    /// Shrink the canvas so drawings stay on the Cartesian bed
    #[arg(long, global = true, default_value_t = false)]
    fit_bed: bool,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Trace a raster image and plot it
    Convert { image: PathBuf },
    /// Plot the paths of an SVG document
    Svg { file: PathBuf },
    /// Render previews of an existing toolpath
    Render { gcode: PathBuf },
    /// Write the default config file
    InitConfig {
        /// Replace an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Machine {
    Cartesian,
    StringPulley,
}

impl Machine {
    /// Apply to `kind`, keeping its parameters when the variant already matches
    fn apply(self, kind: &mut MachineKind) {
        let unchanged = matches!(
            (self, &*kind),
            (Self::Cartesian, MachineKind::Cartesian(_))
                | (Self::StringPulley, MachineKind::StringPulley(_))
        );
        if !unchanged {
            *kind = match self {
                Self::Cartesian => MachineKind::Cartesian(CartesianParams::default()),
                Self::StringPulley => MachineKind::StringPulley(StringPulleyParams::default()),
            };
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    info!("plotkit {} (built {})", VERSION, BUILD_DATE);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if let Command::InitConfig { force } = cli.cmd {
        return cmd_init_config(&config_path, force);
    }

    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("load config '{}'", config_path.display()))?;
    if let Some(machine) = cli.machine {
        machine.apply(&mut config.profile.kind);
    }
    if cli.lift_markers {
        config.profile.lift_markers = true;
    }
    if cli.fit_bed && !config.profile.fit_canvas_to_bed() {
        warn!("--fit-bed ignored for the {} profile", config.profile.kind);
    }
    info!("Machine: {}", config.profile.kind);

    let mut pipeline = Pipeline::new(config);
    match cli.cmd {
        Command::Convert { image } => print_report(&pipeline.run(&image)?, cli.json),
        Command::Svg { file } => print_report(&pipeline.convert_svg(&file)?, cli.json),
        Command::Render { gcode } => print_report(&pipeline.render_only(&gcode)?, cli.json),
        Command::InitConfig { .. } => Ok(()),
    }
}

fn cmd_init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config '{}' already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default()
        .save_to_file(path)
        .with_context(|| format!("write config '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn print_report<T: Serialize + std::fmt::Debug>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{:#?}", report);
    }
    Ok(())
}
