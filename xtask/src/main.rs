//! Build script.
//!
//! Use `cargo xtask` to execute.

use alpha_board::{
    boards::{self, BoardVisitor},
    Board, BoardSupport,
};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use devx_cmd::cmd;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Build Stratify Alpha board support.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cross-compile board support for the board's target.
    Build {
        /// Include the external SPI flash and the /home file system.
        #[arg(short, long)]
        external_flash: bool,

        /// Board to build.
        #[arg(default_value = "stratify_alpha")]
        board: String,
    },
    /// Run the host tests for the board with and without external flash.
    Test {
        /// Board to test.
        #[arg(default_value = "stratify_alpha")]
        board: String,
    },
    /// Print the device and mount tables of a board.
    Tables {
        /// Board to print.
        #[arg(default_value = "stratify_alpha")]
        board: String,
    },
}

fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR")).ancestors().nth(1).unwrap().to_path_buf()
}

fn board_file(board: &str) -> anyhow::Result<PathBuf> {
    let path = project_root().join("alpha-board").join("src").join("boards").join(format!("{board}.rs"));
    if !path.is_file() {
        bail!("board {board} is unknown");
    }
    Ok(path)
}

fn cargo() -> String {
    env::var("CARGO").unwrap_or_else(|_| "cargo".to_string())
}

fn build(board: &str, external_flash: bool) -> anyhow::Result<()> {
    let path = board_file(board)?;
    let settings = alpha_build::read_settings(&path).with_context(|| format!("cannot read {}", path.display()))?;
    let target = alpha_build::required(&settings, "TARGET")?;
    let features = if external_flash { "defmt,external-flash" } else { "defmt" };

    cmd!(cargo(), "build", "--release", "--target", target, "--features", features)
        .current_dir(project_root().join("alpha-board"))
        .env("ALPHA_BOARD", board)
        .run()?;

    println!();
    println!("Built board support for board {board} ({target})");
    Ok(())
}

fn test(board: &str) -> anyhow::Result<()> {
    board_file(board)?;

    for features in [&[][..], &["--features", "external-flash"][..]] {
        cmd!(cargo(), "test")
            .args(features)
            .current_dir(project_root().join("alpha-board"))
            .env("ALPHA_BOARD", board)
            .run()?;
    }

    Ok(())
}

struct PrintTables;

impl BoardVisitor for PrintTables {
    type Output = anyhow::Result<()>;

    fn visit<B: Board>(self) -> anyhow::Result<()> {
        print_tables::<B>()
    }
}

fn print_tables<B: Board>() -> anyhow::Result<()> {
    let support = BoardSupport::new::<B>(());
    if let Err(err) = support.validate() {
        bail!("board {} is inconsistent: {err}", B::MODEL);
    }

    println!("{} {} ({})", support.sos.sys_name, support.sos.sys_version, support.model);
    println!();
    println!("Devices:");
    for dev in support.devices.iter() {
        println!("  {dev}");
    }
    println!();
    println!("Mounts:");
    for mount in support.mounts.iter() {
        println!("  {mount}");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match &args.command {
        Command::Build { external_flash, board } => build(board, *external_flash),
        Command::Test { board } => test(board),
        Command::Tables { board } => match boards::visit(board, PrintTables) {
            Some(res) => res,
            None => bail!("board {board} is unknown, available boards: {}", boards::NAMES.join(", ")),
        },
    }
}
