use std::{
    env,
    ffi::OsStr,
    fs,
    fs::File,
    io::Write,
    path::PathBuf,
};

const BOARDS_DIR: &str = "src/boards";

/// Board modules as (name, canonical path), sorted by name.
fn boards() -> Vec<(String, PathBuf)> {
    let mut boards: Vec<_> = fs::read_dir(BOARDS_DIR)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file() && path.extension() == Some(OsStr::new("rs")))
        .map(|path| (path.file_stem().unwrap().to_str().unwrap().to_string(), path.canonicalize().unwrap()))
        .collect();
    boards.sort();
    boards
}

fn main() {
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());

    println!("cargo:rerun-if-env-changed=ALPHA_BOARD");
    println!("cargo:rerun-if-changed={BOARDS_DIR}");

    let board = env::var("ALPHA_BOARD").unwrap_or_else(|_| "stratify_alpha".to_string()).to_lowercase();
    let boards = boards();
    let Some((_, src)) = boards.iter().find(|(name, _)| *name == board) else {
        let known: Vec<_> = boards.iter().map(|(name, _)| name.as_str()).collect();
        panic!("board {board} is unknown, available boards: {}", known.join(", "));
    };

    let settings = alpha_build::read_settings(src).unwrap_or_else(|err| panic!("cannot read {}: {err}", src.display()));
    let board_version = alpha_build::required(&settings, "BOARD-VERSION").unwrap_or_else(|err| panic!("{err}"));
    let pkg_version = env::var("CARGO_PKG_VERSION").unwrap();
    fs::write(out.join("board_version.txt"), format!("{pkg_version}/{board_version}")).unwrap();

    let mut board_mods = File::create(out.join("board_mods.rs")).unwrap();
    for (name, path) in &boards {
        writeln!(&mut board_mods, "#[path = {:?}]", path.to_str().unwrap()).unwrap();
        writeln!(&mut board_mods, "pub mod {name};").unwrap();
    }
    writeln!(&mut board_mods, "pub use {board}::BoardImpl as Chosen;").unwrap();

    let names: Vec<_> = boards.iter().map(|(name, _)| format!("{name:?}")).collect();
    writeln!(&mut board_mods, "/// Names of all boards.").unwrap();
    writeln!(&mut board_mods, "pub const NAMES: &[&str] = &[{}];", names.join(", ")).unwrap();
    writeln!(&mut board_mods, "/// Runs `visitor` for the named board, or returns `None` if the board is unknown.").unwrap();
    writeln!(&mut board_mods, "pub fn visit<V: BoardVisitor>(name: &str, visitor: V) -> Option<V::Output> {{").unwrap();
    writeln!(&mut board_mods, "    match name {{").unwrap();
    for (name, _) in &boards {
        writeln!(&mut board_mods, "        {name:?} => Some(visitor.visit::<{name}::BoardImpl>()),").unwrap();
    }
    writeln!(&mut board_mods, "        _ => None,").unwrap();
    writeln!(&mut board_mods, "    }}").unwrap();
    writeln!(&mut board_mods, "}}").unwrap();

    for (_, path) in &boards {
        println!("cargo:rerun-if-changed={}", path.display());
    }
    println!("cargo:rerun-if-changed=build.rs");
}
