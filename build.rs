//! Build script rendering the `spinup` manual pages.
//!
//! One page is written for the top-level command and one per subcommand
//! (`spinup-synth.1`, `spinup-graph.1`) into `OUT_DIR`, where packaging
//! picks them up.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    for watched in ["build.rs", "src/cli/mod.rs"] {
        writeln!(stdout, "cargo:rerun-if-changed={watched}")?;
    }

    let out_dir = env::var("OUT_DIR")
        .map(Utf8PathBuf::from)
        .map_err(|err| io::Error::new(io::ErrorKind::NotFound, format!("OUT_DIR: {err}")))?;

    let command = cli::Cli::command();
    write_page(&out_dir, "spinup", Man::new(command.clone()))?;
    for subcommand in command.get_subcommands() {
        let name = format!("spinup-{}", subcommand.get_name());
        write_page(&out_dir, &name, Man::new(subcommand.clone()).title(name.as_str()))?;
    }

    Ok(())
}

fn write_page(out_dir: &Utf8Path, name: &str, man: Man) -> io::Result<()> {
    let mut page = Vec::new();
    man.render(&mut page)?;
    fs::write(out_dir.join(format!("{name}.1")), page)
}
