use std::io;
use std::path::Path;

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

/// Renders `satvox.1` plus one `satvox-<command>.1` per subcommand into
/// `$OUT_DIR/man`.
fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR unset"))?;
    let man_dir = Path::new(&out_dir).join("man");
    std::fs::create_dir_all(&man_dir)?;

    let satvox = cli::Cli::command();
    write_page(&satvox, "satvox", &man_dir)?;

    for sub in satvox.get_subcommands().filter(|s| s.get_name() != "help") {
        let name = format!("satvox-{}", sub.get_name());
        write_page(&sub.clone().name(name.clone()), &name, &man_dir)?;
    }
    Ok(())
}

fn write_page(cmd: &clap::Command, name: &str, dir: &Path) -> io::Result<()> {
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    std::fs::write(dir.join(format!("{name}.1")), page)
}
