// Writes the jobdesk man page to the given directory (default: man/man1)

use clap::CommandFactory;
use jobdesk::cli::Cli;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man/man1"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    let path = out_dir.join("jobdesk.1");
    std::fs::write(&path, buffer)?;

    for sub in cmd.get_subcommands() {
        let name = format!("jobdesk-{}", sub.get_name());
        let mut buffer = Vec::new();
        clap_mangen::Man::new(sub.clone()).title(name.clone()).render(&mut buffer)?;
        std::fs::write(out_dir.join(format!("{}.1", name)), buffer)?;
    }

    println!("Man pages written to {}", out_dir.display());
    Ok(())
}
