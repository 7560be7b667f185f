use clap::CommandFactory;
use clap_complete::{Generator, Shell};
use clap_mangen::Man;
use std::path::{Path, PathBuf};

// The CLI definition lives in the library crate
include!("src/cli/app.rs");

fn write_man_page(cmd: clap::Command, path: &Path) -> std::io::Result<()> {
    let mut buf = Vec::new();
    Man::new(cmd).render(&mut buf)?;
    std::fs::write(path, buf)
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli/app.rs");

    let out_dir =
        PathBuf::from(std::env::var("OUT_DIR").unwrap_or_else(|_| "target/man".to_string()));

    let man_dir = out_dir.join("man");
    std::fs::create_dir_all(&man_dir)?;

    let cmd = Cli::command();
    write_man_page(cmd.clone(), &man_dir.join("wdump.1"))?;
    for sub in cmd.get_subcommands() {
        let page = man_dir.join(format!("wdump-{}.1", sub.get_name()));
        write_man_page(sub.clone(), &page)?;
    }

    let completions_dir = out_dir.join("completions");
    std::fs::create_dir_all(&completions_dir)?;
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        let mut buf = Vec::new();
        clap_complete::generate(shell, &mut Cli::command(), "wdump", &mut buf);
        std::fs::write(completions_dir.join(shell.file_name("wdump")), buf)?;
    }

    Ok(())
}
