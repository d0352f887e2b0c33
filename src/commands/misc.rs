use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

pub fn display_banner() {
    println!(r#"
  ██████╗ ██╗████████╗███████╗██████╗ ██╗      ██████╗ ██████╗ ███████╗
 ██╔════╝ ██║╚══██╔══╝██╔════╝██╔══██╗██║     ██╔═══██╗██╔══██╗██╔════╝
 ██║  ███╗██║   ██║   ███████╗██████╔╝██║     ██║   ██║██████╔╝█████╗
 ██║   ██║██║   ██║   ╚════██║██╔═══╝ ██║     ██║   ██║██╔══██╗██╔══╝
 ╚██████╔╝██║   ██║   ███████║██║     ███████╗╚██████╔╝██║  ██║███████╗
  ╚═════╝ ╚═╝   ╚═╝   ╚══════╝╚═╝     ╚══════╝ ╚═════╝ ╚═╝  ╚═╝╚══════╝
"#);

    let mut cmd = crate::Cli::command();
    let _ = cmd.print_help();
    println!();
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, "gitsplore", &mut io::stdout());

    eprintln!();
    eprintln!("Save the output to the appropriate location for your shell:");
    match shell {
        Shell::Bash => {
            eprintln!("  gitsplore completions bash > ~/.local/share/bash-completion/completions/gitsplore");
        }
        Shell::Zsh => {
            eprintln!("  gitsplore completions zsh > ~/.zsh/completions/_gitsplore");
            eprintln!("  # (Add 'fpath=(~/.zsh/completions $fpath)' before 'compinit' in .zshrc)");
        }
        Shell::Fish => {
            eprintln!("  gitsplore completions fish > ~/.config/fish/completions/gitsplore.fish");
        }
        _ => {}
    }
}
