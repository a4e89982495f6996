//! # Completions Command Implementation
//!
//! This module implements the `completions` subcommand, which emits a shell
//! completion script (via `clap_complete`) so that `pipsource` subcommands
//! and their flags tab-complete, including the path-valued options like
//! `--config` and `--vendor-root`.
//!
//! ## Supported Shells
//!
//! - **Bash**: save under `bash-completion/completions/` or source from
//!   `.bashrc`
//! - **Zsh**: drop the script into a directory on `fpath`
//! - **Fish**: save to `~/.config/fish/completions/pipsource.fish`
//! - **PowerShell**: dot-source from the PowerShell profile
//! - **Elvish**: `eval` from `rc.elv`
//!
//! ## Example
//!
//! ```bash
//! # Bash, per-user install
//! pipsource completions bash > ~/.local/share/bash-completion/completions/pipsource
//!
//! # Fish picks the file up on next shell start
//! pipsource completions fish > ~/.config/fish/completions/pipsource.fish
//!
//! # Zsh, assuming ~/.zfunc is on fpath
//! pipsource completions zsh > ~/.zfunc/_pipsource
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Fish Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish Shell
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to emit a completion script for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Execute the `completions` command.
///
/// Writes the completion script for the requested shell to stdout; the
/// caller redirects it to wherever their shell loads completions from.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let shell: Shell = args.shell.into();
    generate(shell, &mut cmd, "pipsource", &mut io::stdout());
    Ok(())
}
