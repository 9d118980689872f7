//! Shell completion scripts for the `staffhub` binary.

use clap::CommandFactory;
use clap_complete::{generate, shells::Shell};
use std::io::Write;

/// Writes the completion script for `shell` to `out`.
///
/// The script completes every subcommand, including the nested `session`, `users`,
/// `areas` and `projects` groups.
pub fn write_completion<W: Write>(shell: Shell, out: &mut W) {
    let mut command = crate::Cli::command();
    let bin_name = command.get_name().to_string();
    generate(shell, &mut command, bin_name, out);
}
