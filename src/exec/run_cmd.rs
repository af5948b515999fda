use std::fs::File;
use std::io::{stderr, stdout, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;

use crate::fs::Fs;

use super::Error;

/// Build a `Command` from a user-supplied command string like "code -w".
/// The first word is the program, the rest are leading arguments.
pub fn command_from(cmdline: &str) -> Result<Command, Error> {
    let mut words = cmdline.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| Error::EmptyCommand(cmdline.to_owned()))?;
    let mut cmd = Command::new(program);
    cmd.args(words);
    Ok(cmd)
}

/// Render a command for display: program followed by its arguments.
pub fn describe(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&launch::shell_quote(&arg.to_string_lossy()));
    }
    line
}

/// Run a subprocess attached to our terminal and wait for it (editors, make, git).
pub fn run_foreground(cmd: &mut Command) -> Result<ExitStatus> {
    log::debug!("running {}", describe(cmd));
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to execute {:?}", cmd.get_program()))?;
    log::debug!("{:?} finished with {status}", cmd.get_program());
    Ok(status)
}

/// Run a subprocess and collect its output (sbatch).
pub fn run_captured(cmd: &mut Command) -> Result<Output> {
    log::debug!("running {}", describe(cmd));
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("failed to execute {:?}", cmd.get_program()))?;
    Ok(out)
}

/// Run a subprocess, storing stdout and stderr in the given files
/// while also echoing them to our own stdout and stderr.
/// Based on:
/// <https://stackoverflow.com/questions/66060139/how-to-tee-stdout-stderr-from-a-subprocess-in-rust>
pub fn run_logged(
    cmd: &mut Command,
    out_path: &Path,
    err_path: &Path,
    fs: &Fs,
    verbose: bool,
) -> Result<ExitStatus> {
    if verbose {
        eprintln!("{} {:?}, {:?}", "Logging to".magenta(), out_path, err_path);
    }
    let out_file = fs.create_file(out_path).context("creating stdout log")?;
    let err_file = fs.create_file(err_path).context("creating stderr log")?;

    log::debug!("running {}", describe(cmd));
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute {:?}", cmd.get_program()))?;

    let child_out = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("cannot attach to child stdout"))?;
    let child_err = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("cannot attach to child stderr"))?;

    let thread_out = thread::spawn(move || communicate(child_out, out_file, stdout()));
    let thread_err = thread::spawn(move || communicate(child_err, err_file, stderr()));

    let out_result = thread_out
        .join()
        .map_err(|_| anyhow!("stdout thread panicked"))?;
    let err_result = thread_err
        .join()
        .map_err(|_| anyhow!("stderr thread panicked"))?;

    let status = child.wait().context("waiting on child process")?;
    out_result.context("copying child stdout")?;
    err_result.context("copying child stderr")?;

    if verbose {
        eprintln!("\n{} with {status}.", "Process finished".green());
    }
    Ok(status)
}

fn communicate<R: Read, W: Write>(
    mut stream: R,
    mut file: File,
    mut output: W,
) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    loop {
        let num_read = stream.read(&mut buf)?;
        if num_read == 0 {
            break;
        }

        let buf = &buf[..num_read];
        file.write_all(buf)?;
        output.write_all(buf)?;
    }
    file.flush()?;
    output.flush()
}
