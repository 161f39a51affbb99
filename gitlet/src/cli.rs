use std::path::Path;

use anyhow::{anyhow, bail};
use libgitlet::error::{GitletError, GitletResult, GitletResultExt};
use libgitlet::merge::MergeResult;
use libgitlet::repo::Repository;

/// Runs one command against `workdir` and returns the process exit code.
/// Diagnostics named in the specification are printed and exit 0; anything
/// that fails to downcast to a `GitletError` is treated as fatal/structural
/// and exits 1 (§7 "Error Handling Design").
pub fn run(args: &[String], workdir: &Path) -> i32 {
    match dispatch(args, workdir) {
        Ok(()) => 0,
        Err(err) => {
            println!("{}", err);
            if err.is_fatal() {
                1
            } else {
                0
            }
        }
    }
}

fn dispatch(args: &[String], workdir: &Path) -> GitletResult<()> {
    let (command, operands) = match args.split_first() {
        Some((command, operands)) => (command.as_str(), operands),
        None => bail!(GitletError::NoCommand),
    };

    if command == "init" {
        Repository::init(workdir)?;
        return Ok(());
    }

    let mut repo = Repository::discover(workdir)?;

    match command {
        "add" => {
            let [name] = require_operands(operands)?;
            repo.add(name)?;
        }
        "commit" => {
            // 0 operands is a valid shape here: an empty message is not an arity
            // error, it's `GitletError::EmptyCommitMessage` ("Please enter a
            // commit message."), which `Repository::commit` is responsible for.
            let message = match operands {
                [] => String::new(),
                [message] => message.clone(),
                _ => bail!(GitletError::IncorrectOperands),
            };
            let id = repo.commit(message)?;
            log::debug!("created commit {}", id);
        }
        "rm" => {
            let [name] = require_operands(operands)?;
            repo.rm(name)?;
        }
        "log" => {
            for commit in repo.log()? {
                print!("{}", commit);
            }
        }
        "global-log" => {
            for commit in repo.global_log()? {
                print!("{}", commit);
            }
        }
        "find" => {
            let [message] = require_operands(operands)?;
            for id in repo.find(message)? {
                println!("{}", id);
            }
        }
        "status" => {
            print!("{}", repo.status()?);
        }
        "branch" => {
            let [name] = require_operands(operands)?;
            repo.branch(name)?;
        }
        "rm-branch" => {
            let [name] = require_operands(operands)?;
            repo.rm_branch(name)?;
        }
        "checkout" => checkout(&mut repo, operands)?,
        "reset" => {
            let [id] = require_operands(operands)?;
            repo.reset(id)?;
        }
        "merge" => {
            let [branch] = require_operands(operands)?;
            match repo.merge(branch)? {
                MergeResult::FastForward => println!("Current branch fast-forwarded."),
                MergeResult::Merged { conflict } => {
                    if conflict {
                        println!("Encountered a merge conflict.");
                    }
                }
            }
        }
        "config" => config(&mut repo, operands)?,
        _ => bail!(GitletError::NoSuchCommand),
    }

    Ok(())
}

fn checkout(repo: &mut Repository, operands: &[String]) -> GitletResult<()> {
    match operands {
        [dashdash, name] if dashdash == "--" => repo.checkout_head_file(name),
        [id, dashdash, name] if dashdash == "--" => repo.checkout_commit_file(id, name),
        [branch] => repo.checkout_branch(branch),
        _ => bail!(GitletError::IncorrectOperands),
    }
}

fn config(repo: &mut Repository, operands: &[String]) -> GitletResult<()> {
    match operands {
        [sub, key] if sub == "get" => match repo.config_get(key) {
            Some(value) => println!("{}", value),
            None => println!(),
        },
        [sub, key, value] if sub == "set" => repo.config_set(key, value)?,
        _ => bail!(GitletError::IncorrectOperands),
    }
    Ok(())
}

/// requires exactly `N` operands, the `checkout`/`reset` "Incorrect operands."
/// diagnostic shared by every fixed-arity command (§6).
fn require_operands<const N: usize>(operands: &[String]) -> GitletResult<&[String; N]> {
    operands.try_into().map_err(|_| anyhow!(GitletError::IncorrectOperands))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_argv_reports_no_command() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(&args(&[]), dir.path()), 0);
    }

    #[test]
    fn unknown_command_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        assert_eq!(run(&args(&["frobnicate"]), dir.path()), 0);
    }

    #[test]
    fn commands_before_init_report_not_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(&args(&["status"]), dir.path()), 0);
    }

    #[test]
    fn init_add_commit_log_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(&args(&["init"]), dir.path()), 0);
        std::fs::write(dir.path().join("a.txt"), b"hi").unwrap();
        assert_eq!(run(&args(&["add", "a.txt"]), dir.path()), 0);
        assert_eq!(run(&args(&["commit", "one"]), dir.path()), 0);
        assert_eq!(run(&args(&["log"]), dir.path()), 0);
    }

    #[test]
    fn checkout_with_wrong_operands_reports_incorrect_operands() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        assert_eq!(run(&args(&["checkout"]), dir.path()), 0);
    }
}
