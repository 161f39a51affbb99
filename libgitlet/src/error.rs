use crate::hash::Oid;
use std::fmt::{self, Display, Formatter};

pub type GitletResult<T> = Result<T, GitletGenericError>;
pub type GitletGenericError = anyhow::Error;

// usually we can just use anyhow for errors, but sometimes it's nice to have a
// "rust" representation we can test or match against
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub enum GitletError {
    /// "file does not exist"
    FileDoesNotExist,
    /// "no reason to remove the file"
    NoReasonToRemove,
    /// "Please enter a commit message."
    EmptyCommitMessage,
    /// committing a tree identical to the parent's
    NoChangesAdded,
    /// object `{0}` not found in the store
    ObjectNotFound(String),
    /// prefix `{0}` matches more than one object
    AmbiguousPrefix(String, Vec<Oid>),
    /// "There is an untracked file in the way; delete it, or add and commit it first."
    UntrackedOverwrite,
    /// "You have uncommitted changes."
    UncommittedChanges,
    /// "A branch with that name does not exist."
    NoSuchBranch(String),
    /// "No need to checkout the current branch."
    AlreadyOnBranch,
    /// "A branch with that name already exists."
    BranchAlreadyExists(String),
    /// "Cannot remove the current branch."
    CannotRemoveCurrentBranch,
    /// "Cannot merge a branch with itself."
    MergeSelf,
    /// "Given branch is an ancestor of the current branch."
    MergeAncestor,
    /// "Current branch fast-forwarded."
    FastForward,
    /// "No changes to merge."
    NoMergeChanges,
    /// "Not in an initialized Gitlet directory."
    NotARepo,
    /// "Incorrect operands."
    IncorrectOperands,
    /// "No command with that name exists."
    NoSuchCommand,
    /// "Please enter a command."
    NoCommand,
    /// "Found no commit with that message."
    NoSuchCommitMessage,
}

pub trait GitletErrorExt {
    /// tries to convert a generic error into a typed error, leaving it untouched on failure
    fn try_into_gitlet_error(self) -> GitletResult<GitletError>;
}

impl GitletErrorExt for GitletGenericError {
    fn try_into_gitlet_error(self) -> GitletResult<GitletError> {
        match self.downcast::<GitletError>() {
            Ok(err) => Ok(err),
            Err(cast_failed) => Err(cast_failed),
        }
    }
}

pub trait GitletResultExt {
    /// a "fatal" error is a structural corruption (bad object, bad hash) that is not
    /// part of the user-facing diagnostic vocabulary described in the specification
    fn is_fatal(&self) -> bool;
}

impl<T> GitletResultExt for GitletResult<T> {
    fn is_fatal(&self) -> bool {
        match self {
            Ok(..) => false,
            Err(err) => err.is_fatal(),
        }
    }
}

impl GitletResultExt for GitletGenericError {
    fn is_fatal(&self) -> bool {
        self.downcast_ref::<GitletError>().is_none()
    }
}

impl std::error::Error for GitletError {}

impl Display for GitletError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GitletError::FileDoesNotExist => write!(f, "File does not exist."),
            GitletError::NoReasonToRemove => write!(f, "No reason to remove the file."),
            GitletError::EmptyCommitMessage => write!(f, "Please enter a commit message."),
            GitletError::NoChangesAdded => write!(f, "No changes added to the commit."),
            GitletError::ObjectNotFound(id) => write!(f, "No commit with that id exists. ({})", id),
            GitletError::AmbiguousPrefix(prefix, candidates) => {
                write!(f, "prefix `{}` is ambiguous, candidates: ", prefix)?;
                for (i, candidate) in candidates.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", candidate)?;
                }
                Ok(())
            }
            GitletError::UntrackedOverwrite => write!(
                f,
                "There is an untracked file in the way; delete it, or add and commit it first."
            ),
            GitletError::UncommittedChanges => write!(f, "You have uncommitted changes."),
            GitletError::NoSuchBranch(..) => write!(f, "A branch with that name does not exist."),
            GitletError::AlreadyOnBranch => write!(f, "No need to checkout the current branch."),
            GitletError::BranchAlreadyExists(..) =>
                write!(f, "A branch with that name already exists."),
            GitletError::CannotRemoveCurrentBranch =>
                write!(f, "Cannot remove the current branch."),
            GitletError::MergeSelf => write!(f, "Cannot merge a branch with itself."),
            GitletError::MergeAncestor =>
                write!(f, "Given branch is an ancestor of the current branch."),
            GitletError::FastForward => write!(f, "Current branch fast-forwarded."),
            GitletError::NoMergeChanges => write!(f, "No changes to merge."),
            GitletError::NotARepo => write!(f, "Not in an initialized Gitlet directory."),
            GitletError::IncorrectOperands => write!(f, "Incorrect operands."),
            GitletError::NoSuchCommand => write!(f, "No command with that name exists."),
            GitletError::NoCommand => write!(f, "Please enter a command."),
            GitletError::NoSuchCommitMessage => write!(f, "Found no commit with that message."),
        }
    }
}
