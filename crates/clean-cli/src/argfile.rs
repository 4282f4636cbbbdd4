//! `@file` argument expansion.
//!
//! An argument of the form `@path` is replaced by the lines of `path`, one
//! argument per line. Expanded lines may themselves name argument files.
//! Blank lines are skipped.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

pub const ARG_FILE_PREFIX: char = '@';
const MAX_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum ArgFileError {
    #[error("failed to read argument file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("argument file {path} is nested too deeply")]
    TooDeep { path: PathBuf },
}

/// Expand `@file` arguments. The first item (program name) is kept as is.
pub fn expand_arg_files<I>(args: I) -> Result<Vec<OsString>, ArgFileError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut expanded: Vec<OsString> = args.next().into_iter().collect();
    for arg in args {
        expand_into(arg, 0, &mut expanded)?;
    }
    Ok(expanded)
}

fn expand_into(arg: OsString, depth: usize, out: &mut Vec<OsString>) -> Result<(), ArgFileError> {
    let Some(path) = arg
        .to_str()
        .and_then(|text| text.strip_prefix(ARG_FILE_PREFIX))
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
    else {
        out.push(arg);
        return Ok(());
    };
    if depth >= MAX_DEPTH {
        return Err(ArgFileError::TooDeep { path });
    }
    let contents = fs::read_to_string(&path).map_err(|source| ArgFileError::Read {
        path: path.clone(),
        source,
    })?;
    for line in contents.lines().filter(|line| !line.is_empty()) {
        expand_into(OsString::from(line), depth + 1, out)?;
    }
    Ok(())
}
