//! # `svn:externals` Parsing
//!
//! Turns the value of one directory's `svn:externals` property into
//! [`ExternalEntry`] values. Both declaration orders Subversion accepts are
//! supported:
//!
//! ```text
//! # Subversion 1.5+ format: [-r REV] URL[@PEG] TARGET
//! -r5 svn://host/repo/lib third_party/lib
//! ^/vendor/tool@12 tools/tool
//! "../shared lib" "shared lib"
//!
//! # pre-1.5 format: TARGET [-r REV] URL
//! third_party/zlib -r 1200 http://svn.example.com/zlib/trunk
//! ```
//!
//! Blank lines and `#` comments are skipped. Anything else that does not match
//! one of the two forms fails the whole declaration: a half-understood
//! externals property is not a safe basis for writing into the work tree.
//!
//! Relative URLs (`../`, `^/`, `//`, `/`) need to know where the declaring
//! directory lives; see [`ExternalsParser::with_directory_url`] and
//! [`ExternalsParser::with_repository_root`].

use std::path::{Component, Path};

use url::Url;

use crate::coordinate::{Coordinate, ExternalEntry};
use crate::error::{Error, Result};

/// Parser for `svn:externals` declarations.
#[derive(Debug, Clone, Default)]
pub struct ExternalsParser {
    directory_url: Option<String>,
    repository_root: Option<String>,
}

impl ExternalsParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the directory carrying the property; base for `../`, `//` and
    /// `/` URLs.
    pub fn with_directory_url(mut self, url: impl Into<String>) -> Self {
        self.directory_url = Some(url.into());
        self
    }

    /// Root URL of the repository; base for `^/` URLs.
    pub fn with_repository_root(mut self, url: impl Into<String>) -> Self {
        self.repository_root = Some(url.into());
        self
    }

    /// Parse `declaration`, placing every target below `target_base`.
    pub fn parse(&self, target_base: &str, declaration: &str) -> Result<Vec<ExternalEntry>> {
        let mut entries = Vec::new();

        for raw_line in declaration.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let entry = self
                .parse_line(target_base, line)
                .map_err(|message| Error::ExternalsParse {
                    path: target_base.to_string(),
                    line: line.to_string(),
                    message,
                })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn parse_line(&self, target_base: &str, line: &str) -> std::result::Result<ExternalEntry, String> {
        let tokens = tokenize(line)?;

        let mut revision = None;
        let mut positional = Vec::new();
        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            if token == "-r" {
                let value = iter
                    .next()
                    .ok_or_else(|| "-r is missing its revision".to_string())?;
                revision = Some(parse_revision(&value)?);
            } else if let Some(value) = token.strip_prefix("-r") {
                revision = Some(parse_revision(value)?);
            } else if token.starts_with('-') {
                return Err(format!("unsupported option [{}]", token));
            } else {
                positional.push(token);
            }
        }

        let (url, target, peg) = match positional.as_slice() {
            [first, second] if is_url_like(first) => {
                let (url, peg) = split_peg(first)?;
                (url, second.as_str(), peg)
            }
            [first, second] if is_absolute_url(second) => (second.as_str(), first.as_str(), None),
            [_, _] => return Err("could not tell the URL from the target".to_string()),
            _ => return Err("expected a URL and a target directory".to_string()),
        };

        let repository_url = self.resolve_url(url)?;
        let target = validate_target(target)?;

        let mut target_path = target_base.to_string();
        if !target_path.ends_with('/') {
            target_path.push('/');
        }
        target_path.push_str(&target);

        let revision = revision.or(peg).unwrap_or(Coordinate::HEAD_REVISION);
        Ok(ExternalEntry::new(
            target_path,
            Coordinate::new(repository_url, revision),
        ))
    }

    fn resolve_url(&self, url: &str) -> std::result::Result<String, String> {
        let resolved = if url.contains("://") {
            Url::parse(url).map_err(|e| format!("invalid URL [{}]: {}", url, e))?
        } else if let Some(rest) = url.strip_prefix("^/") {
            let root = self
                .repository_root
                .as_deref()
                .ok_or_else(|| format!("cannot resolve [{}] without a repository root", url))?;
            base_url(root)?
                .join(rest)
                .map_err(|e| format!("invalid URL [{}]: {}", url, e))?
        } else {
            let directory = self
                .directory_url
                .as_deref()
                .ok_or_else(|| format!("cannot resolve relative URL [{}]", url))?;
            let base = base_url(directory)?;
            let joined = if url.starts_with("//") {
                Url::parse(&format!("{}:{}", base.scheme(), url))
            } else {
                base.join(url)
            };
            joined.map_err(|e| format!("invalid URL [{}]: {}", url, e))?
        };

        Ok(resolved.as_str().trim_end_matches('/').to_string())
    }
}

/// Parse a declaration that only uses absolute URLs.
pub fn parse(target_base: &str, declaration: &str) -> Result<Vec<ExternalEntry>> {
    ExternalsParser::new().parse(target_base, declaration)
}

/// Whether any line of `declaration` uses a repository-root relative URL.
///
/// Lines are split with the same tokenizer the parser uses, so quoted and
/// escaped URLs are seen the way `parse` sees them. Lines that fail to
/// tokenize are left for `parse` to report.
pub fn needs_repository_root(declaration: &str) -> bool {
    declaration
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| tokenize(line).ok())
        .any(|tokens| tokens.iter().any(|token| token.starts_with("^/")))
}

fn base_url(url: &str) -> std::result::Result<Url, String> {
    let with_slash = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    };
    Url::parse(&with_slash).map_err(|e| format!("invalid base URL [{}]: {}", url, e))
}

fn is_absolute_url(token: &str) -> bool {
    token.contains("://")
}

fn is_url_like(token: &str) -> bool {
    is_absolute_url(token)
        || token.starts_with("^/")
        || token.starts_with("../")
        || token.starts_with('/')
}

/// Split a trailing `@PEG` off a URL. Only numeric or `HEAD` suffixes count,
/// so `svn+ssh://user@host/...` is left alone.
fn split_peg(url: &str) -> std::result::Result<(&str, Option<u64>), String> {
    match url.rsplit_once('@') {
        Some((base, peg))
            if !base.is_empty()
                && (peg.eq_ignore_ascii_case("HEAD")
                    || (!peg.is_empty() && peg.bytes().all(|b| b.is_ascii_digit()))) =>
        {
            Ok((base, Some(parse_revision(peg)?)))
        }
        _ => Ok((url, None)),
    }
}

fn parse_revision(value: &str) -> std::result::Result<u64, String> {
    if value.eq_ignore_ascii_case("HEAD") {
        return Ok(Coordinate::HEAD_REVISION);
    }
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("unsupported revision [{}]", value));
    }
    value
        .parse::<u64>()
        .map_err(|e| format!("invalid revision [{}]: {}", value, e))
}

fn validate_target(target: &str) -> std::result::Result<String, String> {
    let path = Path::new(target);
    if target.is_empty() || target.starts_with('/') || path.is_absolute() {
        return Err(format!("target [{}] must be a relative path", target));
    }
    if is_absolute_url(target) {
        return Err(format!("target [{}] is a URL, not a directory", target));
    }

    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(format!("target [{}] must stay below its directory", target)),
        }
    }
    if parts.is_empty() {
        return Err(format!("target [{}] names no directory", target));
    }
    Ok(parts.join("/"))
}

/// Split a line into tokens, honouring quotes and backslash escapes.
fn tokenize(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "dangling backslash".to_string())?;
                current.push(escaped);
                in_token = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
