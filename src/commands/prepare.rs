//! Prepare command placeholder

use git_svn_externals::phases::Outcome;

// TODO: decide what prepare should set up (ignore rules for external targets?) before implementing it
pub fn execute() -> Outcome {
    Outcome::NotImplemented {
        feature: "prepare".to_string(),
    }
}
