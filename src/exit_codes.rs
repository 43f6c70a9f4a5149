/// Exit codes for the wpifmt CLI.
///
/// The three-way split lets CI distinguish "the file needs work" from
/// "the tool could not run at all".
/// Success - the formatter ran and had nothing to complain about
pub const SUCCESS: i32 = 0;

/// Formatting issues found - the formatter reported problems in the file
pub const ISSUES_FOUND: i32 = 1;

/// Tool error - missing repository, missing executable, or bad configuration
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{ISSUES_FOUND, SUCCESS, TOOL_ERROR};

    /// Exit with success code (0)
    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    /// Exit with issues found code (1)
    pub fn issues_found() -> ! {
        std::process::exit(ISSUES_FOUND);
    }

    /// Exit with tool error code (2)
    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
