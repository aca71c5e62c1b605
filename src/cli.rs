use clap::Parser;
use std::path::PathBuf;

/// Usage text printed when the tool is invoked with no archive path or with
/// too many operands.
pub const USAGE: &str = "\
Usage: applist <package.app.zip>

Adds or updates the APP-LIST.xml file in the specified archive. Every content
entry is listed with its SHA-256 digest, size and name so the package can
self-describe its contents for integrity verification.
";

#[derive(Parser, Debug)]
#[command(name = "applist", version, about = "Adds or updates the APP-LIST.xml manifest in a package archive.", long_about = None)]
pub struct Args {
    /// Path to the package archive (e.g. package.app.zip).
    pub archive: Option<PathBuf>,
}
