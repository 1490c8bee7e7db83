//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Default URL of the packaged latest-release archive.
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://github.com/relayhq/relay/releases/latest/download/relay.zip";

/// Install or update relay for the current user.
///
/// Downloads the packaged release archive, extracts it, stages it into the
/// per-user installation directory, and registers the bin directory on the
/// search path.
#[derive(Parser, Debug)]
#[command(name = "relayup")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Release archive URL to install from
    #[arg(long, default_value = DEFAULT_ARCHIVE_URL)]
    pub url: String,

    /// Installation directory (defaults to the per-user application-data directory)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Download chunk buffer size in bytes (1 B - 16 MiB)
    #[arg(long, default_value_t = 16 * 1024, value_parser = clap::value_parser!(u32).range(1..=16 * 1024 * 1024))]
    pub buffer_size: u32,

    /// Replace the existing installation in place instead of staging a
    /// sibling copy and swapping it in
    #[arg(long)]
    pub in_place: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["relayup"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.url, DEFAULT_ARCHIVE_URL);
        assert_eq!(args.buffer_size, 16 * 1024);
        assert!(args.install_dir.is_none());
        assert!(!args.in_place);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["relayup", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["relayup", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["relayup", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_url_override() {
        let args =
            Args::try_parse_from(["relayup", "--url", "https://example.com/r.zip"]).unwrap();
        assert_eq!(args.url, "https://example.com/r.zip");
    }

    #[test]
    fn test_cli_install_dir_override() {
        let args = Args::try_parse_from(["relayup", "--install-dir", "/opt/relay"]).unwrap();
        assert_eq!(args.install_dir, Some(PathBuf::from("/opt/relay")));
    }

    #[test]
    fn test_cli_buffer_size_zero_rejected() {
        let result = Args::try_parse_from(["relayup", "--buffer-size", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_buffer_size_over_max_rejected() {
        let result = Args::try_parse_from(["relayup", "--buffer-size", "16777217"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_in_place_flag() {
        let args = Args::try_parse_from(["relayup", "--in-place"]).unwrap();
        assert!(args.in_place);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["relayup", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
