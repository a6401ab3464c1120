use std::path::PathBuf;

use clap::{Parser, Subcommand};
use civmap_core::ExportFormat;

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(
    name = "civmap",
    version,
    about = "Browse, search, and export civic facilities in central Uganda"
)]
pub(crate) struct Config {
    /// District boundary GeoJSON: a file path or an http(s) URL.
    #[arg(
        long,
        env = "CIVMAP_BOUNDARIES",
        value_name = "PATH_OR_URL",
        default_value = "data/central_uganda_districts.geojson"
    )]
    pub boundaries: String,

    /// File holding like counts and liked flags.
    #[arg(long, env = "CIVMAP_LIKES_FILE", value_name = "PATH", default_value = "civmap-likes.json")]
    pub likes_file: PathBuf,

    /// Directory exports are written to.
    #[arg(long, env = "CIVMAP_EXPORT_DIR", value_name = "DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Log file; the terminal is reserved for the dashboard.
    #[arg(long, env = "CIVMAP_LOG_FILE", value_name = "PATH", default_value = "civmap.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Write every facility as csv, geojson, or kml.
    Export {
        /// Output format.
        #[arg(value_name = "FORMAT")]
        format: ExportFormat,
        /// Output file; defaults to the format's file name in the export directory.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Rank facilities against a query and print the best matches.
    Search {
        /// Search text.
        query: String,
        /// Use type-ahead suggestion scoring instead of full search.
        #[arg(long)]
        suggest: bool,
    },
}

impl Config {
    /// Where an export in `format` goes when no explicit path is given.
    pub(crate) fn export_path(&self, format: ExportFormat) -> PathBuf {
        self.export_dir.join(format.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::try_parse_from(["civmap"]).unwrap();
        assert_eq!(config.boundaries, "data/central_uganda_districts.geojson");
        assert_eq!(config.likes_file, PathBuf::from("civmap-likes.json"));
        assert!(config.command.is_none());
        assert_eq!(
            config.export_path(ExportFormat::Csv),
            PathBuf::from("./uganda-gis-facilities.csv")
        );
    }

    #[test]
    fn export_subcommand_parses_format() {
        let config = Config::try_parse_from(["civmap", "--export-dir", "out", "export", "kml"]).unwrap();
        match config.command {
            Some(Command::Export { format, out }) => {
                assert_eq!(format, ExportFormat::Kml);
                assert!(out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Config::try_parse_from(["civmap", "export", "xlsx"]).is_err());
    }

    #[test]
    fn search_subcommand_takes_flag() {
        let config = Config::try_parse_from(["civmap", "search", "mengo", "--suggest"]).unwrap();
        assert!(matches!(
            config.command,
            Some(Command::Search { ref query, suggest: true }) if query == "mengo"
        ));
    }
}
