use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::salary::Salary;

pub const DEFAULT_CACHE_ROOT: &str = ".cache/wagemap";
pub const DEFAULT_OCCUPATION: &str = "15-1252";
pub const DEFAULT_HOURS_PER_YEAR: u32 = 2080;
pub const DEFAULT_ROUNDING_PRECISION: u32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "wagemap",
    version,
    about = "Prevailing-wage county index built from OFLC geography and wage extracts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Query(QueryArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = DEFAULT_CACHE_ROOT)]
    pub cache_root: PathBuf,

    #[arg(long, required_unless_present = "wage_path")]
    pub geography_path: Option<PathBuf>,

    #[arg(long)]
    pub wage_path: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OCCUPATION)]
    pub occupation: String,

    #[arg(long, default_value_t = DEFAULT_HOURS_PER_YEAR)]
    pub hours_per_year: u32,

    #[arg(
        long,
        default_value_t = DEFAULT_ROUNDING_PRECISION,
        value_parser = clap::value_parser!(u32).range(0..=6)
    )]
    pub rounding_precision: u32,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum WageLevel {
    Level1,
    Level2,
    Level3,
    Level4,
    Avg,
}

impl WageLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Level1 => "level1",
            Self::Level2 => "level2",
            Self::Level3 => "level3",
            Self::Level4 => "level4",
            Self::Avg => "avg",
        }
    }

    pub fn salary_key(self) -> String {
        format!("{}_salary", self.as_str())
    }
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long, default_value = DEFAULT_CACHE_ROOT)]
    pub cache_root: PathBuf,

    #[arg(long, default_value = DEFAULT_OCCUPATION)]
    pub occupation: String,

    #[arg(long)]
    pub salary: Salary,

    #[arg(long, value_enum, default_value_t = WageLevel::Level3)]
    pub level: WageLevel,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub selection_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = DEFAULT_CACHE_ROOT)]
    pub cache_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_args_parse_salary_and_level() {
        let cli = Cli::try_parse_from([
            "wagemap", "query", "--salary", "100000", "--level", "avg", "--state", "Texas",
        ])
        .unwrap();

        let Commands::Query(args) = cli.command else {
            panic!("expected query command");
        };
        assert_eq!(args.salary, "100000.00".parse::<Salary>().unwrap());
        assert_eq!(args.level, WageLevel::Avg);
        assert_eq!(args.state.as_deref(), Some("Texas"));
        assert_eq!(args.occupation, DEFAULT_OCCUPATION);
    }

    #[test]
    fn ingest_requires_an_input_file() {
        assert!(Cli::try_parse_from(["wagemap", "ingest"]).is_err());
        assert!(Cli::try_parse_from(["wagemap", "ingest", "--wage-path", "wages.csv"]).is_ok());
    }

    #[test]
    fn ingest_rejects_excessive_precision() {
        let parsed = Cli::try_parse_from([
            "wagemap",
            "ingest",
            "--geography-path",
            "geo.csv",
            "--rounding-precision",
            "9",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn salary_keys_match_artifact_fields() {
        assert_eq!(WageLevel::Level3.salary_key(), "level3_salary");
        assert_eq!(WageLevel::Avg.salary_key(), "avg_salary");
    }
}
