use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON catalog export to load
    #[clap(long, value_parser, default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Config file (defaults to the usual search locations)
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Suggest gear for a partial, possibly misspelled name
    Autocomplete {
        query: String,

        #[clap(short, long, value_parser, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Suggest brands for a partial name
    Brands {
        query: String,

        #[clap(short, long, value_parser, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Rank substitutes for a gear item
    Alternatives {
        gear_id: String,

        #[clap(long, value_parser, allow_negative_numbers = true)]
        max_weight: Option<i64>,

        #[clap(long, value_parser, allow_negative_numbers = true)]
        max_price: Option<i64>,

        #[clap(long, value_parser, allow_negative_numbers = true)]
        capacity: Option<i64>,

        /// Look for substitutes in this product type instead
        #[clap(long, value_parser)]
        product_type: Option<String>,

        #[clap(short, long, value_parser, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Show one gear item by id, or by name with --by-name
    Gear {
        key: String,

        #[clap(long, value_parser, default_value_t = false)]
        by_name: bool,
    },
    /// List gear matching filters, ordered by name
    List {
        #[clap(long, value_parser)]
        brand: Option<String>,

        #[clap(long, value_parser)]
        product_type: Option<String>,

        #[clap(long, value_parser)]
        category: Option<String>,

        #[clap(long, value_parser)]
        weight_under: Option<u32>,

        #[clap(long, value_parser)]
        weight_over: Option<u32>,

        #[clap(long, value_parser)]
        price_under: Option<u64>,

        #[clap(long, value_parser)]
        price_over: Option<u64>,

        #[clap(long, value_parser)]
        capacity: Option<i64>,

        #[clap(short, long, value_parser, allow_negative_numbers = true)]
        limit: Option<i64>,

        #[clap(long, value_parser, default_value_t = 0)]
        offset: usize,
    },
    /// Print the category hierarchy
    Categories,
    /// Print catalog and index statistics
    Stats,
    /// Print Prometheus metrics after running nothing but the index build
    Metrics,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
