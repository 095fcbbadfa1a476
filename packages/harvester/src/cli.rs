//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser as ClapParser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crosswalk_core::date::ExtendedDateParser;
use crosswalk_core::parser::{OaiHeaders, Parser};
use crosswalk_core::record::Record;
use crosswalk_core::value::Navigate;

use crate::client::HttpOaiClient;
use crate::error::Result;
use crate::harvester::{Harvester, OaiHarvester};
use crate::source::{HarvestSource, SourceType};
use crate::types::ListOptions;

/// Crosswalk Harvester - Harvest and inspect metadata records over OAI-PMH.
#[derive(ClapParser)]
#[command(name = "crosswalk-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Repository and selective harvesting arguments shared by list commands.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// OAI-PMH base URL
    pub endpoint: String,

    /// Metadata prefix to request
    #[arg(short = 'p', long, default_value = "oai_dc")]
    pub metadata_prefix: String,

    /// Restrict to one set
    #[arg(short, long)]
    pub set: Option<String>,

    /// Lower datestamp bound (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Upper datestamp bound (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Stop after this many items
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl ListArgs {
    fn options(&self) -> ListOptions {
        ListOptions {
            metadata_prefix: self.metadata_prefix.clone(),
            set: self.set.clone(),
            from: self.from.clone(),
            until: self.until.clone(),
        }
    }

    fn harvester(&self) -> Result<OaiHarvester<HttpOaiClient>> {
        OaiHarvester::new(HttpOaiClient::new(&self.endpoint)?, self.options())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List record identifiers.
    Identifiers {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Harvest records and print each one's identifier and root element.
    Records {
        #[command(flatten)]
        list: ListArgs,

        /// Parse each record with this source type
        #[arg(short = 't', long, value_enum, default_value = "oai_dc")]
        source_type: SourceType,
    },

    /// Fetch one record and print its XML.
    Get {
        /// OAI-PMH base URL
        endpoint: String,

        /// Record identifier
        identifier: String,

        /// Metadata prefix to request
        #[arg(short = 'p', long, default_value = "oai_dc")]
        metadata_prefix: String,
    },

    /// Harvest a source described by a YAML file.
    Harvest {
        /// Harvest source file
        #[arg(short, long)]
        source: PathBuf,

        /// Stop after this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Normalize a free-text date to EDTF.
    ParseDate {
        /// Date text, e.g. "ca. 1945" or "1990-1995"
        text: String,

        /// Do not split ranges into intervals
        #[arg(long)]
        single: bool,
    },

    /// Parse a local record file and print its root structure.
    Inspect {
        /// Record file (XML or JSON)
        file: PathBuf,

        /// Source type selecting the parser
        #[arg(short = 't', long, value_enum)]
        source_type: SourceType,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Identifiers { list } => identifiers_command(&list),
        Commands::Records { list, source_type } => {
            let harvester = list.harvester()?;
            records_command(&harvester, source_type, list.limit)
        }
        Commands::Get {
            endpoint,
            identifier,
            metadata_prefix,
        } => get_command(&endpoint, &identifier, &metadata_prefix),
        Commands::Harvest { source, limit } => harvest_command(&source, limit),
        Commands::ParseDate { text, single } => {
            parse_date_command(&text, single);
            Ok(())
        }
        Commands::Inspect { file, source_type } => inspect_command(&file, source_type),
    }
}

fn identifiers_command(list: &ListArgs) -> Result<()> {
    let harvester = list.harvester()?;
    for identifier in harvester.record_ids().take(list.limit.unwrap_or(usize::MAX)) {
        println!("{}", identifier?);
    }
    Ok(())
}

fn records_command(
    harvester: &OaiHarvester<HttpOaiClient>,
    source_type: SourceType,
    limit: Option<usize>,
) -> Result<()> {
    let config = source_type.parser_config();

    let pb = spinner();
    pb.set_message(format!("Harvesting {}...", harvester.client().endpoint()));

    let mut harvested = 0usize;
    let mut failed = 0usize;
    for record in harvester.records().take(limit.unwrap_or(usize::MAX)) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };
        harvested += 1;

        let name = record.local_name().unwrap_or_default().to_string();
        match Parser::parse(&record, &config) {
            Ok(parser) => pb.println(format!("{name}\t{}", parser.root().name())),
            Err(e) => {
                failed += 1;
                pb.println(format!("{name}\t{}", style(e).red()));
            }
        }
        pb.set_message(format!("{harvested} records"));
    }

    pb.finish_and_clear();
    print_summary(harvested, failed);
    Ok(())
}

fn get_command(endpoint: &str, identifier: &str, metadata_prefix: &str) -> Result<()> {
    let harvester = OaiHarvester::new(
        HttpOaiClient::new(endpoint)?,
        ListOptions::new(metadata_prefix),
    )?;
    let record = harvester.get_record(identifier)?;
    println!("{}", record.content());
    Ok(())
}

fn harvest_command(path: &Path, limit: Option<usize>) -> Result<()> {
    let source = HarvestSource::from_path(path)?;

    println!(
        "{} {} as {}",
        style("Harvesting").bold(),
        style(&source.endpoint).cyan(),
        style(&source.metadata_prefix).green()
    );
    if let Some(set) = &source.set {
        println!("  Set: {}", style(set).green());
    }
    println!();

    let harvester = OaiHarvester::from_source(&source)?;
    records_command(&harvester, source.source_type, limit)
}

fn parse_date_command(text: &str, single: bool) {
    let parser = if single {
        ExtendedDateParser::new()
    } else {
        ExtendedDateParser::new().with_intervals()
    };

    let Some(date) = parser.parse(text) else {
        println!("{} {}", style("Unrecognized date:").yellow().bold(), text);
        return;
    };

    println!("{date}");
    if let (Some(earliest), Some(latest)) = (date.earliest(), date.latest()) {
        println!("  Earliest: {}", style(earliest).green());
        println!("  Latest: {}", style(latest).green());
    }
}

fn inspect_command(file: &Path, source_type: SourceType) -> Result<()> {
    let config = source_type.parser_config();
    let record = Record::new(fs::read_to_string(file)?, config.content_type());
    let parser = Parser::parse(&record, &config)?;
    let root = parser.root();

    println!("{} {}", style("Root:").bold(), style(root.name()).cyan());
    for child in root.children() {
        println!("  {child}");
    }

    if config.oai_headers() {
        let header = parser.header()?;
        if let Some(identifier) = header.child("oai:identifier")?.values().first() {
            println!("{} {}", style("Identifier:").bold(), identifier);
        }
    }
    Ok(())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_summary(harvested: usize, failed: usize) {
    println!();
    println!(
        "{} {} records",
        style("Harvested").green().bold(),
        harvested
    );
    if failed > 0 {
        println!("  Parse failures: {}", style(failed).yellow().bold());
    }
}
