use clap::{Parser, Subcommand};
use leadscout_core::{load_app_config, BusinessRecord};
use leadscout_pipeline::{SearchOptions, SearchPipeline};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(about = "Business prospect discovery over a places API and map scraping")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for businesses matching an industry in a location
    Search {
        /// What kind of business to look for, e.g. "coffee shops"
        industry: String,
        /// Where to look, e.g. "Portland, OR"
        location: String,
        /// Cap on returned results
        #[arg(long, default_value_t = 20)]
        max_results: usize,
        /// Force the API (or the scraper with =false) as the first source
        #[arg(long)]
        prefer_api: Option<bool>,
        /// Emit JSON instead of a text listing
        #[arg(long)]
        json: bool,
    },
    /// Look up details for one business
    Details {
        /// Place identifier from an API search result
        #[arg(long)]
        place_id: Option<String>,
        /// Detail-page URL for scraped results
        #[arg(long)]
        url: Option<String>,
        /// Emit JSON instead of a text listing
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_app_config()?;
    let pipeline = SearchPipeline::new(config)?;

    let result = run(&pipeline, cli.command).await;
    pipeline.cleanup().await;
    result
}

async fn run(pipeline: &SearchPipeline, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Search {
            industry,
            location,
            max_results,
            prefer_api,
            json,
        } => {
            let options = SearchOptions {
                prefer_api,
                max_results,
            };
            let records = pipeline
                .search_businesses(&industry, &location, &options)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
        }
        Commands::Details {
            place_id,
            url,
            json,
        } => {
            let details = pipeline
                .get_business_details(place_id.as_deref(), url.as_deref())
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print_details(&details);
            }
        }
    }
    Ok(())
}

fn print_records(records: &[BusinessRecord]) {
    if records.is_empty() {
        println!("no businesses found");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let rating = record
            .rating
            .map_or_else(|| "unrated".to_string(), |r| format!("{r:.1}"));
        let reviews = record
            .review_count
            .map_or_else(String::new, |n| format!(" ({n} reviews)"));
        println!("{:2}. {} [{rating}{reviews}]", i + 1, record.name);
        println!("    {}", record.address);
        if let Some(id) = record.place_id.as_deref() {
            println!("    place_id: {id}");
        }
    }
}

fn print_details(details: &leadscout_core::BusinessDetails) {
    let record = &details.record;
    println!("{}", record.name);
    println!("{}", record.address);
    if let Some(phone) = record.phone.as_deref() {
        println!("phone: {phone}");
    }
    if let Some(website) = record.website.as_deref() {
        println!("website: {website}");
    }
    if let Some(rating) = record.rating {
        let reviews = record
            .review_count
            .map_or_else(String::new, |n| format!(" across {n} reviews"));
        println!("rating: {rating:.1}{reviews}");
    }
    if !details.opening_hours.is_empty() {
        println!("hours:");
        for line in &details.opening_hours {
            println!("  {line}");
        }
    }
    for review in &details.reviews {
        if !review.text.is_empty() {
            println!("review: {}", review.text);
        }
    }
}
