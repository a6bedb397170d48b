use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nest_core::{MemoryRecord, VectorCodec, today};
use nest_store::{
    Experience, Journal, NestConfig, QueryMode, ResonanceEngine, SearchRequest, VectorStore,
    resolve_data_dir,
};

#[derive(Parser)]
#[command(name = "nest", about = "Holographic memory journal")]
struct Cli {
    /// Data directory (defaults to $NEST_DATA_DIR, then ~/.nest)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse an experience into a composite and store it
    Crystallize {
        /// What happened
        #[arg(long)]
        content: String,

        /// Emotion tag
        #[arg(long)]
        emotion: Option<String>,

        /// Reflex tag
        #[arg(long)]
        reflex: Option<String>,

        /// Channel, e.g. DATA, SOMA:SIGHT, PNEUMA:VERIFY
        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        intent: Option<String>,

        /// Signature seed for PNEUMA channels
        #[arg(long)]
        seed: Option<String>,

        /// External reference kept on SOMA channels
        #[arg(long)]
        reference: Option<String>,

        /// Partition key (defaults to today's UTC date)
        #[arg(long)]
        partition: Option<String>,

        /// Record id (defaults to MEM_<unix-seconds>)
        #[arg(long)]
        id: Option<String>,
    },

    /// Recall memories resonating with a query
    Recall {
        /// Query text
        query: String,

        /// Restrict to these partitions (repeatable)
        #[arg(long = "partition")]
        partitions: Vec<String>,

        /// Minimum score, exclusive (defaults to the configured threshold)
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum number of results
        #[arg(long)]
        top_k: Option<usize>,

        /// Encode the query as an ordered character sequence
        #[arg(long)]
        sequence: bool,
    },

    /// List partition keys
    Partitions,

    /// Show the records of one partition in insertion order
    Show {
        /// Partition key (defaults to today's UTC date)
        partition: Option<String>,
    },

    /// Show store statistics
    Stats,
}

/// Configuration plus an opened store.
struct Session {
    data_dir: PathBuf,
    config: NestConfig,
    codec: VectorCodec,
    store: VectorStore,
}

fn open_session(cli: &Cli) -> Result<Session> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let config = NestConfig::load(&data_dir)
        .with_context(|| format!("failed to load config from {}", data_dir.display()))?;
    let codec = VectorCodec::new(config.dimension, config.density);
    let store = VectorStore::load(&NestConfig::memory_bank(&data_dir), config.dimension)
        .context("failed to open memory bank")?;
    Ok(Session {
        data_dir,
        config,
        codec,
        store,
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Crystallize {
            content,
            emotion,
            reflex,
            mode,
            user,
            location,
            intent,
            seed,
            reference,
            partition,
            id,
        } => {
            let experience = Experience {
                content: content.clone(),
                emotion: emotion.clone(),
                reflex: reflex.clone(),
                mode: mode.clone(),
                user: user.clone(),
                location: location.clone(),
                intent: intent.clone(),
                signature_seed: seed.clone(),
                reference: reference.clone(),
                partition: partition.clone(),
                id: id.clone(),
                timestamp: None,
            };
            cmd_crystallize(&cli, &experience)
        }
        Commands::Recall {
            query,
            partitions,
            threshold,
            top_k,
            sequence,
        } => cmd_recall(&cli, query, partitions, *threshold, *top_k, *sequence),
        Commands::Partitions => cmd_partitions(&cli),
        Commands::Show { partition } => cmd_show(&cli, partition.as_deref()),
        Commands::Stats => cmd_stats(&cli),
    }
}

fn cmd_crystallize(cli: &Cli, experience: &Experience) -> Result<()> {
    if experience.content.trim().is_empty() {
        bail!("--content must not be empty");
    }
    let mut session = open_session(cli)?;
    let journal = Journal::new(&session.codec, &session.codec, session.config.weights);
    let at = journal
        .crystallize(&mut session.store, experience)
        .context("failed to crystallize")?;

    println!("crystallized {} in {}", at.id, at.partition);
    Ok(())
}

fn cmd_recall(
    cli: &Cli,
    query: &str,
    partitions: &[String],
    threshold: Option<f64>,
    top_k: Option<usize>,
    sequence: bool,
) -> Result<()> {
    let session = open_session(cli)?;
    let recall = &session.config.recall;

    let mut request = SearchRequest::new(query).threshold(threshold.unwrap_or(recall.threshold));
    if let Some(k) = top_k.or(recall.top_k) {
        request = request.top_k(k);
    }
    if !partitions.is_empty() {
        request = request.partitions(partitions.iter().cloned());
    }
    if sequence {
        request = request.mode(QueryMode::Sequence);
    }

    let engine = ResonanceEngine::new(&session.codec, &session.store)
        .with_scan_limit(session.config.scan_limit);
    let hits = engine.search(&request).context("search failed")?;

    if hits.is_empty() {
        println!("(no resonance found)");
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{:.4}  {}/{}  {}",
            hit.score,
            hit.record.partition,
            hit.record.id,
            hit.record.content()
        );
    }
    Ok(())
}

fn cmd_partitions(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    for key in session
        .store
        .list_partitions()
        .context("failed to list partitions")?
    {
        println!("{key}");
    }
    Ok(())
}

fn cmd_show(cli: &Cli, partition: Option<&str>) -> Result<()> {
    let partition = partition.map_or_else(today, str::to_string);
    let session = open_session(cli)?;
    let records = session
        .store
        .get_partition(&partition)
        .with_context(|| format!("failed to read partition {partition}"))?;

    if records.is_empty() {
        println!("(empty partition)");
        return Ok(());
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &MemoryRecord) {
    let meta = &record.meta;
    println!(
        "{}  {}  [{}]  {}/{}  {}",
        record.id,
        meta.readable_time,
        meta.channel,
        record.emotion(),
        record.reflex(),
        record.content()
    );
    if let Some(reference) = &meta.reference {
        println!("    reference: {reference}");
    }
    if let Some(signature) = meta.signature {
        println!("    signature: {signature:016x}");
    }
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let partitions = session
        .store
        .list_partitions()
        .context("failed to list partitions")?;
    let records = session
        .store
        .record_count()
        .context("failed to count records")?;

    println!("data_dir:   {}", session.data_dir.display());
    println!("dimension:  {}", session.config.dimension);
    println!("density:    {}", session.config.density);
    println!("partitions: {}", partitions.len());
    println!("records:    {records}");
    Ok(())
}
