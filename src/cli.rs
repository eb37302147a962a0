//! Command-line interface definition.

use clap::builder::RangedI64ValueParser;
use clap::{Args, Parser, Subcommand};
use oracle_forge_client::{EntityType, LookupKind, MAX_CHAOS, MIN_CHAOS, Odds};
use std::path::PathBuf;


/// Oracle Forge command-line front end.
#[derive(Debug, Parser)]
#[command(name = "oracle-forge")]
#[command(about = "Solo RPG campaign assistant: adventures, oracles and generators")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ORACLE_FORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL; overrides the configuration file and environment.
    #[arg(long)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Check that the backend is up
    Health,
    /// Show backend configuration status
    Status,
    /// Manage adventures
    #[command(subcommand)]
    Adventures(AdventureCommand),
    /// Browse and edit the world of an adventure
    #[command(subcommand)]
    World(WorldCommand),
    /// Manage player files
    #[command(subcommand)]
    Players(PlayerCommand),
    /// Read the session journal and characters
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Look up items, monsters, spells and rules
    #[command(subcommand)]
    Lookup(LookupCommand),
    /// Ask the oracle
    #[command(subcommand)]
    Oracle(OracleCommand),
    /// Run generators
    #[command(subcommand)]
    Generators(GeneratorCommand),
    /// Track combat
    #[command(subcommand)]
    Combat(CombatCommand),
    /// Manage adventure maps
    #[command(subcommand)]
    Maps(MapCommand),
    /// GET an arbitrary backend path
    Get {
        /// Backend-relative path, e.g. /adventures/list
        path: String,
    },
    /// Read commands from stdin, one per line, sharing one cache
    Shell,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum AdventureCommand {
    /// List adventures
    List,
    /// Show one adventure
    Show { id: String },
    /// Create an adventure
    Create {
        name: String,
        /// Extra fields as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
    /// Update an adventure with a JSON object
    Update { id: String, data: String },
    /// Delete an adventure
    Delete { id: String },
    /// Show the active adventure
    Active,
    /// Make an adventure active
    Select { id: String },
    /// Clear the active adventure
    Clear,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum WorldCommand {
    /// Show the aggregate world state
    State { adventure: String },
    /// Replace the aggregate world state with a JSON object
    SetState { adventure: String, data: String },
    /// List entities of one type (npcs, factions, locations, story_lines)
    List {
        adventure: String,
        entity_type: EntityType,
    },
    /// Show one entity
    Show {
        adventure: String,
        entity_type: EntityType,
        name: String,
    },
    /// Create or replace an entity from a JSON object
    Save {
        adventure: String,
        entity_type: EntityType,
        name: String,
        data: String,
    },
    /// Delete an entity
    Delete {
        adventure: String,
        entity_type: EntityType,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum PlayerCommand {
    /// List player files
    List { adventure: String },
    /// Show one player file
    Show { adventure: String, filename: String },
    /// Create a player from a JSON object
    Create { adventure: String, data: String },
    /// Replace a player file with a JSON object
    Update {
        adventure: String,
        filename: String,
        data: String,
    },
    /// Delete a player file
    Delete { adventure: String, filename: String },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum JournalCommand {
    /// Show the current session state
    State,
    /// Show the session journal
    Show,
    /// Append an entry to the journal
    Add {
        content: String,
        /// Entry category (oracle, note, combat...)
        #[arg(long = "type")]
        entry_type: Option<String>,
    },
    /// End the current session
    End,
    /// Show a character sheet
    Character { name: String },
    /// List play sessions of an adventure
    Sessions { adventure: String },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum LookupCommand {
    /// Browse entries of a system page by page, or show one entry
    Browse(LookupArgs),
    /// Search entries by name or text
    Search {
        /// items, monsters, spells or rules
        kind: LookupKind,
        query: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Item category
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        environment: Option<String>,
        /// Extra random matches to draw
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=50))]
        random: Option<u32>,
        /// Narrate the result
        #[arg(long)]
        narrate: bool,
    },
    /// Draw random entries (not available for rules)
    Random {
        kind: LookupKind,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=20))]
        count: Option<u32>,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        environment: Option<String>,
        #[arg(long)]
        narrate: bool,
    },
    /// List lookup categories
    Categories,
    /// List game systems with reference data
    Systems,
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct LookupArgs {
    /// items, monsters, spells or rules
    pub kind: LookupKind,
    /// Game system, e.g. dnd5e
    pub system: String,
    /// Entry name; lists entries when omitted
    pub name: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum OracleCommand {
    /// Ask a yes/no question
    YesNo {
        question: String,
        /// 50/50, likely or unlikely
        #[arg(long)]
        odds: Option<Odds>,
        /// Chaos factor
        #[arg(long, value_parser = chaos_parser())]
        chaos: Option<u8>,
    },
    /// Check whether the next scene is altered
    Scene {
        #[arg(long, value_parser = chaos_parser())]
        chaos: Option<u8>,
    },
    /// Roll for meaning
    Meaning {
        question: String,
        #[arg(long, default_value = "actions")]
        table: String,
    },
    /// List meaning tables
    MeaningTables,
    /// List oracle tables of a system
    Tables {
        system: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one oracle table
    Table { system: String, name: String },
    /// Roll on an oracle table
    Roll {
        system: String,
        name: String,
        /// Force the die result
        #[arg(long)]
        custom_roll: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum GeneratorCommand {
    /// List generator categories
    Categories,
    /// List generators of a system
    List {
        system: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one generator
    Show { system: String, name: String },
    /// Run a generator
    Run {
        system: String,
        name: String,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// List custom generators
    Custom,
    /// Roll one table of a generator file
    Roll {
        category: String,
        file: String,
        table_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CombatCommand {
    /// List combat sessions of an adventure
    List { adventure: String },
    /// Show one combat session
    Show { id: String },
    /// Start a combat session from a JSON object
    Create { data: String },
    /// Delete a combat session
    Delete { id: String },
    /// Roll initiative
    Initiative { id: String },
    /// Advance to the next turn
    Next { id: String },
    /// Update a combat session with a JSON object
    Update { id: String, data: String },
    /// Start an encounter against the named monsters
    Start {
        #[arg(required = true)]
        monsters: Vec<String>,
    },
    /// Resolve an attack between two combatants given as JSON objects
    Attack { attacker: String, defender: String },
    /// Show the running encounter
    Status,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum MapCommand {
    /// Report whether the adventure has a world map file
    Has { adventure: String },
    /// Download the world map file
    Download { adventure: String, output: PathBuf },
    /// Upload a map file
    Upload {
        adventure: String,
        file: PathBuf,
        /// Upload as a custom map image instead of the world map
        #[arg(long)]
        custom: bool,
    },
    /// List custom map images
    List { adventure: String },
    /// Download one custom map image
    Image {
        adventure: String,
        filename: String,
        output: PathBuf,
    },
}

fn chaos_parser() -> RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(i64::from(MIN_CHAOS)..=i64::from(MAX_CHAOS))
}

/// One line of shell input.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "oracle-forge>")]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

/// Splits a shell line into words, honoring double and single quotes.
///
/// Returns `None` when a quote is left open.
#[must_use]
pub fn split_words(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}
